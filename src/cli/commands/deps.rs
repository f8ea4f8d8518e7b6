//! `mfgdocs deps` command - Dependency views of one step

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::Workspace;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::resolver::StepDependencies;
use crate::entities::Step;

#[derive(clap::Args, Debug)]
pub struct DepsArgs {
    /// Step key
    pub step: String,
}

#[derive(Serialize)]
struct DepsOutput<'a> {
    step: &'a str,
    must_finish_first: Vec<&'a str>,
    can_start_together_with: Vec<&'a str>,
    must_wait_for_this: Vec<&'a str>,
    start_in_parallel_after_this_starts: Vec<&'a str>,
}

fn keys<'a>(steps: &[&'a Step]) -> Vec<&'a str> {
    steps.iter().map(|s| s.key()).collect()
}

impl<'a> DepsOutput<'a> {
    fn new(step: &'a Step, deps: &StepDependencies<'a>) -> Self {
        Self {
            step: step.key(),
            must_finish_first: keys(&deps.must_finish_first),
            can_start_together_with: keys(&deps.can_start_together_with),
            must_wait_for_this: keys(&deps.must_wait_for_this),
            start_in_parallel_after_this_starts: keys(&deps.start_in_parallel_after_this_starts),
        }
    }
}

pub fn run(args: DepsArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let step = ws.step(&args.step)?;
    let deps = StepDependencies::for_step(step, &ws.storage);

    let sections: [(&str, &[&Step]); 4] = [
        ("Must finish first", &deps.must_finish_first),
        ("Can start together with", &deps.can_start_together_with),
        ("Must wait for this", &deps.must_wait_for_this),
        ("Can start after this starts", &deps.start_in_parallel_after_this_starts),
    ];

    match ws.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let output = DepsOutput::new(step, &deps);
            println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            let output = DepsOutput::new(step, &deps);
            print!("{}", serde_yml::to_string(&output).into_diagnostic()?);
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["Relation", "Key", "Name"]);
            for (title, steps) in sections {
                for s in steps {
                    builder.push_record([title, s.key(), s.name()]);
                }
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Id => {
            for (_, steps) in sections {
                for s in steps {
                    println!("{}", s.key());
                }
            }
        }
        _ => {
            println!("{} {}", style(step.key()).cyan().bold(), step.name());
            if deps.is_empty() && !global.quiet {
                println!("{}", style("No dependencies.").dim());
                return Ok(());
            }
            for (title, steps) in sections {
                if steps.is_empty() {
                    continue;
                }
                println!();
                println!("{}", style(title).bold());
                for s in steps {
                    println!("  {:<16} {}", s.key(), s.name());
                }
            }
        }
    }
    Ok(())
}
