//! `mfgdocs validate` command - Check data integrity

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::Workspace;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityKind;
use crate::core::validate::{validate, Severity};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Show summary only, don't show individual issues
    #[arg(long)]
    pub summary: bool,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let report = validate(&ws.storage);

    match ws.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
        }
        _ => {
            if !args.summary {
                for issue in &report.issues {
                    let marker = match issue.severity {
                        Severity::Error => style("✗").red(),
                        Severity::Warning => style("!").yellow(),
                    };
                    println!(
                        "{} {} {}: {}",
                        marker,
                        issue.kind,
                        style(&issue.entity).cyan(),
                        issue.message
                    );
                }
            }

            if !global.quiet {
                print_summary(&ws, report.error_count(), report.warning_count());
            }
        }
    }

    let errors = report.error_count();
    let warnings = report.warning_count();
    if errors > 0 {
        Err(miette::miette!(
            "Validation failed: {} error(s), {} warning(s)",
            errors,
            warnings
        ))
    } else if args.strict && warnings > 0 {
        Err(miette::miette!(
            "Validation failed (strict): {} warning(s)",
            warnings
        ))
    } else {
        if !global.quiet && ws.format(global, OutputFormat::Tsv) == OutputFormat::Tsv {
            println!("{} {}", style("✓").green().bold(), success_message(warnings));
        }
        Ok(())
    }
}

fn print_summary(ws: &Workspace, errors: usize, warnings: usize) {
    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "  Steps checked:  {}",
        style(ws.storage.len(EntityKind::Step)).cyan()
    );
    println!(
        "  Parts checked:  {}",
        style(ws.storage.len(EntityKind::Part)).cyan()
    );
    println!("  Total errors:   {}", style(errors).red());
    if warnings > 0 {
        println!("  Total warnings: {}", style(warnings).yellow());
    }
    println!();
}

fn success_message(warnings: usize) -> String {
    if warnings == 0 {
        "All records passed validation!".to_string()
    } else {
        format!("No errors ({} warning(s))", warnings)
    }
}
