//! `mfgdocs search` command - Search across all entity kinds

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::Workspace;
use crate::cli::helpers::truncate_str;
use crate::cli::table::{ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityKind;
use crate::core::search::search;

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Search term (name, description, key; for steps also texts and referenced keys)
    pub query: String,

    /// Filter by entity kind(s)
    #[arg(long, short = 't', value_delimiter = ',')]
    pub kind: Option<Vec<EntityKind>>,

    /// Limit number of results
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("kind", "KIND", 10),
    ColumnDef::new("name", "NAME", 40),
];

/// Run the search command
pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let limit = if args.count { None } else { Some(args.limit) };
    let results = search(&ws.storage, &args.query, args.kind.as_deref(), limit);

    if args.count {
        println!("{}", results.len());
        return Ok(());
    }

    let format = ws.format(global, OutputFormat::Tsv);

    if results.is_empty() && matches!(format, OutputFormat::Tsv) {
        println!("No results found for '{}'.", style(&args.query).yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let values: Vec<serde_json::Value> = results
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "kind": r.kind(),
                        "key": r.key(),
                        "name": r.name(),
                    })
                })
                .collect();
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&values).into_diagnostic()?);
            } else {
                print!("{}", serde_yml::to_string(&values).into_diagnostic()?);
            }
        }
        format => {
            let rows: Vec<TableRow> = results
                .iter()
                .map(|r| {
                    TableRow::new(r.key())
                        .cell("kind", r.kind().as_str())
                        .cell("name", truncate_str(r.name(), 60))
                })
                .collect();
            let mut formatter = TableFormatter::new(COLUMNS, "result");
            if global.quiet {
                formatter = formatter.without_summary();
            }
            formatter.output(&rows, format)?;
        }
    }
    Ok(())
}
