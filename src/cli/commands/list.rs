//! `mfgdocs list` command - List one collection

use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::Workspace;
use crate::cli::table::{ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::EntityRef;
use crate::core::identity::EntityKind;

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Entity kind (singular or plural, e.g. `step` or `steps`)
    pub kind: EntityKind,

    /// Only list entities containing this text (case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort by key instead of storage order
    #[arg(long)]
    pub sort: bool,
}

const RESOURCE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("description", "DESCRIPTION", 48),
];

const PART_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("unit", "UNIT", 8),
    ColumnDef::new("bom", "BOM", 5),
];

const STEP_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("inputs", "INPUTS", 30),
    ColumnDef::new("outputs", "OUTPUTS", 30),
    ColumnDef::new("final", "FINAL", 5),
];

fn columns(kind: EntityKind) -> &'static [ColumnDef] {
    match kind {
        EntityKind::Part => PART_COLUMNS,
        EntityKind::Step => STEP_COLUMNS,
        _ => RESOURCE_COLUMNS,
    }
}

fn row(entity: &EntityRef<'_>) -> TableRow {
    let row = TableRow::new(entity.key()).cell("name", entity.name());
    match entity {
        EntityRef::Resource(_, resource) => row.cell("description", resource.description.as_str()),
        EntityRef::Part(part) => row
            .cell("unit", part.unit.as_str())
            .cell("bom", part.bom.len().to_string()),
        EntityRef::Step(step) => row
            .cell("inputs", join_keys(step.inputparts.keys()))
            .cell("outputs", join_keys(step.outputparts.keys()))
            .cell("final", if step.is_final { "yes" } else { "no" }),
    }
}

fn join_keys<'a>(keys: impl Iterator<Item = &'a String>) -> String {
    keys.map(String::as_str).collect::<Vec<_>>().join(" ")
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;

    let mut entities = ws.storage.entities(args.kind);
    if let Some(query) = &args.search {
        entities.retain(|e| e.contains(query));
    }
    if args.sort {
        entities.sort_by(|a, b| a.key().cmp(b.key()).then_with(|| a.pk().cmp(b.pk())));
    }

    match ws.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let values: Vec<serde_json::Value> = entities.iter().map(EntityRef::to_value).collect();
            println!("{}", serde_json::to_string_pretty(&values).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            let values: Vec<serde_json::Value> = entities.iter().map(EntityRef::to_value).collect();
            print!("{}", serde_yml::to_string(&values).into_diagnostic()?);
        }
        format => {
            let rows: Vec<TableRow> = entities.iter().map(row).collect();
            let mut formatter = TableFormatter::new(columns(args.kind), args.kind.as_str());
            if global.quiet {
                formatter = formatter.without_summary();
            }
            formatter.output(&rows, format)?;
        }
    }
    Ok(())
}
