//! `mfgdocs show` command - Show one entity

use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;

use crate::cli::commands::utils::Workspace;
use crate::cli::helpers::name_or_missing;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::EntityRef;
use crate::core::graph::format_amount;
use crate::core::identity::EntityKind;
use crate::core::partkey::extract_step_key;
use crate::core::storage::Storage;
use crate::entities::{Part, Step};

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Entity kind
    pub kind: EntityKind,

    /// Entity key (or primary key)
    pub key: String,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let entity = ws.find(args.kind, &args.key)?;

    match ws.format(global, OutputFormat::Yaml) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&entity.to_value()).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&entity.to_value()).into_diagnostic()?);
        }
        _ => print_details(&ws.storage, &entity),
    }
    Ok(())
}

fn print_details(storage: &Storage, entity: &EntityRef<'_>) {
    println!(
        "{} {} {}",
        style(entity.kind()).dim(),
        style(entity.key()).cyan().bold(),
        entity.name()
    );

    match entity {
        EntityRef::Resource(_, resource) => {
            if !resource.description.is_empty() {
                println!("{}", resource.description);
            }
        }
        EntityRef::Part(part) => print_part(storage, part),
        EntityRef::Step(step) => print_step(storage, step),
    }
}

fn print_part(storage: &Storage, part: &Part) {
    if !part.unit.is_empty() {
        println!("{}: {}", style("Unit").bold(), part.unit);
    }
    if !part.bom.is_empty() {
        println!("{}", style("Bill of materials").bold());
        for (component, quantity) in &part.bom {
            let name = storage.find(EntityKind::Part, component).map(|p| p.name());
            println!(
                "  {} x {} ({})",
                format_amount(*quantity),
                component,
                name_or_missing(name)
            );
        }
    }
}

fn print_step(storage: &Storage, step: &Step) {
    if step.is_final {
        println!("{}", style("final step").green());
    }

    print_parts(storage, "Inputs", &step.inputparts);
    print_parts(storage, "Outputs", &step.outputparts);

    let resources = [
        ("Tools", EntityKind::Tool, &step.tools),
        ("Machines", EntityKind::Machine, &step.machines),
        ("Roles", EntityKind::Role, &step.roles),
        ("Actions", EntityKind::Action, &step.actions),
        ("Consumables", EntityKind::Consumable, &step.consumables),
    ];
    for (title, kind, map) in resources {
        if map.is_empty() {
            continue;
        }
        println!("{}", style(title).bold());
        for (key, amount) in map {
            let name = storage.find(kind, key).map(|r| r.name());
            println!("  {} x {} ({})", format_amount(*amount), key, name_or_missing(name));
        }
    }

    let singles = [
        ("Location", EntityKind::Location, step.location.as_deref()),
        ("Company", EntityKind::Company, step.company.as_deref()),
        ("QC failure step", EntityKind::Step, step.qcfailstep.as_deref()),
    ];
    for (title, kind, key) in singles {
        if let Some(key) = key {
            let name = storage.find(kind, key).map(|r| r.name());
            println!("{}: {} ({})", style(title).bold(), key, name_or_missing(name));
        }
    }

    let hours = [
        ("Prepare", step.prepare_hours),
        ("Unit time", step.unit_time_hours),
        ("Cooldown", step.cooldown_hours),
    ];
    for (title, value) in hours {
        if value != 0.0 {
            println!("{}: {} h", style(title).bold(), format_amount(value));
        }
    }

    for (title, text) in [
        ("Preparation", &step.prepare_text),
        ("Acceptance", &step.acceptance),
        ("Cleanup", &step.cleanup_text),
    ] {
        if !text.is_empty() {
            println!("{}", style(title).bold());
            println!("  {}", text);
        }
    }
}

fn print_parts(storage: &Storage, title: &str, parts: &BTreeMap<String, f64>) {
    if parts.is_empty() {
        return;
    }
    println!("{}", style(title).bold());
    for (part_ref, amount) in parts {
        let (base, _) = extract_step_key(part_ref);
        let part = storage.require_part(&base).ok();
        let unit = part.map(|p| p.unit.as_str()).unwrap_or("");
        println!(
            "  {} {} {} ({})",
            format_amount(*amount),
            unit,
            part_ref,
            name_or_missing(part.map(|p| p.resource.name.as_str()))
        );
    }
}
