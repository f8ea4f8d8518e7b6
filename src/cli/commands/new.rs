//! `mfgdocs new` command - Create an entity with a generated key

use console::style;
use miette::Result;

use crate::cli::commands::utils::Workspace;
use crate::cli::GlobalOpts;
use crate::core::identity::EntityKind;
use crate::core::storage::Storage;
use crate::entities::{Part, Resource, Step};

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Entity kind (step, part, tool, machine, role, action, consumable, location, company)
    pub kind: EntityKind,

    /// Display name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Explicit key (default: configured prefix plus next free number)
    #[arg(long, short = 'k')]
    pub key: Option<String>,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Unit of measure (parts only)
    #[arg(long)]
    pub unit: Option<String>,

    /// Mark the step's outputs as end products (steps only)
    #[arg(long = "final")]
    pub is_final: bool,
}

pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;

    let key = match args.key {
        Some(key) => key,
        None => ws.storage.next_key(args.kind, ws.config.key_prefix(args.kind)),
    };

    if ws.storage.has_key(args.kind, &key) {
        return Err(miette::miette!("A {} with key '{}' already exists", args.kind, key));
    }

    let mut resource = Resource::new(key.as_str(), args.name.as_str());
    resource.description = args.description.unwrap_or_default();
    add_entity(&mut ws.storage, args.kind, resource, args.unit, args.is_final);

    ws.save()?;

    if global.quiet {
        println!("{}", key);
    } else {
        println!(
            "{} Created {} {}",
            style("✓").green(),
            args.kind,
            style(&key).cyan()
        );
    }
    Ok(())
}

/// Store a new record of `kind` built around `resource`
fn add_entity(
    storage: &mut Storage,
    kind: EntityKind,
    resource: Resource,
    unit: Option<String>,
    is_final: bool,
) {
    match kind {
        EntityKind::Part => storage.add_part(Part {
            resource,
            unit: unit.unwrap_or_default(),
            ..Part::default()
        }),
        EntityKind::Step => storage.add_step(Step {
            resource,
            is_final,
            ..Step::default()
        }),
        kind => storage.add_resource(kind, resource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(key: &str) -> Resource {
        let mut resource = Resource::new(key, "Widget");
        resource.description = "Stamped steel".to_string();
        resource
    }

    #[test]
    fn test_add_entity_keeps_resource_fields() {
        let mut storage = Storage::new();
        add_entity(
            &mut storage,
            EntityKind::Part,
            resource("DS-001-0001"),
            Some("kg".into()),
            false,
        );
        add_entity(&mut storage, EntityKind::Step, resource("DS-WRK-0001"), None, true);
        add_entity(
            &mut storage,
            EntityKind::Tool,
            resource("DS-TOL-0001"),
            Some("ignored".into()),
            true,
        );

        let part = storage.require_part("DS-001-0001").unwrap();
        assert_eq!(part.unit, "kg");
        assert_eq!(part.resource.description, "Stamped steel");
        assert_eq!(part.resource.pk, "DS-001-0001");

        let step = storage.step("DS-WRK-0001").unwrap();
        assert!(step.is_final);
        assert_eq!(step.resource.description, "Stamped steel");
        assert!(step.inputparts.is_empty());

        assert!(storage.has_key(EntityKind::Tool, "DS-TOL-0001"));
        assert_eq!(storage.len(EntityKind::Part), 1);
    }
}
