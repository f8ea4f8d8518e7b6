//! `mfgdocs step` command - In-place step edits
//!
//! Each subcommand loads the project, edits one step and saves all
//! collections.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::utils::Workspace;
use crate::cli::GlobalOpts;
use crate::core::identity::EntityKind;
use crate::core::partkey::extract_step_key;
use crate::entities::Step;

#[derive(Subcommand, Debug)]
pub enum StepCommands {
    /// Consume a part (amounts accumulate); use `PART(STEP)` for intermediates
    AddInput(PartArgs),

    /// Produce a part (amounts accumulate)
    AddOutput(PartArgs),

    /// Stop consuming a part
    RemoveInput(RemoveArgs),

    /// Stop producing a part
    RemoveOutput(RemoveArgs),

    /// Require another step to finish before this one starts
    StartAfter(LinkArgs),

    /// Allow this step to start once another step has started
    StartAfterStart(LinkArgs),

    /// Remove both kinds of dependency on another step
    Unlink(UnlinkArgs),

    /// Use a tool, machine, role, action or consumable (amounts accumulate)
    Use(UseArgs),

    /// Stop using a resource
    Unuse(UnuseArgs),

    /// Set single-valued fields
    Set(SetArgs),

    /// Mark the step's outputs as end products
    Final(FinalArgs),
}

#[derive(clap::Args, Debug)]
pub struct PartArgs {
    /// Step key
    pub step: String,

    /// Part reference key
    pub part: String,

    /// Quantity
    #[arg(default_value = "1")]
    pub amount: f64,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Step key
    pub step: String,

    /// Part reference key
    pub part: String,
}

#[derive(clap::Args, Debug)]
pub struct LinkArgs {
    /// Step key
    pub step: String,

    /// Key of the step depended on
    pub other: String,

    /// Metadata stored with the link (JSON; plain text is stored as a string)
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UnlinkArgs {
    /// Step key
    pub step: String,

    /// Key of the step no longer depended on
    pub other: String,
}

#[derive(clap::Args, Debug)]
pub struct UseArgs {
    /// Step key
    pub step: String,

    /// Resource kind (tool, machine, role, action, consumable)
    pub kind: EntityKind,

    /// Resource key
    pub key: String,

    /// Amount (hours for actions)
    #[arg(default_value = "1")]
    pub amount: f64,
}

#[derive(clap::Args, Debug)]
pub struct UnuseArgs {
    /// Step key
    pub step: String,

    /// Resource kind (tool, machine, role, action, consumable)
    pub kind: EntityKind,

    /// Resource key
    pub key: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Step key
    pub step: String,

    /// Location key (empty to clear)
    #[arg(long)]
    pub location: Option<String>,

    /// Company key (empty to clear)
    #[arg(long)]
    pub company: Option<String>,

    /// Step to route to on quality-check failure (empty to clear)
    #[arg(long)]
    pub qcfailstep: Option<String>,

    #[arg(long)]
    pub prepare_hours: Option<f64>,

    #[arg(long)]
    pub cooldown_hours: Option<f64>,

    #[arg(long)]
    pub unit_time_hours: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct FinalArgs {
    /// Step key
    pub step: String,

    /// Mark as intermediate instead
    #[arg(long)]
    pub off: bool,
}

pub fn run(cmd: StepCommands, global: &GlobalOpts) -> Result<()> {
    let mut ws = Workspace::open(global)?;

    let (key, summary) = match cmd {
        StepCommands::AddInput(args) => {
            warn_unknown_part(&ws, &args.part);
            ws.step_mut(&args.step)?.add_inputpart(args.part.as_str(), args.amount);
            (args.step, format!("consumes {} x {}", args.amount, args.part))
        }
        StepCommands::AddOutput(args) => {
            warn_unknown_part(&ws, &args.part);
            ws.step_mut(&args.step)?.add_outputpart(args.part.as_str(), args.amount);
            (args.step, format!("produces {} x {}", args.amount, args.part))
        }
        StepCommands::RemoveInput(args) => {
            ws.step_mut(&args.step)?.remove_inputpart(&args.part);
            (args.step, format!("no longer consumes {}", args.part))
        }
        StepCommands::RemoveOutput(args) => {
            ws.step_mut(&args.step)?.remove_outputpart(&args.part);
            (args.step, format!("no longer produces {}", args.part))
        }
        StepCommands::StartAfter(args) => {
            warn_unknown_step(&ws, &args.other);
            let note = parse_note(args.note.as_deref());
            ws.step_mut(&args.step)?.add_start_after(args.other.as_str(), note);
            (args.step, format!("starts after {} finishes", args.other))
        }
        StepCommands::StartAfterStart(args) => {
            warn_unknown_step(&ws, &args.other);
            let note = parse_note(args.note.as_deref());
            ws.step_mut(&args.step)?.add_start_after_start(args.other.as_str(), note);
            (args.step, format!("may start once {} has started", args.other))
        }
        StepCommands::Unlink(args) => {
            let step = ws.step_mut(&args.step)?;
            step.remove_start_after(&args.other);
            step.remove_start_after_start(&args.other);
            (args.step, format!("no longer depends on {}", args.other))
        }
        StepCommands::Use(args) => {
            if !ws.storage.has_key(args.kind, &args.key) {
                warn(&format!("no {} with key '{}'", args.kind, args.key));
            }
            let step = ws.step_mut(&args.step)?;
            add_resource(step, args.kind, &args.key, args.amount)?;
            (args.step, format!("uses {} x {} {}", args.amount, args.kind, args.key))
        }
        StepCommands::Unuse(args) => {
            let step = ws.step_mut(&args.step)?;
            remove_resource(step, args.kind, &args.key)?;
            (args.step, format!("no longer uses {} {}", args.kind, args.key))
        }
        StepCommands::Set(args) => {
            let step = ws.step_mut(&args.step)?;
            if let Some(location) = args.location {
                step.set_location(non_empty(location));
            }
            if let Some(company) = args.company {
                step.set_company(non_empty(company));
            }
            if let Some(qcfailstep) = args.qcfailstep {
                step.set_qcfailstep(non_empty(qcfailstep));
            }
            if let Some(hours) = args.prepare_hours {
                step.set_prepare_hours(hours);
            }
            if let Some(hours) = args.cooldown_hours {
                step.set_cooldown_hours(hours);
            }
            if let Some(hours) = args.unit_time_hours {
                step.unit_time_hours = hours;
            }
            (args.step, "updated".to_string())
        }
        StepCommands::Final(args) => {
            ws.step_mut(&args.step)?.is_final = !args.off;
            let state = if args.off { "intermediate" } else { "final" };
            (args.step, format!("marked {}", state))
        }
    };

    ws.save()?;

    if !global.quiet {
        println!("{} {} {}", style("✓").green(), style(&key).cyan(), summary);
    }
    Ok(())
}

fn add_resource(step: &mut Step, kind: EntityKind, key: &str, amount: f64) -> Result<()> {
    match kind {
        EntityKind::Tool => step.add_tool(key, amount),
        EntityKind::Machine => step.add_machine(key, amount),
        EntityKind::Role => step.add_role(key, amount),
        EntityKind::Action => step.add_action(key, amount),
        EntityKind::Consumable => step.add_consumable(key, amount),
        other => return Err(not_a_step_resource(other)),
    }
    Ok(())
}

fn remove_resource(step: &mut Step, kind: EntityKind, key: &str) -> Result<()> {
    match kind {
        EntityKind::Tool => step.remove_tool(key),
        EntityKind::Machine => step.remove_machine(key),
        EntityKind::Role => step.remove_role(key),
        EntityKind::Action => step.remove_action(key),
        EntityKind::Consumable => step.remove_consumable(key),
        other => return Err(not_a_step_resource(other)),
    }
    Ok(())
}

fn not_a_step_resource(kind: EntityKind) -> miette::Report {
    miette::miette!(
        "'{}' is not a step resource (expected tool, machine, role, action or consumable)",
        kind
    )
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Link metadata: JSON if it parses, otherwise the raw text
fn parse_note(note: Option<&str>) -> serde_json::Value {
    match note {
        None => serde_json::Value::Null,
        Some(text) => serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::Value::String(text.to_string())),
    }
}

fn warn(message: &str) {
    eprintln!("{} {}", style("!").yellow(), message);
}

fn warn_unknown_part(ws: &Workspace, part_ref: &str) {
    let (base, producer) = extract_step_key(part_ref);
    if !ws.storage.has_key(EntityKind::Part, &base) {
        warn(&format!("no part with key '{}'", base));
    }
    if let Some(producer) = producer.filter(|p| !p.is_empty()) {
        warn_unknown_step(ws, &producer);
    }
}

fn warn_unknown_step(ws: &Workspace, key: &str) {
    if !ws.storage.has_key(EntityKind::Step, key) {
        warn(&format!("no step with key '{}'", key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note() {
        assert_eq!(parse_note(None), serde_json::Value::Null);
        assert_eq!(parse_note(Some("{\"lag\": 2}")), serde_json::json!({"lag": 2}));
        assert_eq!(parse_note(Some("dry first")), serde_json::json!("dry first"));
    }

    #[test]
    fn test_resource_kinds() {
        let mut step = Step::new("S", "S");
        add_resource(&mut step, EntityKind::Machine, "PRESS", 1.0).unwrap();
        add_resource(&mut step, EntityKind::Machine, "PRESS", 1.0).unwrap();
        assert_eq!(step.machines["PRESS"], 2.0);
        assert!(step.tools.is_empty());

        remove_resource(&mut step, EntityKind::Machine, "PRESS").unwrap();
        assert!(step.machines.is_empty());

        assert!(add_resource(&mut step, EntityKind::Part, "P", 1.0).is_err());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("HALL-A".to_string()), Some("HALL-A".to_string()));
        assert_eq!(non_empty("  ".to_string()), None);
    }
}
