//! `mfgdocs graph` command - Export the part-flow graph

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::Workspace;
use crate::cli::helpers::escape_md;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::graph::{bom_graph, edge_label, flow_graph, format_amount, FlowGraph};

#[derive(clap::Args, Debug)]
pub struct GraphArgs {
    /// Export the bill-of-materials graph instead of the step flow
    #[arg(long)]
    pub bom: bool,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: GraphArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;

    let (graph, name) = if args.bom {
        (bom_graph(&ws.storage), "bom")
    } else {
        (flow_graph(&ws.storage)?, "flow")
    };

    let rendered = render(&graph, name, ws.format(global, OutputFormat::Dot))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Wrote {} nodes and {} edges to {}",
                    style("✓").green(),
                    graph.nodes.len(),
                    graph.edges.len(),
                    style(path.display()).cyan()
                );
            }
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn render(graph: &FlowGraph, name: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(graph).into_diagnostic()?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => serde_yml::to_string(graph).into_diagnostic(),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer
                .write_record(["from", "to", "amount", "unit"])
                .into_diagnostic()?;
            for edge in &graph.edges {
                let amount = format_amount(edge.amount);
                writer
                    .write_record([
                        edge.from.as_str(),
                        edge.to.as_str(),
                        amount.as_str(),
                        edge.unit.as_str(),
                    ])
                    .into_diagnostic()?;
            }
            let bytes = writer.into_inner().into_diagnostic()?;
            String::from_utf8(bytes).into_diagnostic()
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["From", "To", "Amount"]);
            for edge in &graph.edges {
                builder.push_record([
                    escape_md(&edge.from),
                    escape_md(&edge.to),
                    escape_md(&edge_label(edge)),
                ]);
            }
            Ok(format!("{}\n", builder.build().with(Style::markdown())))
        }
        OutputFormat::Tsv => Ok(graph
            .edges
            .iter()
            .map(|e| format!("{}\t{}\t{}\n", e.from, e.to, edge_label(e)))
            .collect()),
        OutputFormat::Id => Ok(graph.nodes.iter().map(|n| format!("{}\n", n.key)).collect()),
        OutputFormat::Dot | OutputFormat::Auto => Ok(graph.to_dot(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::NodeKind;

    fn graph() -> FlowGraph {
        let mut graph = FlowGraph::new();
        graph.add_node("S1", NodeKind::Step, "Cut");
        graph.add_node("P1(S1)", NodeKind::Part, "Blank");
        graph.add_edge("S1", "P1(S1)", 2.5, "kg");
        graph
    }

    #[test]
    fn test_render_csv() {
        let out = render(&graph(), "flow", OutputFormat::Csv).unwrap();
        assert_eq!(out, "from,to,amount,unit\nS1,P1(S1),2.5,kg\n");
    }

    #[test]
    fn test_render_tsv_and_ids() {
        assert_eq!(
            render(&graph(), "flow", OutputFormat::Tsv).unwrap(),
            "S1\tP1(S1)\t2.5 kg\n"
        );
        assert_eq!(render(&graph(), "flow", OutputFormat::Id).unwrap(), "S1\nP1(S1)\n");
    }

    #[test]
    fn test_render_md_is_a_table() {
        let out = render(&graph(), "flow", OutputFormat::Md).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("| From"));
        assert!(lines[1].starts_with("|--"));
        assert!(lines[2].contains("P1(S1)"));
        assert!(lines[2].contains("2.5 kg"));
        assert!(!out.contains('\t'));
    }

    #[test]
    fn test_render_json_lists_nodes_and_edges() {
        let out = render(&graph(), "flow", OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["nodes"][1]["kind"], "part");
        assert_eq!(value["edges"][0]["amount"], 2.5);
    }
}
