//! Table formatting for list-style command output
//!
//! Rows are keyed by entity key, which is always the first column. TSV output
//! pads and truncates columns for terminals; CSV, Markdown and ID output stay
//! single-line for piping.

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{escape_md, truncate_str};
use crate::cli::OutputFormat;

/// Column definition for table output
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    /// Maximum width in TSV output
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// One output row: the entity key plus named cells
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    pub key: String,
    cells: Vec<(&'static str, String)>,
}

impl TableRow {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.cells.push((column, value.into()));
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| *k == column)
            .map(|(_, v)| v.as_str())
    }
}

/// Renders rows in the list formats
pub struct TableFormatter {
    columns: &'static [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl TableFormatter {
    pub fn new(columns: &'static [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Disable the trailing "N found" line
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Print rows in the given format (anything not tabular falls back to TSV)
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) -> Result<()> {
        print!("{}", self.render(rows, format)?);
        Ok(())
    }

    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Csv => self.render_csv(rows),
            OutputFormat::Md => Ok(self.render_md(rows)),
            OutputFormat::Id => Ok(rows.iter().map(|r| format!("{}\n", r.key)).collect()),
            _ => Ok(self.render_tsv(rows)),
        }
    }

    fn widths(&self, rows: &[TableRow]) -> Vec<usize> {
        let key_width = rows
            .iter()
            .map(|r| r.key.chars().count())
            .max()
            .unwrap_or(0)
            .max(3);

        let mut widths = vec![key_width];
        for col in self.columns {
            let content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(|v| v.chars().count())
                .max()
                .unwrap_or(0);
            widths.push(col.header.len().max(content).min(col.width));
        }
        widths
    }

    fn render_tsv(&self, rows: &[TableRow]) -> String {
        let widths = self.widths(rows);
        let mut out = String::new();

        let mut header = vec![format!("{:<width$}", style("KEY").bold(), width = widths[0])];
        for (col, width) in self.columns.iter().zip(&widths[1..]) {
            header.push(format!("{:<width$}", style(col.header).bold(), width = *width));
        }
        out.push_str(header.join(" ").trim_end());
        out.push('\n');

        let total: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        out.push_str(&"-".repeat(total));
        out.push('\n');

        for row in rows {
            let mut parts = vec![format!("{:<width$}", style(&row.key).cyan(), width = widths[0])];
            for (col, width) in self.columns.iter().zip(&widths[1..]) {
                let value = row.get(col.key).unwrap_or("-");
                parts.push(format!("{:<width$}", truncate_str(value, *width), width = *width));
            }
            out.push_str(parts.join(" ").trim_end());
            out.push('\n');
        }

        if self.show_summary {
            out.push('\n');
            out.push_str(&format!(
                "{} {}(s) found.\n",
                style(rows.len()).cyan(),
                self.entity_name
            ));
        }
        out
    }

    fn render_csv(&self, rows: &[TableRow]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["key"];
        header.extend(self.columns.iter().map(|c| c.key));
        writer.write_record(&header).into_diagnostic()?;

        for row in rows {
            let mut record = vec![row.key.as_str()];
            record.extend(self.columns.iter().map(|c| row.get(c.key).unwrap_or("")));
            writer.write_record(&record).into_diagnostic()?;
        }

        let bytes = writer.into_inner().into_diagnostic()?;
        String::from_utf8(bytes).into_diagnostic()
    }

    fn render_md(&self, rows: &[TableRow]) -> String {
        let mut headers = vec!["Key"];
        headers.extend(self.columns.iter().map(|c| c.header));

        let mut out = format!("| {} |\n", headers.join(" | "));
        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        out.push_str(&format!("|{}|\n", separators.join("|")));

        for row in rows {
            let mut values = vec![escape_md(&row.key)];
            values.extend(
                self.columns
                    .iter()
                    .map(|c| escape_md(row.get(c.key).unwrap_or("-"))),
            );
            out.push_str(&format!("| {} |\n", values.join(" | ")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("name", "NAME", 20),
        ColumnDef::new("unit", "UNIT", 6),
    ];

    fn rows() -> Vec<TableRow> {
        vec![
            TableRow::new("P1").cell("name", "Bracket, bent").cell("unit", "pcs"),
            TableRow::new("P2").cell("name", "Plate"),
        ]
    }

    #[test]
    fn test_table_row_builder() {
        let row = TableRow::new("K").cell("name", "N");
        assert_eq!(row.get("name"), Some("N"));
        assert_eq!(row.get("unit"), None);
    }

    #[test]
    fn test_render_csv_quotes_commas() {
        let out = TableFormatter::new(COLUMNS, "part")
            .render(&rows(), OutputFormat::Csv)
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "key,name,unit");
        assert_eq!(lines[1], "P1,\"Bracket, bent\",pcs");
        assert_eq!(lines[2], "P2,Plate,");
    }

    #[test]
    fn test_render_md() {
        let out = TableFormatter::new(COLUMNS, "part")
            .render(&rows(), OutputFormat::Md)
            .unwrap();
        assert!(out.starts_with("| Key | NAME | UNIT |\n|---|---|---|\n"));
        assert!(out.contains("| P2 | Plate | - |"));
    }

    #[test]
    fn test_render_ids() {
        let out = TableFormatter::new(COLUMNS, "part")
            .render(&rows(), OutputFormat::Id)
            .unwrap();
        assert_eq!(out, "P1\nP2\n");
    }

    #[test]
    fn test_render_tsv_summary() {
        let formatter = TableFormatter::new(COLUMNS, "part");
        let out = formatter.render(&rows(), OutputFormat::Tsv).unwrap();
        assert!(out.contains("2 part(s) found."));
        assert!(out.lines().any(|l| l.starts_with("P2") && l.contains("Plate")));

        let bare = formatter.without_summary().render(&rows(), OutputFormat::Tsv).unwrap();
        assert!(!bare.contains("found"));
    }
}
