use crate::batch::{BatchResult, SkipReason, UndoResult};
use comfy_table::{Cell, Color, ColumnConstraint, ContentArrangement, Table, Width};
use nu_ansi_term::Color as Ansi;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

/// Result of a version command
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResult {
    pub name: String,
    pub version: String,
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }

    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

fn marker(symbol: &str, color: Ansi, use_color: bool) -> String {
    if use_color {
        color.paint(symbol).to_string()
    } else {
        symbol.to_string()
    }
}

impl BatchResult {
    /// Summary text, optionally with colored markers
    pub fn render_summary(&self, use_color: bool) -> String {
        let mut output = String::new();

        for entry in &self.renamed {
            let verb = if self.dry_run { "Would rename" } else { "Renamed" };
            writeln!(
                output,
                "{} {}: {} -> {}",
                marker("✓", Ansi::Green, use_color),
                verb,
                entry.original_name,
                entry.new_name
            )
            .unwrap();
        }

        for skipped in &self.skipped {
            if skipped.reason == SkipReason::Unchanged {
                continue;
            }
            let symbol = match skipped.reason {
                SkipReason::RenameFailed | SkipReason::InvalidName => {
                    marker("✗", Ansi::Red, use_color)
                },
                _ => marker("⚠", Ansi::Yellow, use_color),
            };
            let detail = skipped
                .detail
                .as_ref()
                .map(|d| format!(": {}", d))
                .unwrap_or_default();
            writeln!(
                output,
                "{} Skipped {} ({}){}",
                symbol, skipped.name, skipped.reason, detail
            )
            .unwrap();
        }

        if !output.is_empty() {
            output.push('\n');
        }

        output.push_str(&self.render_totals());
        output
    }

    /// The closing count lines shared by the summary and the preview table
    pub fn render_totals(&self) -> String {
        let mut output = String::new();
        if self.dry_run {
            writeln!(
                output,
                "Dry run: {} of {} files would be renamed",
                self.renamed_count, self.total_eligible_count
            )
            .unwrap();
        } else {
            writeln!(
                output,
                "Renamed {} of {} files",
                self.renamed_count, self.total_eligible_count
            )
            .unwrap();
        }

        let unchanged = self.skipped_with(SkipReason::Unchanged).count();
        if unchanged > 0 {
            writeln!(output, "{} files already had their target name", unchanged).unwrap();
        }

        output
    }

    /// Old/new name table for previews
    pub fn render_table(&self, use_color: bool, fixed_table_width: bool) -> String {
        let mut table = Table::new();

        if fixed_table_width {
            table.set_content_arrangement(ContentArrangement::Disabled);
            table.set_constraints(vec![
                ColumnConstraint::Absolute(Width::Fixed(40)), // Original
                ColumnConstraint::Absolute(Width::Fixed(40)), // New
                ColumnConstraint::Absolute(Width::Fixed(30)), // Status
            ]);
        } else {
            table.set_content_arrangement(ContentArrangement::Dynamic);
        }

        if use_color {
            table.enforce_styling();
            table.set_header(vec![
                Cell::new("Original").fg(Color::Cyan),
                Cell::new("New").fg(Color::Cyan),
                Cell::new("Status").fg(Color::Cyan),
            ]);
        } else {
            table.set_header(vec!["Original", "New", "Status"]);
        }

        let status = if self.dry_run { "rename" } else { "renamed" };
        for entry in &self.renamed {
            if use_color {
                table.add_row(vec![
                    Cell::new(&entry.original_name),
                    Cell::new(&entry.new_name).fg(Color::Green),
                    Cell::new(status),
                ]);
            } else {
                table.add_row(vec![
                    entry.original_name.as_str(),
                    entry.new_name.as_str(),
                    status,
                ]);
            }
        }

        for skipped in &self.skipped {
            let reason = skipped.reason.to_string();
            if use_color {
                table.add_row(vec![
                    Cell::new(&skipped.name),
                    Cell::new("-"),
                    Cell::new(&reason).fg(Color::Yellow),
                ]);
            } else {
                table.add_row(vec![skipped.name.as_str(), "-", reason.as_str()]);
            }
        }

        table.to_string()
    }
}

impl OutputFormatter for BatchResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": if self.dry_run { "preview" } else { "rename" },
            "directory": self.directory,
            "dry_run": self.dry_run,
            "summary": {
                "renamed": self.renamed_count,
                "total": self.total_eligible_count,
                "skipped": self.skipped.len(),
            },
            "renamed": self.renamed,
            "skipped": self.skipped,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        self.render_summary(false)
    }
}

impl OutputFormatter for UndoResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.failures.is_empty(),
            "operation": "undo",
            "summary": {
                "reverted": self.reverted,
                "skipped_hidden": self.skipped_hidden,
                "failed": self.failures.len(),
            },
            "failures": self.failures,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        for failure in &self.failures {
            writeln!(
                output,
                "✗ Failed to revert {} -> {}: {}",
                failure.from.display(),
                failure.to.display(),
                failure.error
            )
            .unwrap();
        }
        writeln!(output, "Reverted {} files", self.reverted).unwrap();
        if self.skipped_hidden > 0 {
            writeln!(output, "Left {} hidden files in place", self.skipped_hidden).unwrap();
        }
        output
    }
}

impl OutputFormatter for VersionResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "name": self.name,
            "version": self.version,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}
