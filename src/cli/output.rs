// Output formatting for CLI

use std::io::{self, Write};

use anyhow::Result;
use serde_json::Value;

use crate::cli::config::OutputFormat;

/// Format and output reports
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// Output a single report object
    pub fn output_value(&self, value: &Value, writer: &mut impl Write) -> Result<()> {
        match self.format {
            OutputFormat::Pretty => writeln!(writer, "{}", serde_json::to_string_pretty(value)?)?,
            OutputFormat::Json => writeln!(writer, "{}", serde_json::to_string(value)?)?,
            OutputFormat::KeyValue => self.output_key_value(value, writer)?,
            OutputFormat::Table => self.output_table(value, writer)?,
        }
        Ok(())
    }

    /// Output a list of records, one row each
    pub fn output_records(&self, records: &[Value], writer: &mut impl Write) -> Result<()> {
        match self.format {
            OutputFormat::Pretty => writeln!(writer, "{}", serde_json::to_string_pretty(records)?)?,
            OutputFormat::Json => writeln!(writer, "{}", serde_json::to_string(records)?)?,
            OutputFormat::KeyValue => {
                for record in records {
                    let Some(obj) = record.as_object() else { continue };
                    let line: Vec<String> = obj
                        .iter()
                        .map(|(key, value)| format!("{}={}", key, self.format_value(value)))
                        .collect();
                    writeln!(writer, "{}", line.join(" "))?;
                }
            }
            OutputFormat::Table => self.output_rows(records, writer)?,
        }
        Ok(())
    }

    /// Output as key-value pairs
    fn output_key_value(&self, value: &Value, writer: &mut impl Write) -> Result<()> {
        if let Some(obj) = value.as_object() {
            let mut items: Vec<_> = obj.iter().collect();
            items.sort_by(|a, b| a.0.cmp(b.0));

            for (key, value) in items {
                writeln!(writer, "{}: {}", key, self.format_value(value))?;
            }
        }
        Ok(())
    }

    /// Output as table
    fn output_table(&self, value: &Value, writer: &mut impl Write) -> Result<()> {
        if let Some(obj) = value.as_object() {
            let max_key_len = obj.keys().map(|k| k.len()).max().unwrap_or(0);

            writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
            for (key, value) in obj {
                writeln!(
                    writer,
                    "{:<width$}{}",
                    format!("{}:", key),
                    self.format_value(value),
                    width = max_key_len + 2
                )?;
            }
            writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        }
        Ok(())
    }

    /// Columns come from the first record's keys
    fn output_rows(&self, records: &[Value], writer: &mut impl Write) -> Result<()> {
        let Some(first) = records.first().and_then(Value::as_object) else {
            return Ok(());
        };
        let columns: Vec<&String> = first.keys().collect();

        let cells: Vec<Vec<String>> = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column.as_str()).map(|v| self.format_value(v)).unwrap_or_default())
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| cells.iter().map(|row| row[i].len()).max().unwrap_or(0).max(column.len()))
            .collect();

        let header: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(column, &width)| format!("{:<width$}", column))
            .collect();
        writeln!(writer, "{}", header.join("  ").trim_end())?;
        writeln!(writer, "{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)))?;

        for row in cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{:<width$}", cell))
                .collect();
            writeln!(writer, "{}", line.join("  ").trim_end())?;
        }
        Ok(())
    }

    /// Format a JSON value for display
    fn format_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => "(null)".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(arr) => {
                if arr.is_empty() {
                    "[]".to_string()
                } else {
                    format!("[{} items]", arr.len())
                }
            }
            Value::Object(obj) => {
                if obj.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{{} items}}", obj.len())
                }
            }
        }
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            eprintln!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            eprintln!("  {}", message);
        }
    }
}

/// Progress indicator for batch operations, drawn on stderr
pub struct ProgressBar {
    total: usize,
    current: usize,
    show: bool,
}

impl ProgressBar {
    pub fn new(total: usize, show: bool) -> Self {
        Self {
            total,
            current: 0,
            show,
        }
    }

    pub fn increment(&mut self, label: &str) {
        self.current += 1;
        if self.show && self.total > 0 {
            let percent = (self.current * 100) / self.total;
            let mut stderr = io::stderr();
            write!(stderr, "\r[{}/{}] ({}%) {} ", self.current, self.total, percent, label).ok();
            if self.current == self.total {
                writeln!(stderr).ok();
            }
            stderr.flush().ok();
        }
    }
}
