//! Output formats shared by the subcommands

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

/// How command output is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Pretty,
    /// JSON, indented with four spaces
    Json,
    /// YAML
    Yaml,
}

/// Command output that can be written as text or serialized
pub trait Render: Serialize {
    /// Write the human-readable form
    fn render_text(&self, out: &mut dyn Write) -> io::Result<()>;
}

impl OutputFormat {
    /// Write `value` to `out` in this format
    pub fn emit<R: Render>(self, value: &R, out: &mut dyn Write) -> anyhow::Result<()> {
        match self {
            OutputFormat::Pretty => value.render_text(out)?,
            OutputFormat::Json => {
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut serializer = serde_json::Serializer::with_formatter(&mut *out, formatter);
                value.serialize(&mut serializer)?;
                writeln!(out)?;
            }
            OutputFormat::Yaml => serde_yaml::to_writer(&mut *out, value)?,
        }
        out.flush()?;
        Ok(())
    }
}

/// A text table with columns sized to their widest cell
#[derive(Debug, Default)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing trailing cells render blank
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_line(out, &widths, &self.header)?;
        let underline: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        write_line(out, &widths, &underline)?;
        for row in &self.rows {
            write_line(out, &widths, row)?;
        }
        Ok(())
    }
}

fn write_line(out: &mut dyn Write, widths: &[usize], cells: &[String]) -> io::Result<()> {
    let line = widths
        .iter()
        .enumerate()
        .map(|(i, &width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!("{:<width$}", cell, width = width)
        })
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}
