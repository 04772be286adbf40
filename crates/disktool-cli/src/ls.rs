//! `disktool ls`

use crate::output::{OutputFormat, Render, Table};
use disktool_core::{format_size, PartitionEntry, TableFormat};
use disktool_pipeline::{open_source, SourceConfig};
use disktool_zones::inspect;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct GptPartInfo {
    pub guid: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub type_guid: String,
    pub name: String,
    pub attrs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MbrPartInfo {
    pub bootable: bool,
    #[serde(rename = "type")]
    pub type_name: String,
    pub type_code: u8,
}

/// One listed partition
#[derive(Debug, Serialize)]
pub struct PartInfo {
    pub index: usize,
    pub size: u64,
    pub sectors: u64,
    pub start: u64,
    pub end: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpt_info: Option<GptPartInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbr_info: Option<MbrPartInfo>,
}

impl From<&PartitionEntry> for PartInfo {
    fn from(entry: &PartitionEntry) -> Self {
        Self {
            index: entry.index,
            size: entry.size_bytes,
            sectors: entry.sector_count,
            start: entry.start_block,
            end: entry.end_block,
            gpt_info: entry.gpt.as_ref().map(|gpt| GptPartInfo {
                guid: gpt.guid.clone(),
                type_name: gpt.type_name.clone(),
                type_guid: gpt.type_guid.clone(),
                name: gpt.name.clone(),
                attrs: gpt.attributes.clone(),
            }),
            mbr_info: entry.mbr.as_ref().map(|mbr| MbrPartInfo {
                bootable: mbr.bootable,
                type_name: mbr.type_name.clone(),
                type_code: mbr.type_code,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LsOutput {
    pub partitions: Vec<PartInfo>,
    #[serde(skip)]
    pub format: TableFormat,
}

impl LsOutput {
    pub fn new(format: TableFormat, entries: &[PartitionEntry]) -> Self {
        Self {
            partitions: entries.iter().map(PartInfo::from).collect(),
            format,
        }
    }

    fn gpt_table(&self) -> Table {
        let mut table = Table::new(&[
            "#",
            "GUID",
            "Name",
            "Size",
            "Sectors",
            "Start",
            "End",
            "Type",
            "Type GUID",
            "Attributes",
        ]);

        for part in &self.partitions {
            let mut row = common_cells(part);
            if let Some(gpt) = &part.gpt_info {
                row.insert(1, gpt.guid.clone());
                row.insert(2, gpt.name.clone());
                row.push(gpt.type_name.clone());
                row.push(gpt.type_guid.clone());
                row.push(gpt.attrs.join(", "));
            } else {
                row.insert(1, String::new());
                row.insert(2, String::new());
            }
            table.push_row(row);
        }
        table
    }

    fn mbr_table(&self) -> Table {
        let mut table = Table::new(&["#", "Boot", "Size", "Sectors", "Start", "End", "Type", "Code"]);

        for part in &self.partitions {
            let mut row = common_cells(part);
            if let Some(mbr) = &part.mbr_info {
                row.insert(1, if mbr.bootable { "*" } else { "" }.to_string());
                row.push(mbr.type_name.clone());
                row.push(format!("0x{:02X}", mbr.type_code));
            } else {
                row.insert(1, String::new());
            }
            table.push_row(row);
        }
        table
    }
}

/// Index, size, sectors, start and end cells
fn common_cells(part: &PartInfo) -> Vec<String> {
    vec![
        part.index.to_string(),
        format_size(part.size),
        part.sectors.to_string(),
        part.start.to_string(),
        part.end.map(|end| end.to_string()).unwrap_or_default(),
    ]
}

impl Render for LsOutput {
    fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.partitions.is_empty() {
            return writeln!(out, "No partitions found.");
        }

        let table = match self.format {
            TableFormat::Gpt => self.gpt_table(),
            TableFormat::Mbr => self.mbr_table(),
        };
        table.render(out)
    }
}

/// Inspect the image at `path` and write its partition listing
pub fn run(
    path: &Path,
    config: &SourceConfig,
    show_all: bool,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let source = open_source(path, config)?;
    let inspection = inspect(source.as_ref())?;

    let output = LsOutput::new(inspection.descriptor.format, &inspection.partitions(show_all));
    format.emit(&output, out)
}
