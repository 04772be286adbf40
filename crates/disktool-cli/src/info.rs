//! `disktool info`

use crate::output::{OutputFormat, Render};
use disktool_core::{
    format_size, DiskDescriptor, GptDiskDetail, MbrDiskDetail, SourceKind, TableDetail,
};
use disktool_pipeline::{open_source, SourceConfig};
use disktool_zones::inspect;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

/// Disk-level facts about an inspected image
#[derive(Debug, Serialize)]
pub struct DiskInfo {
    #[serde(rename = "type")]
    pub table_type: String,
    pub file_type: String,
    pub writable: bool,
    pub block_size: u64,
    pub phys_block_size: u64,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpt: Option<GptDiskDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbr: Option<MbrDiskDetail>,
}

impl DiskInfo {
    pub fn new(descriptor: &DiskDescriptor, detail: TableDetail) -> Self {
        let (gpt, mbr) = match detail {
            TableDetail::Gpt(gpt) => (Some(gpt), None),
            TableDetail::Mbr(mbr) => (None, Some(mbr)),
        };

        Self {
            table_type: descriptor.format.name().to_string(),
            file_type: descriptor.source_kind.name().to_string(),
            writable: descriptor.writable,
            block_size: descriptor.logical_block_size,
            phys_block_size: descriptor.physical_block_size,
            size: descriptor.total_size,
            gpt,
            mbr,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InfoOutput {
    pub disk_info: DiskInfo,
}

impl Render for InfoOutput {
    fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
        let info = &self.disk_info;
        let medium = if info.file_type == SourceKind::File.name() {
            "disk image file"
        } else {
            "block device"
        };
        let mode = if info.writable { "read-write" } else { "read-only" };

        writeln!(
            out,
            "{}-formatted {} ({})",
            info.table_type.to_uppercase(),
            medium,
            mode
        )?;
        writeln!(out, "Logical Block Size: {}", info.block_size)?;
        writeln!(out, "Physical Block Size: {}", info.phys_block_size)?;
        writeln!(out, "Total Size: {}", format_size(info.size))?;

        if let Some(gpt) = &info.gpt {
            writeln!(out, "Disk GUID: {}", gpt.disk_guid)?;
            writeln!(out, "GPT Revision: 0x{:08X}", gpt.revision)?;
            writeln!(
                out,
                "Partition Entries: {} x {} bytes at LBA {}",
                gpt.entry_count, gpt.entry_size, gpt.entries_lba
            )?;
            writeln!(
                out,
                "Usable LBAs: {} - {}",
                gpt.first_usable_lba, gpt.last_usable_lba
            )?;
            writeln!(out, "Backup Header LBA: {}", gpt.backup_lba)?;
        }

        if let Some(mbr) = &info.mbr {
            writeln!(out, "Disk Signature: 0x{:08X}", mbr.disk_signature)?;
        }

        Ok(())
    }
}

/// Inspect the image at `path` and write its disk-level description
pub fn run(
    path: &Path,
    config: &SourceConfig,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let source = open_source(path, config)?;
    let inspection = inspect(source.as_ref())?;

    let output = InfoOutput {
        disk_info: DiskInfo::new(&inspection.descriptor, inspection.table.detail()),
    };
    format.emit(&output, out)
}
