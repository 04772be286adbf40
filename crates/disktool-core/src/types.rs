//! Core types for disk inspection

use crate::source::ByteSource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition table format of a disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// GUID Partition Table behind a protective MBR
    Gpt,
    /// Classic four-entry Master Boot Record
    Mbr,
}

impl TableFormat {
    /// Short lowercase name ("gpt" / "mbr")
    pub fn name(&self) -> &'static str {
        match self {
            TableFormat::Gpt => "gpt",
            TableFormat::Mbr => "mbr",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFormat::Gpt => write!(f, "GPT"),
            TableFormat::Mbr => write!(f, "MBR"),
        }
    }
}

/// Kind of medium backing a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Regular disk image file
    File,
    /// Block device
    Device,
}

impl SourceKind {
    /// Short lowercase name ("file" / "device")
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::File => "file",
            SourceKind::Device => "device",
        }
    }
}

/// Disk-level description of an opened image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskDescriptor {
    pub format: TableFormat,
    pub source_kind: SourceKind,
    pub writable: bool,
    pub logical_block_size: u64,
    pub physical_block_size: u64,
    pub total_size: u64,
}

impl DiskDescriptor {
    /// Snapshot the geometry of `source` for a table of the given format
    pub fn from_source(source: &dyn ByteSource, format: TableFormat) -> Self {
        Self {
            format,
            source_kind: source.source_kind(),
            writable: source.writable(),
            logical_block_size: source.logical_block_size(),
            physical_block_size: source.physical_block_size(),
            total_size: source.total_size(),
        }
    }
}

/// GPT-specific metadata of one partition slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GptPartitionDetail {
    /// Unique partition GUID
    pub guid: String,
    /// Partition type GUID
    pub type_guid: String,
    /// Short name of the type GUID, empty when the GUID is not well known
    pub type_name: String,
    /// Partition label
    pub name: String,
    /// Names of the known attribute bits that are set, in bit order
    pub attributes: Vec<String>,
}

/// MBR-specific metadata of one partition slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MbrPartitionDetail {
    /// Boot indicator (0x80)
    pub bootable: bool,
    /// Partition type byte
    pub type_code: u8,
    /// Short name of the type byte, empty when unknown
    pub type_name: String,
}

/// Format-specific metadata attached to a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotDetail {
    Gpt(GptPartitionDetail),
    Mbr(MbrPartitionDetail),
}

/// One raw slot of a partition table, as produced by a decoder
///
/// Unused slots carry a zero offset and length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSlot {
    /// Position of the slot in the table (0-based)
    pub index: usize,
    /// Offset of the partition from the start of the disk in bytes
    pub offset: u64,
    /// Length of the partition in bytes
    pub length: u64,
    /// Format-specific metadata
    pub detail: SlotDetail,
}

impl TableSlot {
    /// An unused slot holds no partition
    pub fn is_empty(&self) -> bool {
        self.offset == 0 || self.length == 0
    }
}

impl fmt::Display for TableSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_name = match &self.detail {
            SlotDetail::Gpt(gpt) => gpt.type_name.as_str(),
            SlotDetail::Mbr(mbr) => mbr.type_name.as_str(),
        };
        write!(
            f,
            "Slot {} [{} @ 0x{:08X}, {} bytes]",
            self.index,
            if type_name.is_empty() { "unknown" } else { type_name },
            self.offset,
            self.length
        )
    }
}

/// A normalized partition record, identical in shape for GPT and MBR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionEntry {
    /// Slot index in the table (not compacted)
    pub index: usize,
    /// First logical block
    pub start_block: u64,
    /// Size in bytes
    pub size_bytes: u64,
    /// Size in logical blocks
    pub sector_count: u64,
    /// Last logical block (inclusive), absent for empty slots
    pub end_block: Option<u64>,
    /// Present only for GPT disks
    pub gpt: Option<GptPartitionDetail>,
    /// Present only for MBR disks
    pub mbr: Option<MbrPartitionDetail>,
}

impl PartitionEntry {
    /// Normalize a decoded slot into block units
    ///
    /// `logical_block_size` must be non-zero; sources guarantee this at open time.
    pub fn from_slot(slot: &TableSlot, logical_block_size: u64) -> Self {
        let sector_count = slot.length / logical_block_size;
        let start_block = slot.offset / logical_block_size;
        let end_block = (sector_count > 0).then(|| start_block + sector_count - 1);

        let (gpt, mbr) = match &slot.detail {
            SlotDetail::Gpt(detail) => (Some(detail.clone()), None),
            SlotDetail::Mbr(detail) => (None, Some(detail.clone())),
        };

        Self {
            index: slot.index,
            start_block,
            size_bytes: slot.length,
            sector_count,
            end_block,
            gpt,
            mbr,
        }
    }

    /// An entry is empty when it starts at block 0 or has no size
    pub fn is_empty(&self) -> bool {
        self.start_block == 0 || self.size_bytes == 0
    }
}

/// GPT header fields reported at disk level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GptDiskDetail {
    pub disk_guid: String,
    pub revision: u32,
    pub current_lba: u64,
    pub backup_lba: u64,
    pub first_usable_lba: u64,
    pub last_usable_lba: u64,
    pub entries_lba: u64,
    pub entry_count: u32,
    pub entry_size: u32,
}

/// MBR fields reported at disk level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MbrDiskDetail {
    pub disk_signature: u32,
}

/// Disk-level metadata of a decoded table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableDetail {
    Gpt(GptDiskDetail),
    Mbr(MbrDiskDetail),
}

/// Format size in human-readable format
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = size as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}
