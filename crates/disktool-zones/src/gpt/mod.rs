//! GPT (GUID Partition Table) decoder

pub mod attributes;
pub mod types;

use attributes::decode_attributes;
use disktool_core::limits::MAX_PARTITION_ARRAY_SIZE;
use disktool_core::{
    ByteSource, Error, GptDiskDetail, GptPartitionDetail, PartitionTable, Result, SlotDetail,
    TableDetail, TableFormat, TableSlot,
};
use types::{GptHeader, GptPartitionEntry};

/// GPT partition table
///
/// The GUID Partition Table is the partitioning scheme used by UEFI-based systems.
/// Every slot of the entry array is kept, used or not, so slot indices match
/// the on-disk positions.
///
/// # Structure
///
/// ```text
/// LBA 0:    Protective MBR (for backward compatibility)
/// LBA 1:    Primary GPT header
/// LBA 2-33: Partition entries array (typically 128 entries)
/// LBA 34+:  Usable disk space
/// ...
/// Last 33:  Backup partition entries array
/// Last 1:   Backup GPT header
/// ```
#[derive(Debug, Clone)]
pub struct GptTable {
    header: GptHeader,
    slots: Vec<TableSlot>,
}

impl GptTable {
    /// LBA of the primary header
    pub const HEADER_LBA: u64 = 1;

    /// Decode the primary GPT of `source`
    ///
    /// # Errors
    ///
    /// - [`Error::ChecksumMismatch`] if the header or entry array CRC32 is wrong.
    ///   The header checksum is verified before any header field is used.
    /// - [`Error::UnrecognizedFormat`] if a correctly checksummed header lacks
    ///   the "EFI PART" signature
    /// - [`Error::TruncatedTable`] if the declared entry array extends past the
    ///   end of the source
    /// - [`Error::InvalidEntry`] for an unsupported entry size or a malformed entry
    pub fn decode(source: &dyn ByteSource) -> Result<Self> {
        let block_size = source.logical_block_size();
        let block = source.read_block(Self::HEADER_LBA)?;

        let header = GptHeader::from_bytes(&block).ok_or_else(|| {
            Error::unrecognized_format("logical block too small to hold a GPT header")
        })?;

        let computed = header.compute_header_crc32(&block);
        if computed != header.header_crc32 {
            return Err(Error::checksum_mismatch(format!(
                "GPT header CRC32 mismatch: stored 0x{:08X}, computed 0x{:08X}",
                header.header_crc32, computed
            )));
        }

        if !header.has_valid_signature() {
            return Err(Error::unrecognized_format(
                "missing \"EFI PART\" signature at LBA 1",
            ));
        }

        tracing::debug!(
            "GPT header: revision 0x{:08X}, {} entries of {} bytes at LBA {}",
            header.revision,
            header.num_partition_entries,
            header.partition_entry_size,
            header.partition_entries_lba
        );

        let entry_size = header.partition_entry_size as usize;
        if entry_size < GptPartitionEntry::ENTRY_SIZE || entry_size % 8 != 0 {
            return Err(Error::invalid_layout(format!(
                "unsupported GPT partition entry size {}",
                entry_size
            )));
        }

        // Bounds are checked against the source before anything is allocated
        let available = source.total_size();
        let array_len = header.entry_array_len();
        let array_offset = header.partition_entries_lba.checked_mul(block_size);
        let required = array_offset.and_then(|offset| offset.checked_add(array_len));
        let array_offset = match (array_offset, required) {
            (Some(offset), Some(required)) if required <= available => offset,
            (_, required) => {
                return Err(Error::TruncatedTable {
                    required: required.unwrap_or(u64::MAX),
                    available,
                })
            }
        };

        if array_len > MAX_PARTITION_ARRAY_SIZE {
            return Err(Error::invalid_layout(format!(
                "GPT partition entry array of {} bytes exceeds limit {}",
                array_len, MAX_PARTITION_ARRAY_SIZE
            )));
        }

        let entries = source.read_vec(array_offset, array_len)?;

        let computed = GptHeader::compute_entries_crc32(&entries);
        if computed != header.partition_entries_crc32 {
            return Err(Error::checksum_mismatch(format!(
                "GPT partition entries CRC32 mismatch: stored 0x{:08X}, computed 0x{:08X}",
                header.partition_entries_crc32, computed
            )));
        }

        let slots = entries
            .chunks_exact(entry_size)
            .enumerate()
            .map(|(index, bytes)| decode_slot(index, bytes, block_size))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "GPT decoded: {} slots, {} in use",
            slots.len(),
            slots.iter().filter(|slot| !slot.is_empty()).count()
        );

        Ok(Self { header, slots })
    }

    /// Get the GPT header
    pub fn header(&self) -> &GptHeader {
        &self.header
    }

    /// Get the number of usable sectors on the disk
    pub fn usable_lba_count(&self) -> u64 {
        if self.header.last_usable_lba >= self.header.first_usable_lba {
            self.header.last_usable_lba - self.header.first_usable_lba + 1
        } else {
            0
        }
    }
}

fn decode_slot(index: usize, bytes: &[u8], block_size: u64) -> Result<TableSlot> {
    let entry = GptPartitionEntry::from_bytes(bytes)
        .ok_or_else(|| Error::invalid_entry(index, "entry shorter than 128 bytes"))?;

    let detail = SlotDetail::Gpt(GptPartitionDetail {
        guid: entry.unique_partition_guid.to_string(),
        type_guid: entry.partition_type_guid.to_string(),
        type_name: entry.partition_type_guid.type_name().to_string(),
        name: entry.name.clone(),
        attributes: decode_attributes(entry.attributes),
    });

    if entry.is_unused() {
        return Ok(TableSlot {
            index,
            offset: 0,
            length: 0,
            detail,
        });
    }

    if entry.last_lba < entry.first_lba {
        return Err(Error::invalid_entry(
            index,
            format!(
                "last LBA {} precedes first LBA {}",
                entry.last_lba, entry.first_lba
            ),
        ));
    }

    let offset = entry.first_lba.checked_mul(block_size);
    let length = entry.size_lba().checked_mul(block_size);
    match (offset, length) {
        (Some(offset), Some(length)) => Ok(TableSlot {
            index,
            offset,
            length,
            detail,
        }),
        _ => Err(Error::invalid_entry(
            index,
            "partition extent overflows a 64-bit byte offset",
        )),
    }
}

impl PartitionTable for GptTable {
    fn identify(&self) -> &str {
        "GUID Partition Table"
    }

    fn format(&self) -> TableFormat {
        TableFormat::Gpt
    }

    fn slots(&self) -> &[TableSlot] {
        &self.slots
    }

    fn detail(&self) -> TableDetail {
        TableDetail::Gpt(GptDiskDetail {
            disk_guid: self.header.disk_guid.to_string(),
            revision: self.header.revision,
            current_lba: self.header.current_lba,
            backup_lba: self.header.backup_lba,
            first_usable_lba: self.header.first_usable_lba,
            last_usable_lba: self.header.last_usable_lba,
            entries_lba: self.header.partition_entries_lba,
            entry_count: self.header.num_partition_entries,
            entry_size: self.header.partition_entry_size,
        })
    }
}
