//! Partition table format detection

use crate::gpt::types::GptHeader;
use crate::mbr::types::BootSector;
use disktool_core::limits::BOOT_SECTOR_SIZE;
use disktool_core::{ByteSource, Error, Result, TableFormat};

/// Classify the partition table of `source`
///
/// A boot sector with the 0x55AA signature and a protective (0xEE) record is
/// GPT when "EFI PART" is found at logical block 1. Otherwise a boot sector
/// with at least one other non-empty record is MBR. Nothing is validated
/// beyond that; the decoders do it.
///
/// # Errors
///
/// Returns [`Error::UnrecognizedFormat`] when neither table is present,
/// including for images smaller than one boot sector.
pub fn detect(source: &dyn ByteSource) -> Result<TableFormat> {
    let size = source.total_size();
    if size < BOOT_SECTOR_SIZE {
        return Err(Error::unrecognized_format(format!(
            "image of {} bytes is smaller than a boot sector",
            size
        )));
    }

    let sector = source.read_vec(0, BOOT_SECTOR_SIZE)?;
    let boot = BootSector::from_bytes(&sector)
        .ok_or_else(|| Error::unrecognized_format("short boot sector"))?;

    if !boot.has_boot_signature() {
        return Err(Error::unrecognized_format("no 55AA boot signature"));
    }

    if boot.has_protective_partition() && has_gpt_signature(source)? {
        tracing::debug!("Detected GPT behind a protective MBR");
        return Ok(TableFormat::Gpt);
    }

    if boot.has_data_partition() {
        tracing::debug!("Detected MBR");
        return Ok(TableFormat::Mbr);
    }

    Err(Error::unrecognized_format(
        "boot sector holds no GPT signature and no MBR partitions",
    ))
}

fn has_gpt_signature(source: &dyn ByteSource) -> Result<bool> {
    let offset = source.logical_block_size();
    let len = GptHeader::SIGNATURE.len() as u64;
    if offset.saturating_add(len) > source.total_size() {
        return Ok(false);
    }

    let bytes = source.read_vec(offset, len)?;
    Ok(bytes.as_slice() == GptHeader::SIGNATURE.as_slice())
}
