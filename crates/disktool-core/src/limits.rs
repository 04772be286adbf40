//! Bounds and size validation helpers
//!
//! Partition tables are untrusted input: every offset and length read from disk
//! goes through these helpers before it is used for I/O or allocation.

use crate::{Error, Result};

/// Smallest logical block size we'll accept (classic 512-byte sectors)
pub const MIN_SECTOR_SIZE: u64 = 512;

/// Largest logical block size we'll accept (4Kn advanced format)
pub const MAX_SECTOR_SIZE: u64 = 4096;

/// Block size assumed for image files and for devices that cannot be queried
pub const DEFAULT_SECTOR_SIZE: u64 = 512;

/// Size of the boot sector that holds the MBR / protective MBR
pub const BOOT_SECTOR_SIZE: u64 = 512;

/// Maximum size of a GPT partition entry array we'll read (16 MB)
///
/// The standard layout is 128 entries of 128 bytes (16 KB).
pub const MAX_PARTITION_ARRAY_SIZE: u64 = 16 * 1024 * 1024;

/// Maximum single read through [`crate::ByteSource::read_vec`] (256 MB)
pub const MAX_READ_SIZE: u64 = 256 * 1024 * 1024;

/// Maximum file size for memory mapping (16 GB)
pub const MAX_MMAP_SIZE: u64 = 16 * 1024 * 1024 * 1024;

/// Validate that a logical block size is a power of two within the accepted range
pub fn validate_sector_size(sector_size: u64) -> Result<()> {
    if !(MIN_SECTOR_SIZE..=MAX_SECTOR_SIZE).contains(&sector_size) {
        return Err(Error::invalid_operation(format!(
            "Invalid sector size: {} (must be {}-{})",
            sector_size, MIN_SECTOR_SIZE, MAX_SECTOR_SIZE
        )));
    }

    if !sector_size.is_power_of_two() {
        return Err(Error::invalid_operation(format!(
            "Sector size {} is not a power of 2",
            sector_size
        )));
    }

    Ok(())
}

/// Check that `length` bytes at `offset` lie within a source of `size` bytes
pub fn check_read_range(offset: u64, length: u64, size: u64) -> Result<()> {
    match offset.checked_add(length) {
        Some(end) if end <= size => Ok(()),
        _ => Err(Error::OutOfRange {
            offset,
            length,
            size,
        }),
    }
}

/// Convert a length to `usize`, rejecting anything above `limit`
pub fn checked_length(length: u64, limit: u64, context: &str) -> Result<usize> {
    if length > limit {
        return Err(Error::invalid_operation(format!(
            "{} size {} exceeds limit {}",
            context, length, limit
        )));
    }

    length.try_into().map_err(|_| {
        Error::invalid_operation(format!(
            "{}: value {} exceeds platform usize limit",
            context, length
        ))
    })
}
