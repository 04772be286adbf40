//! Core traits for disk inspection

use crate::limits::{check_read_range, checked_length, MAX_READ_SIZE};
use crate::types::{SourceKind, TableDetail, TableFormat, TableSlot};
use crate::Result;

/// Read-only random access to a disk image
///
/// Geometry attributes are resolved when the source is opened and never change
/// afterwards. Reads take `&self`: inspecting a source never mutates it, and two
/// reads of the same range return the same bytes.
pub trait ByteSource: Send + Sync {
    /// Get a human-readable identifier for this source backend
    fn identify(&self) -> &str;

    /// Total size of the source in bytes
    fn total_size(&self) -> u64;

    /// Logical block (sector) size in bytes; LBAs are counted in this unit
    fn logical_block_size(&self) -> u64;

    /// Physical block size reported by the medium
    fn physical_block_size(&self) -> u64;

    /// Whether the underlying medium is writable (the source itself never writes)
    fn writable(&self) -> bool;

    /// Whether the source is an image file or a block device
    fn source_kind(&self) -> SourceKind;

    /// Fill `buf` with the bytes starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfRange`] when `offset + buf.len()` exceeds
    /// [`ByteSource::total_size`], before any I/O is attempted.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Read `length` bytes at `offset` into a new buffer
    fn read_vec(&self, offset: u64, length: u64) -> Result<Vec<u8>> {
        check_read_range(offset, length, self.total_size())?;
        let mut buf = vec![0u8; checked_length(length, MAX_READ_SIZE, "Read")?];
        self.read_at(offset, &mut buf)?;
        Ok(buf)
    }

    /// Read the logical block at `lba`
    fn read_block(&self, lba: u64) -> Result<Vec<u8>> {
        let block_size = self.logical_block_size();
        let offset = lba.checked_mul(block_size).ok_or(crate::Error::OutOfRange {
            offset: u64::MAX,
            length: block_size,
            size: self.total_size(),
        })?;
        self.read_vec(offset, block_size)
    }
}

/// A decoded partition table
pub trait PartitionTable: Send + Sync {
    /// Get a human-readable identifier for this table type
    fn identify(&self) -> &str;

    /// The on-disk format this table was decoded from
    fn format(&self) -> TableFormat;

    /// Every slot of the table in on-disk order, including empty ones
    fn slots(&self) -> &[TableSlot];

    /// Disk-level metadata recorded by the table
    fn detail(&self) -> TableDetail;

    /// Get a specific slot by index
    fn slot(&self, index: usize) -> Option<&TableSlot> {
        self.slots().get(index)
    }
}
