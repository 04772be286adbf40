//! In-memory source

use disktool_core::limits::{check_read_range, validate_sector_size, DEFAULT_SECTOR_SIZE};
use disktool_core::{ByteSource, Result, SourceKind};

/// A source over an owned byte buffer
///
/// Behaves like a read-only image file with 512-byte blocks unless configured
/// otherwise.
///
/// # Example
///
/// ```rust
/// use disktool_pipeline::MemorySource;
/// use disktool_core::ByteSource;
///
/// // A blank 1 MB image
/// let source = MemorySource::new(vec![0u8; 1024 * 1024]);
/// assert_eq!(source.total_size(), 1024 * 1024);
/// assert_eq!(source.logical_block_size(), 512);
/// ```
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Vec<u8>,
    logical_block_size: u64,
    physical_block_size: u64,
}

impl MemorySource {
    /// Wrap a buffer
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            logical_block_size: DEFAULT_SECTOR_SIZE,
            physical_block_size: DEFAULT_SECTOR_SIZE,
        }
    }

    /// Use a different block geometry
    ///
    /// # Errors
    ///
    /// Returns an error if `logical` is not a supported sector size.
    pub fn with_block_sizes(mut self, logical: u64, physical: u64) -> Result<Self> {
        validate_sector_size(logical)?;
        self.logical_block_size = logical;
        self.physical_block_size = physical.max(logical);
        Ok(self)
    }

    /// The wrapped buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl ByteSource for MemorySource {
    fn identify(&self) -> &str {
        "In-memory image"
    }

    fn total_size(&self) -> u64 {
        self.data.len() as u64
    }

    fn logical_block_size(&self) -> u64 {
        self.logical_block_size
    }

    fn physical_block_size(&self) -> u64 {
        self.physical_block_size
    }

    fn writable(&self) -> bool {
        false
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        check_read_range(offset, buf.len() as u64, self.total_size())?;
        let start = offset as usize;
        buf.copy_from_slice(&self.data[start..start + buf.len()]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disktool_core::Error;

    #[test]
    fn test_memory_source_read() {
        let source = MemorySource::new((0..100).collect());

        assert_eq!(source.identify(), "In-memory image");
        assert_eq!(source.read_vec(10, 3).unwrap(), vec![10, 11, 12]);
        assert!(!source.writable());
    }

    #[test]
    fn test_memory_source_out_of_range() {
        let source = MemorySource::new(vec![0u8; 100]);
        assert!(matches!(
            source.read_vec(90, 20),
            Err(Error::OutOfRange {
                offset: 90,
                length: 20,
                size: 100
            })
        ));
    }

    #[test]
    fn test_memory_source_block_sizes() {
        let source = MemorySource::new(vec![0u8; 16384])
            .with_block_sizes(4096, 4096)
            .unwrap();

        assert_eq!(source.logical_block_size(), 4096);
        assert_eq!(source.read_block(2).unwrap().len(), 4096);
        assert!(source.read_block(4).is_err());

        assert!(MemorySource::new(Vec::new()).with_block_sizes(100, 512).is_err());
    }
}
