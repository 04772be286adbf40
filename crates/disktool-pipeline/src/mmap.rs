//! Memory-mapped source for regular image files

use crate::file::FileSource;
use crate::geometry::Geometry;
use disktool_core::limits::{check_read_range, MAX_MMAP_SIZE};
use disktool_core::{ByteSource, Error, Result, SourceKind};
use memmap2::Mmap;
use std::path::{Path, PathBuf};

/// A source backed by a read-only memory map of an image file
///
/// Reads are plain slice copies, with no system call per read.
///
/// # Example
///
/// ```rust,no_run
/// use disktool_pipeline::{FileSource, MmapSource, SourceConfig};
/// use std::path::Path;
///
/// let file = FileSource::open(Path::new("disk.img"), &SourceConfig::default()).unwrap();
/// let source = MmapSource::from_file_source(file).unwrap();
/// ```
pub struct MmapSource {
    mmap: Mmap,
    path: PathBuf,
    geometry: Geometry,
}

impl MmapSource {
    /// Map an already-opened image file
    ///
    /// # Errors
    ///
    /// Returns an error if the source is a block device, exceeds the mapping
    /// limit, or the mapping fails.
    ///
    /// # Safety
    ///
    /// Uses `unsafe` for memory mapping because:
    /// - The file descriptor is valid (the file source opened it)
    /// - The source is a regular file, not a device or pipe
    /// - The mapping is read-only
    /// - The file must not be truncated while mapped (caller responsibility)
    pub fn from_file_source(source: FileSource) -> Result<Self> {
        let (file, path, geometry) = source.into_parts();

        if geometry.kind != SourceKind::File {
            return Err(Error::invalid_operation(
                "Only regular files can be memory-mapped",
            ));
        }

        if geometry.total_size > MAX_MMAP_SIZE {
            return Err(Error::invalid_operation(format!(
                "File size {} exceeds memory mapping limit {}",
                geometry.total_size, MAX_MMAP_SIZE
            )));
        }

        // SAFETY: see the function documentation
        let mmap = unsafe { Mmap::map(&file)? };

        // The file may have changed size between probing and mapping
        let geometry = Geometry {
            total_size: mmap.len() as u64,
            ..geometry
        };

        Ok(Self {
            mmap,
            path,
            geometry,
        })
    }

    /// Path this source was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The entire mapped image
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }
}

impl ByteSource for MmapSource {
    fn identify(&self) -> &str {
        "Memory-mapped image file"
    }

    fn total_size(&self) -> u64 {
        self.geometry.total_size
    }

    fn logical_block_size(&self) -> u64 {
        self.geometry.logical_block_size
    }

    fn physical_block_size(&self) -> u64 {
        self.geometry.physical_block_size
    }

    fn writable(&self) -> bool {
        self.geometry.writable
    }

    fn source_kind(&self) -> SourceKind {
        self.geometry.kind
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        check_read_range(offset, buf.len() as u64, self.geometry.total_size)?;
        let start = offset as usize;
        buf.copy_from_slice(&self.mmap[start..start + buf.len()]);
        Ok(())
    }
}
