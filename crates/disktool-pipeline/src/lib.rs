//! # disktool pipeline
//!
//! [`ByteSource`](disktool_core::ByteSource) backends for disk inspection.
//!
//! This crate provides the ways an image can be read:
//! - **FileSource**: positional reads on an image file or block device
//! - **MmapSource**: memory-mapped image files (regular files only)
//! - **MemorySource**: in-memory buffers
//!
//! ## Example
//!
//! ```rust,no_run
//! use disktool_pipeline::{open_source, SourceConfig};
//! use std::path::Path;
//!
//! let source = open_source(Path::new("disk.img"), &SourceConfig::default()).unwrap();
//! println!("{}: {} bytes", source.identify(), source.total_size());
//! ```

pub mod config;
pub mod file;
pub mod geometry;
pub mod memory;
pub mod mmap;

pub use config::SourceConfig;
pub use file::FileSource;
pub use geometry::Geometry;
pub use memory::MemorySource;
pub use mmap::MmapSource;

use disktool_core::limits::MAX_MMAP_SIZE;
use disktool_core::{ByteSource, Result, SourceKind};
use std::path::Path;

/// Open a read-only source for `path`, picking the backend from `config`
///
/// Regular files are memory-mapped when `config.use_mmap` is set and the file
/// fits the mapping limit; block devices and everything else use positional reads.
///
/// # Errors
///
/// Returns [`disktool_core::Error::NotFound`] or
/// [`disktool_core::Error::PermissionDenied`] when the path cannot be opened,
/// and [`disktool_core::Error::Io`] for other failures.
pub fn open_source(path: &Path, config: &SourceConfig) -> Result<Box<dyn ByteSource>> {
    let source = FileSource::open(path, config)?;
    let geometry = source.geometry();

    let mappable = geometry.kind == SourceKind::File
        && geometry.total_size > 0
        && geometry.total_size <= MAX_MMAP_SIZE;

    if config.use_mmap && mappable {
        tracing::debug!("Memory-mapping {}", path.display());
        return Ok(Box::new(MmapSource::from_file_source(source)?));
    }

    tracing::debug!(
        "Using positional reads for {} (mmap requested: {}, mappable: {})",
        path.display(),
        config.use_mmap,
        mappable
    );
    Ok(Box::new(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_image(len: usize) -> NamedTempFile {
        let mut tmpfile = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0u8..=255).cycle().take(len).collect();
        tmpfile.write_all(&data).unwrap();
        tmpfile.flush().unwrap();
        tmpfile
    }

    #[test]
    fn test_open_source_uses_mmap_by_default() {
        let tmpfile = temp_image(4096);
        let source = open_source(tmpfile.path(), &SourceConfig::default()).unwrap();

        assert_eq!(source.identify(), "Memory-mapped image file");
        assert_eq!(source.total_size(), 4096);
        assert_eq!(source.source_kind(), SourceKind::File);
    }

    #[test]
    fn test_open_source_without_mmap() {
        let tmpfile = temp_image(4096);
        let config = SourceConfig {
            use_mmap: false,
            ..SourceConfig::default()
        };
        let source = open_source(tmpfile.path(), &config).unwrap();

        assert_eq!(source.identify(), "Image file");
        assert_eq!(source.read_vec(256, 4).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_open_source_empty_file_is_not_mapped() {
        let tmpfile = NamedTempFile::new().unwrap();
        let source = open_source(tmpfile.path(), &SourceConfig::default()).unwrap();

        assert_eq!(source.identify(), "Image file");
        assert_eq!(source.total_size(), 0);
    }

    #[test]
    fn test_open_source_missing_path() {
        let result = open_source(
            Path::new("/nonexistent/disktool/disk.img"),
            &SourceConfig::default(),
        );
        assert!(matches!(result, Err(disktool_core::Error::NotFound(_))));
    }
}
