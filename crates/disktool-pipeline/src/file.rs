//! File source - positional reads on an image file or block device

use crate::config::SourceConfig;
use crate::geometry::Geometry;
use disktool_core::limits::check_read_range;
use disktool_core::{ByteSource, Error, Result, SourceKind};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// A source reading directly from an open file handle
///
/// The handle is always opened read-only. Reads are positional, so the source
/// keeps no cursor and can be shared by reference.
///
/// # Example
///
/// ```rust,no_run
/// use disktool_pipeline::{FileSource, SourceConfig};
/// use disktool_core::ByteSource;
/// use std::path::Path;
///
/// let source = FileSource::open(Path::new("/dev/sda"), &SourceConfig::default()).unwrap();
/// println!("{} bytes, {}-byte blocks", source.total_size(), source.logical_block_size());
/// ```
#[derive(Debug)]
pub struct FileSource {
    file: File,
    path: PathBuf,
    geometry: Geometry,
}

impl FileSource {
    /// Open `path` read-only and probe its geometry
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist, cannot be opened, or is
    /// neither a regular file nor a block device.
    pub fn open(path: &Path, config: &SourceConfig) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::from_open(e, path))?;
        let geometry = Geometry::probe(&file, config)?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            geometry,
        })
    }

    /// Path this source was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Geometry resolved at open time
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub(crate) fn into_parts(self) -> (File, PathBuf, Geometry) {
        (self.file, self.path, self.geometry)
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                ))
            }
            Ok(n) => {
                buf = &mut buf[n..];
                offset += n as u64;
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

impl ByteSource for FileSource {
    fn identify(&self) -> &str {
        match self.geometry.kind {
            SourceKind::File => "Image file",
            SourceKind::Device => "Block device",
        }
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
        tracing::trace!("read {} bytes at 0x{:X} from {}", buf.len(), offset, self.path.display());
        read_exact_at(&self.file, buf, offset)?;
        Ok(())
    }
}
