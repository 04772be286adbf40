//! Host introspection of image files and block devices

use crate::config::SourceConfig;
use disktool_core::limits::DEFAULT_SECTOR_SIZE;
use disktool_core::{Error, Result, SourceKind};
use std::fs::{File, Metadata};
use std::io::{Seek, SeekFrom};

/// Geometry of an opened source, resolved once at open time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub kind: SourceKind,
    pub writable: bool,
    pub logical_block_size: u64,
    pub physical_block_size: u64,
    pub total_size: u64,
}

impl Geometry {
    /// Probe an opened file or block device
    ///
    /// Image files report 512-byte blocks. On Linux, block devices report the
    /// sizes published under `/sys/dev/block/<major>:<minor>/queue`; elsewhere,
    /// or when sysfs is unavailable, they fall back to 512 bytes as well.
    /// A block size configured in `config` always wins.
    pub fn probe(file: &File, config: &SourceConfig) -> Result<Self> {
        config.validate()?;
        let metadata = file.metadata()?;

        let mut geometry = if is_device(&metadata) {
            probe_device(file, &metadata)?
        } else if metadata.is_file() {
            Geometry {
                kind: SourceKind::File,
                writable: !metadata.permissions().readonly(),
                logical_block_size: DEFAULT_SECTOR_SIZE,
                physical_block_size: DEFAULT_SECTOR_SIZE,
                total_size: metadata.len(),
            }
        } else {
            return Err(Error::invalid_operation(
                "Source is neither a regular file nor a block device",
            ));
        };

        if let Some(block_size) = config.logical_block_size {
            geometry.logical_block_size = block_size;
            geometry.physical_block_size = geometry.physical_block_size.max(block_size);
        }

        tracing::debug!(
            "Probed {} source: {} bytes, logical block {}, physical block {}, writable {}",
            geometry.kind.name(),
            geometry.total_size,
            geometry.logical_block_size,
            geometry.physical_block_size,
            geometry.writable
        );

        Ok(geometry)
    }
}

#[cfg(unix)]
fn is_device(metadata: &Metadata) -> bool {
    use std::os::unix::fs::FileTypeExt;
    let file_type = metadata.file_type();
    file_type.is_block_device() || file_type.is_char_device()
}

#[cfg(not(unix))]
fn is_device(_metadata: &Metadata) -> bool {
    false
}

fn probe_device(file: &File, metadata: &Metadata) -> Result<Geometry> {
    // Device nodes report a zero length in their metadata
    let mut handle = file;
    let total_size = handle.seek(SeekFrom::End(0))?;

    let queue = DeviceQueue::query(metadata);

    Ok(Geometry {
        kind: SourceKind::Device,
        writable: queue
            .read_only
            .map(|ro| !ro)
            .unwrap_or_else(|| !metadata.permissions().readonly()),
        logical_block_size: queue.logical_block_size.unwrap_or(DEFAULT_SECTOR_SIZE),
        physical_block_size: queue.physical_block_size.unwrap_or(DEFAULT_SECTOR_SIZE),
        total_size,
    })
}

/// Block-device attributes published by the kernel
#[derive(Debug, Default)]
struct DeviceQueue {
    logical_block_size: Option<u64>,
    physical_block_size: Option<u64>,
    read_only: Option<bool>,
}

impl DeviceQueue {
    #[cfg(target_os = "linux")]
    fn query(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        use std::path::Path;

        let (major, minor) = split_dev(metadata.rdev());
        let base = format!("/sys/dev/block/{}:{}", major, minor);
        let base = Path::new(&base);

        let queue = Self {
            logical_block_size: read_sysfs_u64(&base.join("queue/logical_block_size")),
            physical_block_size: read_sysfs_u64(&base.join("queue/physical_block_size")),
            read_only: read_sysfs_u64(&base.join("ro")).map(|ro| ro != 0),
        };
        tracing::trace!("sysfs {}: {:?}", base.display(), queue);
        queue
    }

    #[cfg(not(target_os = "linux"))]
    fn query(_metadata: &Metadata) -> Self {
        Self::default()
    }
}

/// Split a Linux `dev_t` into its major and minor numbers
#[cfg(target_os = "linux")]
fn split_dev(dev: u64) -> (u64, u64) {
    let major = ((dev >> 32) & 0xffff_f000) | ((dev >> 8) & 0x0000_0fff);
    let minor = ((dev >> 12) & 0xffff_ff00) | (dev & 0x0000_00ff);
    (major, minor)
}

#[cfg(target_os = "linux")]
fn read_sysfs_u64(path: &std::path::Path) -> Option<u64> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}
