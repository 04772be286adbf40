//! One-pass inspection of a disk image

use crate::detect::detect;
use crate::gpt::GptTable;
use crate::mbr::MbrTable;
use crate::model::list_partitions;
use disktool_core::{ByteSource, DiskDescriptor, PartitionEntry, PartitionTable, Result, TableFormat};

/// The outcome of detecting and decoding a source
pub struct Inspection {
    /// Geometry of the source and the detected format
    pub descriptor: DiskDescriptor,
    /// The decoded table
    pub table: Box<dyn PartitionTable>,
}

impl Inspection {
    /// Normalized partitions of the decoded table
    pub fn partitions(&self, include_empty: bool) -> Vec<PartitionEntry> {
        list_partitions(&self.descriptor, self.table.slots(), include_empty)
    }
}

impl std::fmt::Debug for Inspection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inspection")
            .field("descriptor", &self.descriptor)
            .field("table", &self.table.identify())
            .field("slots", &self.table.slots().len())
            .finish()
    }
}

/// Decode the table of a known format
pub fn decode_table(source: &dyn ByteSource, format: TableFormat) -> Result<Box<dyn PartitionTable>> {
    Ok(match format {
        TableFormat::Gpt => Box::new(GptTable::decode(source)?),
        TableFormat::Mbr => Box::new(MbrTable::decode(source)?),
    })
}

/// Detect the table format of `source` and decode it
///
/// # Errors
///
/// Any detection or decoding error is returned unchanged.
pub fn inspect(source: &dyn ByteSource) -> Result<Inspection> {
    tracing::debug!(
        "Inspecting {} ({} bytes, {}-byte blocks)",
        source.identify(),
        source.total_size(),
        source.logical_block_size()
    );

    let format = detect(source)?;
    let table = decode_table(source, format)?;
    let descriptor = DiskDescriptor::from_source(source, format);

    Ok(Inspection { descriptor, table })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, FixturePartition, GptImage};
    use disktool_core::{Error, SourceKind, TableDetail};
    use disktool_pipeline::{open_source, SourceConfig};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_inspect_gpt() {
        let disk = GptImage::new(512, 1000)
            .with_partition(0, FixturePartition::linux(100, 199))
            .build();
        let inspection = inspect(&fixtures::source(disk)).unwrap();

        assert_eq!(inspection.descriptor.format, TableFormat::Gpt);
        assert_eq!(inspection.descriptor.total_size, 512_000);
        assert_eq!(inspection.table.identify(), "GUID Partition Table");
        assert_eq!(inspection.partitions(false).len(), 1);
        assert_eq!(inspection.partitions(true).len(), 128);
        assert!(matches!(inspection.table.detail(), TableDetail::Gpt(_)));
    }

    #[test]
    fn test_inspect_mbr() {
        let disk = fixtures::mbr_image(8192, &[(0, 0x80, 0x83, 2048, 1024)]);
        let inspection = inspect(&fixtures::source(disk)).unwrap();

        assert_eq!(inspection.descriptor.format, TableFormat::Mbr);
        assert_eq!(inspection.table.identify(), "Master Boot Record");
        assert_eq!(inspection.partitions(false).len(), 1);
    }

    #[test]
    fn test_inspect_propagates_decode_errors() {
        let mut disk = GptImage::new(512, 1000).build();
        disk[512 + 40] ^= 0x80;

        let result = inspect(&fixtures::source(disk));
        assert!(matches!(result, Err(Error::ChecksumMismatch(_))));
    }

    #[test]
    fn test_inspect_unrecognized() {
        let result = inspect(&fixtures::source(vec![0u8; 4096]));
        assert!(matches!(result, Err(Error::UnrecognizedFormat(_))));
    }

    #[test]
    fn test_inspect_image_file() {
        let disk = GptImage::new(512, 2048)
            .with_partition(0, FixturePartition::linux(34, 2014))
            .build();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&disk).unwrap();
        file.flush().unwrap();

        for use_mmap in [true, false] {
            let config = SourceConfig {
                use_mmap,
                ..SourceConfig::default()
            };
            let source = open_source(file.path(), &config).unwrap();
            let inspection = inspect(source.as_ref()).unwrap();

            assert_eq!(inspection.descriptor.source_kind, SourceKind::File);
            assert_eq!(inspection.descriptor.total_size, 2048 * 512);

            let entries = inspection.partitions(false);
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].start_block, 34);
            assert_eq!(entries[0].end_block, Some(2014));
        }
    }
}
