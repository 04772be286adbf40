//! MBR (Master Boot Record) partition table implementation

pub mod types;

use disktool_core::limits::BOOT_SECTOR_SIZE;
use disktool_core::{
    ByteSource, Error, MbrDiskDetail, MbrPartitionDetail, PartitionTable, Result, SlotDetail,
    TableDetail, TableFormat, TableSlot,
};
use types::{BootSector, MbrPartitionRecord};

/// MBR partition table
///
/// The Master Boot Record is the traditional partitioning scheme used by BIOS-based systems.
/// It supports up to 4 primary partitions. All four slots are kept, so slot
/// indices match the on-disk record positions. LBA fields are counted in the
/// source's logical block size.
#[derive(Debug, Clone)]
pub struct MbrTable {
    slots: Vec<TableSlot>,
    disk_signature: u32,
}

impl MbrTable {
    /// Decode the MBR in the first sector of `source`
    ///
    /// # Errors
    ///
    /// - [`Error::UnrecognizedFormat`] if the source is shorter than one boot
    ///   sector or lacks the 0x55AA boot signature
    /// - [`Error::InvalidEntry`] if a used record has a boot indicator other than
    ///   0x00/0x80, or starts at LBA 0 with a non-zero length
    pub fn decode(source: &dyn ByteSource) -> Result<Self> {
        if source.total_size() < BOOT_SECTOR_SIZE {
            return Err(Error::unrecognized_format(format!(
                "image of {} bytes is smaller than a boot sector",
                source.total_size()
            )));
        }

        let sector = source.read_vec(0, BOOT_SECTOR_SIZE)?;
        let boot = BootSector::from_bytes(&sector)
            .ok_or_else(|| Error::unrecognized_format("short boot sector"))?;

        if !boot.has_boot_signature() {
            return Err(Error::unrecognized_format(format!(
                "invalid MBR boot signature: expected 55AA, got {:02X}{:02X}",
                boot.boot_signature[0], boot.boot_signature[1]
            )));
        }

        let block_size = source.logical_block_size();
        let slots = boot
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| decode_slot(index, record, block_size))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "MBR decoded: disk signature 0x{:08X}, {} of {} records in use",
            boot.disk_signature,
            boot.records.iter().filter(|r| !r.is_empty()).count(),
            BootSector::NUM_PARTITIONS
        );

        Ok(Self {
            slots,
            disk_signature: boot.disk_signature,
        })
    }

    /// Get the disk signature
    pub fn disk_signature(&self) -> u32 {
        self.disk_signature
    }
}

fn decode_slot(index: usize, record: &MbrPartitionRecord, block_size: u64) -> Result<TableSlot> {
    let detail = SlotDetail::Mbr(MbrPartitionDetail {
        bootable: record.is_bootable(),
        type_code: record.partition_type.to_byte(),
        type_name: record.partition_type.name().to_string(),
    });

    if record.is_empty() {
        return Ok(TableSlot {
            index,
            offset: 0,
            length: 0,
            detail,
        });
    }

    if record.status != MbrPartitionRecord::STATUS_ACTIVE
        && record.status != MbrPartitionRecord::STATUS_INACTIVE
    {
        return Err(Error::invalid_entry(
            index,
            format!("invalid boot indicator 0x{:02X}", record.status),
        ));
    }

    if record.lba_start == 0 && record.lba_length != 0 {
        return Err(Error::invalid_entry(
            index,
            "partition starts at LBA 0, overlapping the boot sector",
        ));
    }

    // u32 sector fields times a block size of at most 4096 cannot overflow u64
    Ok(TableSlot {
        index,
        offset: record.lba_start as u64 * block_size,
        length: record.lba_length as u64 * block_size,
        detail,
    })
}

impl PartitionTable for MbrTable {
    fn identify(&self) -> &str {
        "Master Boot Record"
    }

    fn format(&self) -> TableFormat {
        TableFormat::Mbr
    }

    fn slots(&self) -> &[TableSlot] {
        &self.slots
    }

    fn detail(&self) -> TableDetail {
        TableDetail::Mbr(MbrDiskDetail {
            disk_signature: self.disk_signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn mbr_detail(slot: &TableSlot) -> &MbrPartitionDetail {
        match &slot.detail {
            SlotDetail::Mbr(detail) => detail,
            other => panic!("expected MBR detail, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_valid_mbr() {
        let disk = fixtures::mbr_image(8192, &[(0, 0x80, 0x0C, 2048, 2048)]);
        let table = MbrTable::decode(&fixtures::source(disk)).unwrap();

        assert_eq!(table.identify(), "Master Boot Record");
        assert_eq!(table.format(), TableFormat::Mbr);
        assert_eq!(table.disk_signature(), 0x78563412);
        assert_eq!(table.slots().len(), 4);

        let slot = table.slot(0).unwrap();
        assert_eq!(slot.offset, 2048 * 512);
        assert_eq!(slot.length, 2048 * 512);

        let detail = mbr_detail(slot);
        assert!(detail.bootable);
        assert_eq!(detail.type_code, 0x0C);
        assert_eq!(detail.type_name, "fat32_lba");
    }

    #[test]
    fn test_four_slots_with_gaps() {
        let disk = fixtures::mbr_image(
            8192,
            &[(1, 0x00, 0x83, 2048, 1024), (3, 0x00, 0x82, 4096, 512)],
        );
        let table = MbrTable::decode(&fixtures::source(disk)).unwrap();

        let used: Vec<usize> = table
            .slots()
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.index)
            .collect();
        assert_eq!(used, vec![1, 3]);

        let empty = table.slot(0).unwrap();
        assert!(empty.is_empty());
        assert_eq!(mbr_detail(empty).type_name, "empty");
        assert_eq!(mbr_detail(table.slot(3).unwrap()).type_name, "linux_swap");
    }

    #[test]
    fn test_unknown_type_has_empty_name() {
        let disk = fixtures::mbr_image(8192, &[(0, 0x00, 0x42, 2048, 1024)]);
        let table = MbrTable::decode(&fixtures::source(disk)).unwrap();

        let detail = mbr_detail(table.slot(0).unwrap());
        assert_eq!(detail.type_code, 0x42);
        assert_eq!(detail.type_name, "");
    }

    #[test]
    fn test_invalid_boot_indicator() {
        let disk = fixtures::mbr_image(8192, &[(2, 0x7F, 0x83, 2048, 1024)]);
        let result = MbrTable::decode(&fixtures::source(disk));

        match result {
            Err(Error::InvalidEntry(msg)) => {
                assert!(msg.starts_with("slot 2:"));
                assert!(msg.contains("0x7F"));
            }
            other => panic!("expected invalid entry, got {:?}", other),
        }
    }

    #[test]
    fn test_boot_indicator_ignored_on_empty_slot() {
        let disk = fixtures::mbr_image(8192, &[(0, 0x00, 0x83, 2048, 1024), (1, 0x12, 0x00, 0, 0)]);
        assert!(MbrTable::decode(&fixtures::source(disk)).is_ok());
    }

    #[test]
    fn test_partition_at_lba_zero() {
        let disk = fixtures::mbr_image(8192, &[(0, 0x00, 0x83, 0, 1024)]);
        let result = MbrTable::decode(&fixtures::source(disk));
        assert!(matches!(result, Err(Error::InvalidEntry(_))));
    }

    #[test]
    fn test_missing_boot_signature() {
        let mut disk = fixtures::mbr_image(8192, &[(0, 0x80, 0x83, 2048, 1024)]);
        disk[511] = 0x00;

        let result = MbrTable::decode(&fixtures::source(disk));
        assert!(matches!(result, Err(Error::UnrecognizedFormat(_))));
    }

    #[test]
    fn test_image_smaller_than_boot_sector() {
        let result = MbrTable::decode(&fixtures::source(vec![0u8; 300]));
        assert!(matches!(result, Err(Error::UnrecognizedFormat(_))));
    }

    #[test]
    fn test_mbr_disk_detail() {
        let disk = fixtures::mbr_image(8192, &[(0, 0x80, 0x83, 2048, 1024)]);
        let table = MbrTable::decode(&fixtures::source(disk)).unwrap();

        assert_eq!(
            table.detail(),
            TableDetail::Mbr(MbrDiskDetail {
                disk_signature: 0x78563412
            })
        );
    }
}
