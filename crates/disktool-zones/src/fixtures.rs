//! In-memory disk images for tests

use disktool_pipeline::MemorySource;

/// Linux filesystem type GUID (0FC63DAF-8483-4772-8E79-3D69D8477DE4), on-disk order
pub const LINUX_FS: [u8; 16] = [
    0xaf, 0x3d, 0xc6, 0x0f, 0x83, 0x84, 0x72, 0x47, 0x8e, 0x79, 0x3d, 0x69, 0xd8, 0x47, 0x7d, 0xe4,
];

/// EFI system partition type GUID (C12A7328-F81F-11D2-BA4B-00A0C93EC93B), on-disk order
pub const EFI_SYSTEM: [u8; 16] = [
    0x28, 0x73, 0x2a, 0xc1, 0x1f, 0xf8, 0xd2, 0x11, 0xba, 0x4b, 0x00, 0xa0, 0xc9, 0x3e, 0xc9, 0x3b,
];

/// Unique partition GUID used by fixtures (04030201-0605-0807-090A-0B0C0D0E0F10)
pub const PARTITION_GUID: [u8; 16] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10,
];

/// Disk GUID used by fixtures
pub const DISK_GUID: [u8; 16] = [
    0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0,
];

/// One GPT partition entry to place in a fixture image
#[derive(Debug, Clone)]
pub struct FixturePartition {
    pub type_guid: [u8; 16],
    pub guid: [u8; 16],
    pub first_lba: u64,
    pub last_lba: u64,
    pub attributes: u64,
    pub name: &'static str,
}

impl FixturePartition {
    pub fn linux(first_lba: u64, last_lba: u64) -> Self {
        Self {
            type_guid: LINUX_FS,
            guid: PARTITION_GUID,
            first_lba,
            last_lba,
            attributes: 0,
            name: "rootfs",
        }
    }

    pub fn with_type(mut self, type_guid: [u8; 16]) -> Self {
        self.type_guid = type_guid;
        self
    }

    pub fn with_attributes(mut self, attributes: u64) -> Self {
        self.attributes = attributes;
        self
    }

    fn write(&self, entry: &mut [u8]) {
        entry[0..16].copy_from_slice(&self.type_guid);
        entry[16..32].copy_from_slice(&self.guid);
        entry[32..40].copy_from_slice(&self.first_lba.to_le_bytes());
        entry[40..48].copy_from_slice(&self.last_lba.to_le_bytes());
        entry[48..56].copy_from_slice(&self.attributes.to_le_bytes());
        for (i, unit) in self.name.encode_utf16().take(36).enumerate() {
            entry[56 + i * 2..58 + i * 2].copy_from_slice(&unit.to_le_bytes());
        }
    }
}

/// Builder for a GPT disk image with a protective MBR and valid checksums
#[derive(Debug, Clone)]
pub struct GptImage {
    pub block_size: usize,
    pub total_blocks: u64,
    pub entries_lba: u64,
    pub entry_count: u32,
    pub entry_size: u32,
    pub partitions: Vec<(usize, FixturePartition)>,
}

impl GptImage {
    pub fn new(block_size: usize, total_blocks: u64) -> Self {
        Self {
            block_size,
            total_blocks,
            entries_lba: 2,
            entry_count: 128,
            entry_size: 128,
            partitions: Vec::new(),
        }
    }

    pub fn with_partition(mut self, slot: usize, partition: FixturePartition) -> Self {
        self.partitions.push((slot, partition));
        self
    }

    pub fn header_offset(&self) -> usize {
        self.block_size
    }

    pub fn entries_offset(&self) -> usize {
        self.entries_lba as usize * self.block_size
    }

    pub fn entries_len(&self) -> usize {
        self.entry_count as usize * self.entry_size as usize
    }

    pub fn build(&self) -> Vec<u8> {
        let mut disk = vec![0u8; self.block_size * self.total_blocks as usize];

        let protective_len = (self.total_blocks - 1).min(u32::MAX as u64) as u32;
        write_mbr_entry(&mut disk, 0, 0x00, 0xEE, 1, protective_len);
        disk[510] = 0x55;
        disk[511] = 0xAA;

        let entries_offset = self.entries_offset();
        for (slot, partition) in &self.partitions {
            let start = entries_offset + slot * self.entry_size as usize;
            partition.write(&mut disk[start..start + self.entry_size as usize]);
        }

        let h = self.header_offset();
        let last_lba = self.total_blocks - 1;
        disk[h..h + 8].copy_from_slice(b"EFI PART");
        disk[h + 8..h + 12].copy_from_slice(&0x0001_0000u32.to_le_bytes());
        disk[h + 12..h + 16].copy_from_slice(&92u32.to_le_bytes());
        disk[h + 24..h + 32].copy_from_slice(&1u64.to_le_bytes());
        disk[h + 32..h + 40].copy_from_slice(&last_lba.to_le_bytes());
        disk[h + 40..h + 48].copy_from_slice(&34u64.to_le_bytes());
        disk[h + 48..h + 56].copy_from_slice(&(last_lba.saturating_sub(33)).to_le_bytes());
        disk[h + 56..h + 72].copy_from_slice(&DISK_GUID);
        disk[h + 72..h + 80].copy_from_slice(&self.entries_lba.to_le_bytes());
        disk[h + 80..h + 84].copy_from_slice(&self.entry_count.to_le_bytes());
        disk[h + 84..h + 88].copy_from_slice(&self.entry_size.to_le_bytes());

        let entries_crc = crc32fast::hash(&disk[entries_offset..entries_offset + self.entries_len()]);
        disk[h + 88..h + 92].copy_from_slice(&entries_crc.to_le_bytes());

        reseal_header(&mut disk, self.block_size);
        disk
    }
}

/// Recompute the header CRC32 of a 92-byte GPT header at LBA 1
pub fn reseal_header(disk: &mut [u8], block_size: usize) {
    let h = block_size;
    disk[h + 16..h + 20].copy_from_slice(&[0; 4]);
    let crc = crc32fast::hash(&disk[h..h + 92]);
    disk[h + 16..h + 20].copy_from_slice(&crc.to_le_bytes());
}

/// Write one 16-byte MBR partition record
pub fn write_mbr_entry(disk: &mut [u8], slot: usize, status: u8, kind: u8, start: u32, len: u32) {
    let offset = 446 + slot * 16;
    disk[offset] = status;
    disk[offset + 4] = kind;
    disk[offset + 8..offset + 12].copy_from_slice(&start.to_le_bytes());
    disk[offset + 12..offset + 16].copy_from_slice(&len.to_le_bytes());
}

/// An MBR disk of `total_blocks` 512-byte blocks with the given records
///
/// Each record is `(slot, status, type, lba_start, lba_length)`.
pub fn mbr_image(total_blocks: usize, records: &[(usize, u8, u8, u32, u32)]) -> Vec<u8> {
    let mut disk = vec![0u8; 512 * total_blocks];
    disk[0x1B8..0x1BC].copy_from_slice(&0x7856_3412u32.to_le_bytes());
    for &(slot, status, kind, start, len) in records {
        write_mbr_entry(&mut disk, slot, status, kind, start, len);
    }
    disk[510] = 0x55;
    disk[511] = 0xAA;
    disk
}

pub fn source(disk: Vec<u8>) -> MemorySource {
    MemorySource::new(disk)
}
