//! MBR boot sector layout and partition types

use std::fmt;

/// MBR partition type codes
///
/// These are the standard partition type identifiers used in the MBR partition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbrPartitionType {
    /// Empty/unused partition entry
    Empty,
    /// FAT12, CHS
    Fat12,
    /// FAT16 < 32MB, CHS
    Fat16Small,
    /// Extended partition, CHS
    Extended,
    /// FAT16 >= 32MB, CHS
    Fat16,
    /// NTFS/exFAT/HPFS
    Ntfs,
    /// FAT32, CHS
    Fat32Chs,
    /// FAT32, LBA
    Fat32Lba,
    /// FAT16, LBA
    Fat16Lba,
    /// Extended partition, LBA
    ExtendedLba,
    /// Linux swap
    LinuxSwap,
    /// Linux native (ext2/ext3/ext4)
    LinuxNative,
    /// Linux LVM physical volume
    LinuxLvm,
    /// FreeBSD slice
    FreeBsd,
    /// Linux RAID autodetect
    LinuxRaid,
    /// GPT protective MBR
    GptProtective,
    /// EFI system partition
    EfiSystem,
    /// Unknown partition type
    Unknown(u8),
}

impl MbrPartitionType {
    /// Create a partition type from a byte value
    pub fn from_byte(b: u8) -> Self {
        match b {
            0x00 => Self::Empty,
            0x01 => Self::Fat12,
            0x04 => Self::Fat16Small,
            0x05 => Self::Extended,
            0x06 => Self::Fat16,
            0x07 => Self::Ntfs,
            0x0B => Self::Fat32Chs,
            0x0C => Self::Fat32Lba,
            0x0E => Self::Fat16Lba,
            0x0F => Self::ExtendedLba,
            0x82 => Self::LinuxSwap,
            0x83 => Self::LinuxNative,
            0x8E => Self::LinuxLvm,
            0xA5 => Self::FreeBsd,
            0xFD => Self::LinuxRaid,
            0xEE => Self::GptProtective,
            0xEF => Self::EfiSystem,
            _ => Self::Unknown(b),
        }
    }

    /// Get the byte value of this partition type
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Empty => 0x00,
            Self::Fat12 => 0x01,
            Self::Fat16Small => 0x04,
            Self::Extended => 0x05,
            Self::Fat16 => 0x06,
            Self::Ntfs => 0x07,
            Self::Fat32Chs => 0x0B,
            Self::Fat32Lba => 0x0C,
            Self::Fat16Lba => 0x0E,
            Self::ExtendedLba => 0x0F,
            Self::LinuxSwap => 0x82,
            Self::LinuxNative => 0x83,
            Self::LinuxLvm => 0x8E,
            Self::FreeBsd => 0xA5,
            Self::LinuxRaid => 0xFD,
            Self::GptProtective => 0xEE,
            Self::EfiSystem => 0xEF,
            Self::Unknown(b) => b,
        }
    }

    /// Short name of this partition type, empty if not well known
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Fat12 => "fat12",
            Self::Fat16Small => "fat16_small",
            Self::Extended => "extended",
            Self::Fat16 => "fat16",
            Self::Ntfs => "ntfs",
            Self::Fat32Chs => "fat32_chs",
            Self::Fat32Lba => "fat32_lba",
            Self::Fat16Lba => "fat16_lba",
            Self::ExtendedLba => "extended_lba",
            Self::LinuxSwap => "linux_swap",
            Self::LinuxNative => "linux",
            Self::LinuxLvm => "linux_lvm",
            Self::FreeBsd => "freebsd",
            Self::LinuxRaid => "linux_raid",
            Self::GptProtective => "gpt_protective",
            Self::EfiSystem => "efi",
            Self::Unknown(_) => "",
        }
    }
}

impl fmt::Display for MbrPartitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(b) => write!(f, "unknown (0x{:02X})", b),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// One 16-byte partition record of the boot sector
///
/// CHS addresses are not decoded; only the LBA fields locate a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbrPartitionRecord {
    /// Boot indicator (0x80 active, 0x00 inactive)
    pub status: u8,
    /// Partition type
    pub partition_type: MbrPartitionType,
    /// First sector (LBA)
    pub lba_start: u32,
    /// Number of sectors
    pub lba_length: u32,
}

impl MbrPartitionRecord {
    /// Size of one record
    pub const SIZE: usize = 16;

    /// Boot indicator of an active partition
    pub const STATUS_ACTIVE: u8 = 0x80;

    /// Boot indicator of an inactive partition
    pub const STATUS_INACTIVE: u8 = 0x00;

    /// Parse a record from 16 bytes
    pub fn from_bytes(entry: &[u8; 16]) -> Self {
        Self {
            status: entry[0],
            partition_type: MbrPartitionType::from_byte(entry[4]),
            lba_start: u32::from_le_bytes([entry[8], entry[9], entry[10], entry[11]]),
            lba_length: u32::from_le_bytes([entry[12], entry[13], entry[14], entry[15]]),
        }
    }

    /// Check if this record describes no partition
    pub fn is_empty(&self) -> bool {
        self.partition_type == MbrPartitionType::Empty
    }

    /// Check if the active flag is set
    pub fn is_bootable(&self) -> bool {
        self.status == Self::STATUS_ACTIVE
    }
}

/// The first 512 bytes of a disk, read as an MBR
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0x000   440   Bootstrap code
/// 0x1B8   4     Disk signature
/// 0x1BE   16    Partition entry 1
/// 0x1CE   16    Partition entry 2
/// 0x1DE   16    Partition entry 3
/// 0x1EE   16    Partition entry 4
/// 0x1FE   2     Boot signature (0x55 0xAA)
/// ```
#[derive(Debug, Clone)]
pub struct BootSector {
    /// Disk signature
    pub disk_signature: u32,
    /// Raw boot signature bytes at 0x1FE
    pub boot_signature: [u8; 2],
    /// The four primary partition records
    pub records: [MbrPartitionRecord; 4],
}

impl BootSector {
    /// Size of the MBR in bytes (always 512)
    pub const SIZE: usize = 512;

    /// The boot signature that must be present at offset 0x1FE
    pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];

    /// Offset of the disk signature
    pub const DISK_SIGNATURE_OFFSET: usize = 0x1B8;

    /// Offset of the first partition entry
    pub const PARTITION_TABLE_OFFSET: usize = 0x1BE;

    /// Offset of the boot signature
    pub const BOOT_SIGNATURE_OFFSET: usize = 0x1FE;

    /// Number of partition entries in MBR
    pub const NUM_PARTITIONS: usize = 4;

    /// Parse a boot sector
    ///
    /// Returns `None` if fewer than [`Self::SIZE`] bytes are given. The boot
    /// signature is recorded but not checked.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }

        let sig = Self::DISK_SIGNATURE_OFFSET;
        let disk_signature =
            u32::from_le_bytes([bytes[sig], bytes[sig + 1], bytes[sig + 2], bytes[sig + 3]]);

        let boot = Self::BOOT_SIGNATURE_OFFSET;
        let boot_signature = [bytes[boot], bytes[boot + 1]];

        let records = std::array::from_fn(|i| {
            let offset = Self::PARTITION_TABLE_OFFSET + i * MbrPartitionRecord::SIZE;
            let mut entry = [0u8; MbrPartitionRecord::SIZE];
            entry.copy_from_slice(&bytes[offset..offset + MbrPartitionRecord::SIZE]);
            MbrPartitionRecord::from_bytes(&entry)
        });

        Some(Self {
            disk_signature,
            boot_signature,
            records,
        })
    }

    /// Check for the 0x55AA boot signature
    pub fn has_boot_signature(&self) -> bool {
        self.boot_signature == Self::BOOT_SIGNATURE
    }

    /// Check if any record is a GPT protective partition
    pub fn has_protective_partition(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.partition_type == MbrPartitionType::GptProtective)
    }

    /// Check if any record describes a real partition
    pub fn has_data_partition(&self) -> bool {
        self.records
            .iter()
            .any(|r| !r.is_empty() && r.partition_type != MbrPartitionType::GptProtective)
    }
}
