//! GPT on-disk structures and well-known partition types

use std::fmt;
use uuid::{uuid, Uuid};

/// A GUID as stored on disk (mixed-endian, as defined by UEFI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GptGuid(pub [u8; 16]);

impl GptGuid {
    /// The all-zero GUID that marks an unused partition entry
    pub const UNUSED: Self = Self([0; 16]);

    /// Interpret the on-disk bytes as a UUID
    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes_le(self.0)
    }

    /// Check if this is the all-zero GUID
    pub fn is_unused(&self) -> bool {
        *self == Self::UNUSED
    }

    /// Short name of this GUID as a partition type, empty if not well known
    pub fn type_name(&self) -> &'static str {
        let uuid = self.to_uuid();
        PARTITION_TYPES
            .iter()
            .find(|(guid, _)| *guid == uuid)
            .map(|(_, name)| *name)
            .unwrap_or("")
    }
}

impl fmt::Display for GptGuid {
    /// Upper-case hyphenated form, e.g. `0FC63DAF-8483-4772-8E79-3D69D8477DE4`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.to_uuid().hyphenated())
    }
}

/// Well-known partition type GUIDs
///
/// Not exhaustive: GUIDs missing from this table resolve to an empty name.
pub const PARTITION_TYPES: &[(Uuid, &str)] = &[
    (uuid!("00000000-0000-0000-0000-000000000000"), "unused"),
    (uuid!("024DEE41-33E7-11D3-9D69-0008C781F39F"), "mbr"),
    (uuid!("C12A7328-F81F-11D2-BA4B-00A0C93EC93B"), "efi"),
    (uuid!("21686148-6449-6E6F-744E-656564454649"), "bios"),
    // Microsoft
    (uuid!("E3C9E316-0B5C-4DB8-817D-F92DF00215AE"), "ms_reserved"),
    (uuid!("EBD0A0A2-B9E5-4433-87C0-68B6B72699C7"), "ms_basic_data"),
    (uuid!("5808C8AA-7E8F-42E0-85D2-E1E90434CFB3"), "ms_ldm_meta"),
    (uuid!("AF9B60A0-1431-4F62-BC68-3311714A69AD"), "ms_ldm_data"),
    (uuid!("DE94BBA4-06D1-4D40-A16A-BFD50179D6AC"), "ms_winrecovery"),
    // Linux
    (uuid!("0FC63DAF-8483-4772-8E79-3D69D8477DE4"), "linux"),
    (uuid!("A19D880F-05FC-4D3B-A006-743F0F84911E"), "linux_raid"),
    (uuid!("44479540-F297-41B2-9AF7-D131D5F0458A"), "linux_root_x86"),
    (uuid!("4F68BCE3-E8CD-4DB1-96E7-FBCAF984B709"), "linux_root_x86_64"),
    (uuid!("69DAD710-2CE4-4E3C-B16C-21A1D49ABED3"), "linux_root_arm32"),
    (uuid!("B921B045-1DF0-41C3-AF44-4C6F280D3FAE"), "linux_root_arm64"),
    (uuid!("0657FD6D-A4AB-43C4-84E5-0933C84B4F4F"), "linux_swap"),
    (uuid!("E6D6D379-F507-44C2-A23C-238F2A3DF928"), "linux_lvm"),
    (uuid!("7FFEC5C9-2D00-49B7-8941-3EA10A5586B7"), "linux_dmcrypt"),
    (uuid!("CA7D7CCB-63ED-4C53-861C-1742536059CC"), "linux_luks"),
    (uuid!("933AC7E1-2EB4-4F13-B844-0E14E2AEF915"), "linux_home"),
    (uuid!("3B8F8425-20E0-4F3B-907F-1A25A76F98E8"), "linux_srv"),
    (uuid!("8DA63339-0007-60C0-C436-083AC8230908"), "linux_reserved"),
    // ChromeOS
    (uuid!("FE3A2A5D-4F32-41A7-B725-ACCC3285A309"), "chromeos_kernel"),
    (uuid!("3CB8E202-3B7E-47DD-8A3C-7FF2A13CFCEC"), "chromeos_root"),
    // Apple
    (uuid!("48465300-0000-11AA-AA11-00306543ECAC"), "apple_hfs"),
    (uuid!("7C3457EF-0000-11AA-AA11-00306543ECAC"), "apple_apfs"),
    // FreeBSD
    (uuid!("83BD6B9D-7F41-11DC-BE0B-001560B84F0F"), "freebsd_boot"),
    (uuid!("516E7CB5-6ECF-11D6-8FF8-00022D09712B"), "freebsd_swap"),
    (uuid!("516E7CB6-6ECF-11D6-8FF8-00022D09712B"), "freebsd_ufs"),
    (uuid!("516E7CBA-6ECF-11D6-8FF8-00022D09712B"), "freebsd_zfs"),
    // VMware
    (uuid!("AA31E02A-400F-11DB-9590-000C2911D1B8"), "vmware"),
    (uuid!("9198EFFC-31C0-11DB-8F78-000C2911D1B8"), "vmware_reserved"),
];

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn le_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

fn guid_at(bytes: &[u8], at: usize) -> GptGuid {
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&bytes[at..at + 16]);
    GptGuid(buf)
}

/// GPT partition entry
///
/// The standard entry is 128 bytes; larger declared entry sizes only add
/// trailing reserved space, so only the first 128 bytes are decoded.
#[derive(Debug, Clone)]
pub struct GptPartitionEntry {
    /// Partition type GUID
    pub partition_type_guid: GptGuid,
    /// Unique partition GUID
    pub unique_partition_guid: GptGuid,
    /// First LBA (inclusive)
    pub first_lba: u64,
    /// Last LBA (inclusive)
    pub last_lba: u64,
    /// Attribute flags
    pub attributes: u64,
    /// Partition name (UTF-16LE, 72 bytes = 36 code units)
    pub name: String,
}

impl GptPartitionEntry {
    /// Size of the decoded part of an entry in bytes
    pub const ENTRY_SIZE: usize = 128;

    /// Parse a partition entry from bytes
    ///
    /// Returns `None` if fewer than [`Self::ENTRY_SIZE`] bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::ENTRY_SIZE {
            return None;
        }

        Some(Self {
            partition_type_guid: guid_at(bytes, 0),
            unique_partition_guid: guid_at(bytes, 16),
            first_lba: le_u64(bytes, 32),
            last_lba: le_u64(bytes, 40),
            attributes: le_u64(bytes, 48),
            name: Self::parse_name(&bytes[56..128]),
        })
    }

    /// Check if this entry is unused
    pub fn is_unused(&self) -> bool {
        self.partition_type_guid.is_unused()
    }

    /// Get the size of this partition in LBA sectors
    pub fn size_lba(&self) -> u64 {
        if self.last_lba >= self.first_lba {
            self.last_lba - self.first_lba + 1
        } else {
            0
        }
    }

    /// Parse UTF-16LE partition name from bytes, stopping at the first null
    fn parse_name(bytes: &[u8]) -> String {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|&unit| unit != 0)
            .collect();

        String::from_utf16_lossy(&units).trim_end().to_string()
    }
}

/// GPT header
///
/// The GPT header contains metadata about the partition table.
#[derive(Debug, Clone)]
pub struct GptHeader {
    /// Header signature ("EFI PART")
    pub signature: [u8; 8],
    /// GPT revision (usually 0x00010000)
    pub revision: u32,
    /// Header size in bytes (usually 92)
    pub header_size: u32,
    /// CRC32 checksum of header
    pub header_crc32: u32,
    /// Reserved (must be zero)
    pub reserved: u32,
    /// Current LBA (location of this header)
    pub current_lba: u64,
    /// Backup LBA (location of backup header)
    pub backup_lba: u64,
    /// First usable LBA for partitions
    pub first_usable_lba: u64,
    /// Last usable LBA for partitions
    pub last_usable_lba: u64,
    /// Disk GUID
    pub disk_guid: GptGuid,
    /// Starting LBA of partition entries
    pub partition_entries_lba: u64,
    /// Number of partition entries
    pub num_partition_entries: u32,
    /// Size of each partition entry
    pub partition_entry_size: u32,
    /// CRC32 of partition entries array
    pub partition_entries_crc32: u32,
}

impl GptHeader {
    /// GPT header signature
    pub const SIGNATURE: &'static [u8; 8] = b"EFI PART";

    /// Size of the fixed header layout
    pub const HEADER_SIZE: usize = 92;

    /// Offset of the header CRC32 field
    const CRC_OFFSET: usize = 16;

    /// Parse the header fields from bytes
    ///
    /// No field is validated here; callers must check the checksum with
    /// [`GptHeader::compute_header_crc32`] before trusting any of them.
    /// Returns `None` if fewer than [`Self::HEADER_SIZE`] bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::HEADER_SIZE {
            return None;
        }

        let mut signature = [0u8; 8];
        signature.copy_from_slice(&bytes[0..8]);

        Some(Self {
            signature,
            revision: le_u32(bytes, 8),
            header_size: le_u32(bytes, 12),
            header_crc32: le_u32(bytes, 16),
            reserved: le_u32(bytes, 20),
            current_lba: le_u64(bytes, 24),
            backup_lba: le_u64(bytes, 32),
            first_usable_lba: le_u64(bytes, 40),
            last_usable_lba: le_u64(bytes, 48),
            disk_guid: guid_at(bytes, 56),
            partition_entries_lba: le_u64(bytes, 72),
            num_partition_entries: le_u32(bytes, 80),
            partition_entry_size: le_u32(bytes, 84),
            partition_entries_crc32: le_u32(bytes, 88),
        })
    }

    /// Check the "EFI PART" signature
    pub fn has_valid_signature(&self) -> bool {
        &self.signature == Self::SIGNATURE
    }

    /// Number of header bytes covered by the header checksum
    ///
    /// This is the declared header size, or the fixed 92-byte layout when the
    /// declared size does not fit between 92 bytes and the block that holds it.
    pub fn checksummed_len(&self, block_len: usize) -> usize {
        let declared = self.header_size as usize;
        if (Self::HEADER_SIZE..=block_len).contains(&declared) {
            declared
        } else {
            Self::HEADER_SIZE
        }
    }

    /// Compute the header CRC32 over `block`, treating the CRC32 field as zero
    pub fn compute_header_crc32(&self, block: &[u8]) -> u32 {
        let len = self.checksummed_len(block.len());
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&block[..Self::CRC_OFFSET]);
        hasher.update(&[0u8; 4]);
        hasher.update(&block[Self::CRC_OFFSET + 4..len]);
        hasher.finalize()
    }

    /// Size in bytes of the whole partition entry array
    pub fn entry_array_len(&self) -> u64 {
        self.num_partition_entries as u64 * self.partition_entry_size as u64
    }

    /// CRC32 of a partition entry array, as stored in the header
    pub fn compute_entries_crc32(entries: &[u8]) -> u32 {
        crc32fast::hash(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX_FS_BYTES: [u8; 16] = [
        0xaf, 0x3d, 0xc6, 0x0f, 0x83, 0x84, 0x72, 0x47, 0x8e, 0x79, 0x3d, 0x69, 0xd8, 0x47, 0x7d,
        0xe4,
    ];

    #[test]
    fn test_guid_display_is_mixed_endian_uppercase() {
        let guid = GptGuid(LINUX_FS_BYTES);
        assert_eq!(guid.to_string(), "0FC63DAF-8483-4772-8E79-3D69D8477DE4");
    }

    #[test]
    fn test_partition_type_names() {
        assert_eq!(GptGuid(LINUX_FS_BYTES).type_name(), "linux");
        assert_eq!(GptGuid::UNUSED.type_name(), "unused");

        let efi = GptGuid(uuid!("C12A7328-F81F-11D2-BA4B-00A0C93EC93B").to_bytes_le());
        assert_eq!(efi.type_name(), "efi");
    }

    #[test]
    fn test_unknown_partition_type_has_empty_name() {
        let unknown = GptGuid([0x42; 16]);
        assert_eq!(unknown.type_name(), "");
    }

    #[test]
    fn test_partition_entry_is_unused() {
        let mut entry_bytes = vec![0u8; GptPartitionEntry::ENTRY_SIZE];
        let entry = GptPartitionEntry::from_bytes(&entry_bytes).unwrap();
        assert!(entry.is_unused());

        entry_bytes[0] = 0x01;
        let entry = GptPartitionEntry::from_bytes(&entry_bytes).unwrap();
        assert!(!entry.is_unused());
    }

    #[test]
    fn test_partition_entry_too_short() {
        assert!(GptPartitionEntry::from_bytes(&[0u8; 64]).is_none());
    }

    #[test]
    fn test_partition_entry_fields() {
        let mut entry_bytes = vec![0u8; GptPartitionEntry::ENTRY_SIZE];
        entry_bytes[0..16].copy_from_slice(&LINUX_FS_BYTES);
        entry_bytes[32..40].copy_from_slice(&100u64.to_le_bytes());
        entry_bytes[40..48].copy_from_slice(&199u64.to_le_bytes());
        entry_bytes[48..56].copy_from_slice(&(1u64 << 2).to_le_bytes());
        for (i, unit) in "rootfs".encode_utf16().enumerate() {
            entry_bytes[56 + i * 2..58 + i * 2].copy_from_slice(&unit.to_le_bytes());
        }

        let entry = GptPartitionEntry::from_bytes(&entry_bytes).unwrap();
        assert_eq!(entry.first_lba, 100);
        assert_eq!(entry.last_lba, 199);
        assert_eq!(entry.size_lba(), 100);
        assert_eq!(entry.attributes, 4);
        assert_eq!(entry.name, "rootfs");
    }

    #[test]
    fn test_partition_name_uses_all_36_units() {
        let mut entry_bytes = vec![0u8; GptPartitionEntry::ENTRY_SIZE];
        let long_name: String = "A".repeat(36);
        for (i, unit) in long_name.encode_utf16().enumerate() {
            entry_bytes[56 + i * 2..58 + i * 2].copy_from_slice(&unit.to_le_bytes());
        }

        let entry = GptPartitionEntry::from_bytes(&entry_bytes).unwrap();
        assert_eq!(entry.name, long_name);
    }

    #[test]
    fn test_header_signature() {
        let mut header_bytes = vec![0u8; GptHeader::HEADER_SIZE];
        let header = GptHeader::from_bytes(&header_bytes).unwrap();
        assert!(!header.has_valid_signature());

        header_bytes[0..8].copy_from_slice(b"EFI PART");
        let header = GptHeader::from_bytes(&header_bytes).unwrap();
        assert!(header.has_valid_signature());

        assert!(GptHeader::from_bytes(&header_bytes[..91]).is_none());
    }

    #[test]
    fn test_header_crc_ignores_stored_crc_field() {
        let mut block = vec![0u8; 512];
        block[0..8].copy_from_slice(b"EFI PART");
        block[12..16].copy_from_slice(&92u32.to_le_bytes());

        let header = GptHeader::from_bytes(&block).unwrap();
        let crc = header.compute_header_crc32(&block);

        block[16..20].copy_from_slice(&crc.to_le_bytes());
        let header = GptHeader::from_bytes(&block).unwrap();
        assert_eq!(header.compute_header_crc32(&block), crc);
        assert_eq!(header.header_crc32, crc);
    }

    #[test]
    fn test_checksummed_len_clamps_declared_size() {
        let mut block = vec![0u8; 512];
        block[12..16].copy_from_slice(&92u32.to_le_bytes());
        assert_eq!(GptHeader::from_bytes(&block).unwrap().checksummed_len(512), 92);

        block[12..16].copy_from_slice(&512u32.to_le_bytes());
        assert_eq!(GptHeader::from_bytes(&block).unwrap().checksummed_len(512), 512);

        block[12..16].copy_from_slice(&600u32.to_le_bytes());
        assert_eq!(GptHeader::from_bytes(&block).unwrap().checksummed_len(512), 92);

        block[12..16].copy_from_slice(&20u32.to_le_bytes());
        assert_eq!(GptHeader::from_bytes(&block).unwrap().checksummed_len(512), 92);
    }
}
