//! GPT partition attribute flags

/// Attribute bits with a known meaning, in ascending bit order
///
/// Bits 0-2 are defined by UEFI for every partition type; bits 48-63 are
/// type-specific, listed here for the ChromeOS kernel and Microsoft basic data
/// types.
pub const KNOWN_ATTRIBUTES: &[(u32, &str)] = &[
    (0, "platform_required"),
    (1, "efi_ignore"),
    (2, "bios_bootable"),
    (56, "cros_boot_ok"),
    (60, "ms_basic_read_only"),
    (61, "ms_basic_shadow_copy"),
    (62, "ms_basic_hidden"),
    (63, "ms_basic_no_automount"),
];

/// Names of the known attribute bits set in `attributes`
///
/// Bits without a known meaning are ignored.
pub fn decode_attributes(attributes: u64) -> Vec<String> {
    KNOWN_ATTRIBUTES
        .iter()
        .filter(|(bit, _)| attributes & (1u64 << bit) != 0)
        .map(|(_, name)| name.to_string())
        .collect()
}
