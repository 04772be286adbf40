//! Normalized partition listing

use disktool_core::{DiskDescriptor, PartitionEntry, TableSlot};

/// Normalize `slots` against the disk's logical block size
///
/// Empty entries (starting at block 0 or without size) are dropped unless
/// `include_empty` is set. Entries keep their slot index either way, so a
/// filtered listing may have gaps.
pub fn list_partitions(
    descriptor: &DiskDescriptor,
    slots: &[TableSlot],
    include_empty: bool,
) -> Vec<PartitionEntry> {
    let entries: Vec<PartitionEntry> = slots
        .iter()
        .map(|slot| PartitionEntry::from_slot(slot, descriptor.logical_block_size))
        .filter(|entry| include_empty || !entry.is_empty())
        .collect();

    tracing::trace!(
        "Listed {} of {} slots (include_empty: {})",
        entries.len(),
        slots.len(),
        include_empty
    );

    entries
}
