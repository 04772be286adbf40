//! # disktool core
//!
//! Core traits, types, and error handling for inspecting partitioned disk images.
//!
//! This crate provides the foundational abstractions shared by the rest of the workspace:
//! - **ByteSource**: read-only random access to a disk image (file or block device)
//! - **PartitionTable**: a decoded GPT or MBR table, exposed as a list of slots
//! - **Data model**: [`DiskDescriptor`], [`TableSlot`] and the normalized [`PartitionEntry`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use disktool_core::{ByteSource, Result};
//!
//! fn describe(source: &dyn ByteSource) -> Result<()> {
//!     println!("Source: {} ({:?})", source.identify(), source.source_kind());
//!     println!("Size:   {} bytes", source.total_size());
//!     let boot_sector = source.read_vec(0, 512)?;
//!     println!("Boot signature: {:02X}{:02X}", boot_sector[510], boot_sector[511]);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod limits;
pub mod source;
pub mod types;

// Re-export commonly used items
pub use error::{Error, Result};
pub use source::{ByteSource, PartitionTable};
pub use types::{
    format_size, DiskDescriptor, GptDiskDetail, GptPartitionDetail, MbrDiskDetail,
    MbrPartitionDetail, PartitionEntry, SlotDetail, SourceKind, TableDetail, TableFormat,
    TableSlot,
};
