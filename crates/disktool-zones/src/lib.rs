//! # disktool zones
//!
//! Partition table detection and decoding.
//!
//! This crate provides:
//! - **detect**: classify a source as GPT or MBR
//! - **GPT**: GUID Partition Table with header and entry array checksums verified
//! - **MBR**: Master Boot Record (four primary records)
//! - **model**: normalized, format-agnostic partition listings
//!
//! ## Example
//!
//! ```rust,no_run
//! use disktool_pipeline::{open_source, SourceConfig};
//! use disktool_zones::inspect;
//! use std::path::Path;
//!
//! let source = open_source(Path::new("disk.img"), &SourceConfig::default()).unwrap();
//! let inspection = inspect(source.as_ref()).unwrap();
//!
//! println!("Partition table: {}", inspection.table.identify());
//! for entry in inspection.partitions(false) {
//!     println!("  #{} blocks {}..={:?}", entry.index, entry.start_block, entry.end_block);
//! }
//! ```

pub mod detect;
pub mod gpt;
pub mod inspect;
pub mod mbr;
pub mod model;

#[cfg(test)]
mod fixtures;

pub use detect::detect;
pub use gpt::GptTable;
pub use inspect::{decode_table, inspect, Inspection};
pub use mbr::MbrTable;
pub use model::list_partitions;
