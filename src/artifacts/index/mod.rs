//! Index file format
//!
//! The index (staging area) records the files selected for the next tree.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "BIDX" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length, big-endian):
//!   - mtime seconds (8), mtime nanoseconds (4), mode (4), size (8)
//!   - object id (20 raw bytes)
//!   - flags (2): staged bit and path length
//!   - path bytes, NUL padded to an 8-byte boundary
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "BIDX";

/// Index file format version
pub const VERSION: u32 = 1;
