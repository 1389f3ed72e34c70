//! Data structures and algorithms
//!
//! - `core`: Configuration and the error taxonomy shared by every area
//! - `database`: Database entry types
//! - `ignore`: Ignore file parsing and glob matching
//! - `index`: Index file format (header, entries, checksum)
//! - `objects`: Object types (blob, tree) and object identifiers
//! - `status`: Working tree status classification

pub mod core;
pub mod database;
pub mod ignore;
pub mod index;
pub mod objects;
pub mod status;
