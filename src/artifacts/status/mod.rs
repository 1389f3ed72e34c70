//! Working tree status
//!
//! Every path is classified into exactly one [`FileStatus`] by comparing its
//! working copy with the index and, optionally, a committed tree.
//!
//! ## Components
//!
//! - `file_status`: The status values and their short codes
//! - `resolver`: The pure classification rules
//! - `inspector`: Gathers the three views for every path in a repository

pub mod file_status;
pub mod inspector;
pub mod resolver;
