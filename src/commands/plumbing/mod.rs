//! Plumbing commands (low-level object and index access)
//!
//! ## Commands
//!
//! - `hash-object`: Compute a blob ID and optionally store it
//! - `cat-file`: Print a stored object
//! - `write-tree`: Store the tree of the staged entries
//! - `ls-files`: List index entries

pub mod cat_file;
pub mod hash_object;
pub mod ls_files;
pub mod write_tree;
