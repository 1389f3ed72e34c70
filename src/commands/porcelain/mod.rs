//! Porcelain commands (user-facing staging operations)
//!
//! ## Commands
//!
//! - `init`: Create the metadata directory, an empty index and the default ignore file
//! - `add`: Stage files
//! - `rm` / `unstage`: Drop or unstage index entries
//! - `status`: Show working tree status

pub mod add;
pub mod init;
pub mod rm;
pub mod status;
