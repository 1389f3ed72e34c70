//! Command implementations
//!
//! - `plumbing`: Low-level commands for direct object and index access
//! - `porcelain`: User-facing staging workflows
//!
//! Commands are methods on `Repository` that print through its writer.

pub mod plumbing;
pub mod porcelain;
