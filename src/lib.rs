//! Staging and object layer of a small Git-like version control tool.
//!
//! - `areas`: on-disk areas of a repository (object database, index, workspace)
//! - `artifacts`: data structures and algorithms living in those areas
//! - `commands`: operations exposed through the `bitstage` binary

pub mod areas;
pub mod artifacts;
pub mod commands;
