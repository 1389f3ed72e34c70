//! Shared configuration and error types
//!
//! - `config`: Repository layout and tunables, with environment overrides
//! - `error`: The `BitError` taxonomy returned by every area

pub mod config;
pub mod error;
