//! salvia — a small, field-aware full-text search engine for Rust.

pub mod error;

pub use error::{Result, SalviaError};
