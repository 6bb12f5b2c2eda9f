//! # Tracker Common Library
//!
//! Shared code for the tracker read-side crates:
//! - Error types
//! - Configuration file resolution
//! - Read-only database connections
//! - Timestamp canonicalization

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
