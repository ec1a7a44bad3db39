//! Core types, configuration, and errors for the modq moderation queue
//!
//! This crate provides:
//! - Configuration management (`Config`, environment parsing)
//! - Data models (`Item`, `Status`, `Variant`, `StatusCounts`)
//! - Common error types

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod models;

// Re-export key types for convenience
pub use config::Config;
pub use error::{Error, Result};
pub use models::{Item, ItemId, Status, StatusCounts, Variant, parse_items};
