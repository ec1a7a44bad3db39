//! Headless driver for the modq moderation queue engine
//!
//! - `script`: the line-oriented operator script format
//! - `replay`: run a script against a seeded engine
//! - `sample`: deterministic demo queues

#![forbid(unsafe_code)]

pub mod replay;
pub mod sample;
pub mod script;

use std::fs;
use std::path::Path;

use modq_core::{Item, Result, parse_items};

pub use replay::replay;
pub use sample::sample_items;
pub use script::{ScriptLine, Step, parse_script};

/// Read a JSON array of items from `path`.
pub fn load_items(path: &Path) -> Result<Vec<Item>> {
    let raw = fs::read_to_string(path)?;
    let items = parse_items(&raw)?;
    tracing::debug!(path = %path.display(), items = items.len(), "loaded items");
    Ok(items)
}

/// Read and parse a script file.
pub fn load_script(path: &Path) -> Result<Vec<ScriptLine>> {
    parse_script(&fs::read_to_string(path)?)
}
