//! Rule-driven procedural tile map generation
//!
//! A map is described by a [`MapConfig`]: a tile vocabulary, named
//! neighbourhood kernels, a room partition, an initial fill and a list of
//! stages. Each stage runs cellular-automaton rules over the whole map or over
//! rooms and can then repair connectivity by deleting stray regions or by
//! carving corridors between them.
//!
//! # Example
//!
//! ```rust,ignore
//! use procmap::load_config;
//!
//! let generator = load_config("cave.toml".as_ref())?.resolve()?;
//! let map = generator.generate_seeded(7)?;
//! for row in &map.rows {
//!     println!("{}", row.join(" "));
//! }
//! ```

mod config;
mod error;
mod pipeline;
mod resolve;

pub use config::*;
pub use error::{ConfigError, GenerateError};
pub use pipeline::{GeneratedMap, GenerationStage, Generator, Scope};
pub use resolve::MIN_MAP_EXTENT;

pub use procmap_automata::{Combinator, CompareOp, Condition, Outcome, OutcomeSet, Rule};
pub use procmap_connect::{label, RepairMode, RepairReport, UnconnectedPolicy};
pub use procmap_core::{Grid, Kernel, Point, Rect, RunState, TileDecl, TileId, TileVocabulary};
pub use procmap_rooms::{PartitionConfig, PartitionMode};

use std::path::Path;

/// Parse a configuration from a JSON string
pub fn parse_json(json: &str) -> Result<MapConfig, ConfigError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a configuration from a TOML string
pub fn parse_toml(src: &str) -> Result<MapConfig, ConfigError> {
    Ok(toml::from_str(src)?)
}

/// Load a configuration file, choosing the format from its extension
pub fn load_config(path: &Path) -> Result<MapConfig, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let content = std::fs::read_to_string(path)?;
    match extension.as_str() {
        "json" => parse_json(&content),
        "toml" => parse_toml(&content),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Load and resolve a configuration file in one step
pub fn load_generator(path: &Path) -> Result<Generator, ConfigError> {
    load_config(path)?.resolve()
}
