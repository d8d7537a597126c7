//! Error types for configuration and generation

use procmap_automata::RuleError;
use procmap_core::{KernelError, VocabularyError};
use procmap_rooms::PartitionError;
use thiserror::Error;

/// Errors that can occur when loading, parsing or resolving a [`MapConfig`](crate::MapConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported config format '{0}', expected .json or .toml")]
    UnsupportedFormat(String),

    #[error("invalid tile vocabulary: {0}")]
    Vocabulary(#[from] VocabularyError),
    #[error("invalid room partition: {0}")]
    Partition(#[from] PartitionError),
    #[error("kernel '{name}': {source}")]
    Kernel {
        name: String,
        #[source]
        source: KernelError,
    },
    #[error("{context}: {source}")]
    Outcomes {
        context: String,
        #[source]
        source: RuleError,
    },

    #[error("map must be at least 3x3, got {width}x{height}")]
    MapTooSmall { width: u32, height: u32 },
    #[error("unknown tile '{name}' referenced by {context}")]
    UnknownTile { name: String, context: String },
    #[error("unknown kernel '{name}' referenced by {context}")]
    UnknownKernel { name: String, context: String },
    #[error("blocking and dig tiles must differ, both are '{0}'")]
    BlockingIsDig(String),
    #[error("stage {stage}: room index {index} is out of range, the map has {rooms} room(s)")]
    RoomIndex {
        stage: usize,
        index: usize,
        rooms: usize,
    },
    #[error("{context}: {message}")]
    InvalidRule { context: String, message: String },
}

/// Errors that can occur while running a [`Generator`](crate::Generator)
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("room partition failed: {0}")]
    Partition(#[from] PartitionError),
}
