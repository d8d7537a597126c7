//! Partition configuration and errors

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How the map is divided into rooms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PartitionMode {
    /// Cut the map into `columns × rows` equal cells
    Equal { columns: u32, rows: u32 },
    /// Recursively split the map; `min_width`/`min_height` are the smallest
    /// usable room size the splitter aims for
    Tree { min_width: u32, min_height: u32 },
}

impl fmt::Display for PartitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionMode::Equal { columns, rows } => write!(f, "equal {}x{}", columns, rows),
            PartitionMode::Tree {
                min_width,
                min_height,
            } => write!(f, "tree min {}x{}", min_width, min_height),
        }
    }
}

/// Partition mode plus the number of rooms wanted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    #[serde(flatten)]
    pub mode: PartitionMode,
    /// Number of rooms to produce
    pub target: usize,
}

impl PartitionConfig {
    pub fn equal(columns: u32, rows: u32, target: usize) -> Self {
        Self {
            mode: PartitionMode::Equal { columns, rows },
            target,
        }
    }

    pub fn tree(min_width: u32, min_height: u32, target: usize) -> Self {
        Self {
            mode: PartitionMode::Tree {
                min_width,
                min_height,
            },
            target,
        }
    }

    /// A single room covering the map interior
    pub fn single_room() -> Self {
        Self::equal(1, 1, 1)
    }

    /// Number of rooms Equal mode can produce, `None` for Tree mode
    pub fn capacity(&self) -> Option<usize> {
        match self.mode {
            PartitionMode::Equal { columns, rows } => Some(columns as usize * rows as usize),
            PartitionMode::Tree { .. } => None,
        }
    }
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self::single_room()
    }
}

impl fmt::Display for PartitionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} room(s)", self.mode, self.target)
    }
}

/// Errors that can occur while partitioning
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("invalid partition parameters: {0}")]
    InvalidParameters(String),
    #[error("cannot produce {requested} rooms, at most {available} are possible")]
    Unreachable { requested: usize, available: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_equal_json() {
        let json = r#"{ "mode": "equal", "columns": 2, "rows": 3, "target": 4 }"#;
        let config: PartitionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, PartitionConfig::equal(2, 3, 4));
        assert_eq!(config.capacity(), Some(6));
    }

    #[test]
    fn test_parse_tree_toml() {
        let src = r#"
            mode = "tree"
            min_width = 4
            min_height = 3
            target = 6
        "#;
        let config: PartitionConfig = toml::from_str(src).unwrap();
        assert_eq!(config, PartitionConfig::tree(4, 3, 6));
        assert_eq!(config.capacity(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            PartitionConfig::equal(2, 2, 3).to_string(),
            "equal 2x2 -> 3 room(s)"
        );
    }
}
