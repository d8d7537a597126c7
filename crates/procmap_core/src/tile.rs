//! Tile identifiers and the tile vocabulary

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Dense integer identifier for a tile, assigned by declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl TileId {
    /// Position of this tile in the vocabulary.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single tile declaration: its name and optional population cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDecl {
    pub name: String,
    /// Maximum number of cells that rules may fill with this tile. `None` is unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,
}

impl TileDecl {
    /// Declare an unbounded tile
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_count: None,
        }
    }

    /// Set a population cap for this tile
    pub fn with_cap(mut self, max_count: u32) -> Self {
        self.max_count = Some(max_count);
        self
    }
}

/// Errors that can occur when building a [`TileVocabulary`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    #[error("tile vocabulary is empty")]
    Empty,
    #[error("tile name at position {0} is blank")]
    BlankName(usize),
    #[error("tile '{0}' is declared more than once")]
    Duplicate(String),
}

/// Bidirectional mapping between tile names and [`TileId`]s, plus caps.
///
/// Names are trimmed and lower-cased before interning, so lookups are
/// case-insensitive. The vocabulary is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileVocabulary {
    names: Vec<String>,
    caps: Vec<Option<u32>>,
    index: HashMap<String, TileId>,
}

impl TileVocabulary {
    /// Build a vocabulary; ids follow the order of `decls`.
    pub fn new(decls: impl IntoIterator<Item = TileDecl>) -> Result<Self, VocabularyError> {
        let mut names = Vec::new();
        let mut caps = Vec::new();
        let mut index = HashMap::new();

        for (position, decl) in decls.into_iter().enumerate() {
            let name = normalize(&decl.name);
            if name.is_empty() {
                return Err(VocabularyError::BlankName(position));
            }
            if index.contains_key(&name) {
                return Err(VocabularyError::Duplicate(name));
            }
            index.insert(name.clone(), TileId(position as u32));
            names.push(name);
            caps.push(decl.max_count);
        }

        if names.is_empty() {
            return Err(VocabularyError::Empty);
        }

        Ok(Self { names, caps, index })
    }

    /// Build an unbounded vocabulary from plain names
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, VocabularyError> {
        Self::new(names.iter().map(|n| TileDecl::new(n.as_ref())))
    }

    /// Look up a tile id by name (case-insensitive)
    pub fn id(&self, name: &str) -> Option<TileId> {
        self.index.get(&normalize(name)).copied()
    }

    /// Look up a tile name by id
    pub fn name(&self, id: TileId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// Population cap for a tile, `None` if unbounded or unknown
    pub fn cap(&self, id: TileId) -> Option<u32> {
        self.caps.get(id.index()).copied().flatten()
    }

    pub fn contains(&self, id: TileId) -> bool {
        id.index() < self.names.len()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over `(id, name, cap)` in id order
    pub fn iter(&self) -> impl Iterator<Item = (TileId, &str, Option<u32>)> + '_ {
        self.names
            .iter()
            .zip(self.caps.iter())
            .enumerate()
            .map(|(i, (name, cap))| (TileId(i as u32), name.as_str(), *cap))
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
