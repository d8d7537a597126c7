//! Core data structures for procmap
//!
//! This crate provides the fundamental types shared by every generation stage:
//! - `TileId` / `TileVocabulary` - Interned tile names with optional population caps
//! - `Grid` - A mutable rectangular array of tile ids
//! - `Rect` / `Point` - Regions and coordinates on a grid
//! - `Kernel` - Boolean neighbourhood stencils used by rules and flood fill
//! - `RunState` - Live per-tile counts for one generation run

mod grid;
mod kernel;
mod rect;
mod run_state;
mod tile;

pub use grid::Grid;
pub use kernel::{Kernel, KernelError};
pub use rect::{Point, Rect};
pub use run_state::RunState;
pub use tile::{TileDecl, TileId, TileVocabulary, VocabularyError};
