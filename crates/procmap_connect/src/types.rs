//! Repair policy types

use procmap_core::{Kernel, TileId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with disconnected open regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairMode {
    /// Carve corridors between regions until one remains
    Connect,
    /// Fill every region except the largest with the blocking tile
    Delete,
}

impl fmt::Display for RepairMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairMode::Connect => f.write_str("connect"),
            RepairMode::Delete => f.write_str("delete"),
        }
    }
}

/// Connectivity repair settings for one generation stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnconnectedPolicy {
    pub mode: RepairMode,
    /// Adjacency used to decide whether two open cells touch
    pub kernel: Kernel,
    /// Corridor width in tiles. Zero behaves like one.
    pub thickness: u32,
}

impl UnconnectedPolicy {
    pub fn connect(kernel: Kernel, thickness: u32) -> Self {
        Self {
            mode: RepairMode::Connect,
            kernel,
            thickness,
        }
    }

    pub fn delete(kernel: Kernel) -> Self {
        Self {
            mode: RepairMode::Delete,
            kernel,
            thickness: 1,
        }
    }
}

impl fmt::Display for UnconnectedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            RepairMode::Connect => write!(
                f,
                "connect kernel={} thickness={}",
                self.kernel, self.thickness
            ),
            RepairMode::Delete => write!(f, "delete kernel={}", self.kernel),
        }
    }
}

/// The impassable tile and the tile corridors are dug with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepairTiles {
    pub blocking: TileId,
    pub dig: TileId,
}

/// Summary of one repair run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepairReport {
    /// Open components found before repairing
    pub components_before: usize,
    /// Cells filled with the blocking tile (delete mode)
    pub removed_cells: usize,
    /// Corridors carved (connect mode)
    pub corridors: usize,
    /// Cells converted to the dig tile (connect mode)
    pub carved_cells: usize,
}
