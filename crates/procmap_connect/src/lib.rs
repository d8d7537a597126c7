//! Connectivity analysis and repair for procmap.
//!
//! [`label`] groups the open (non-blocking) cells of a region into connected
//! components under a [`Kernel`](procmap_core::Kernel). [`repair`] then either
//! deletes every component but the largest, or carves corridors until a single
//! component remains, as chosen by an [`UnconnectedPolicy`].

mod label;
mod repair;
mod types;

pub use label::{label, largest_component};
pub use repair::{carve_corridor, corridor_path, repair};
pub use types::{RepairMode, RepairReport, RepairTiles, UnconnectedPolicy};
