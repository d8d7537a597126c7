//! Room partitioning for procmap.
//!
//! [`partition`] divides a map into disjoint rectangular rooms, either by a
//! uniform grid cut ([`PartitionMode::Equal`]) or by randomized binary space
//! partitioning ([`PartitionMode::Tree`]). Every room keeps a one-tile wall
//! margin on each side, see [`ROOM_MARGIN`].

mod partition;
mod types;

pub use partition::partition;
pub use types::{PartitionConfig, PartitionError, PartitionMode};

/// Tiles of wall left between a room and the edge of the cell it was cut from.
pub const ROOM_MARGIN: u32 = 1;
