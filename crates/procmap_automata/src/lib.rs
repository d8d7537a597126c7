//! Cellular-automaton rule engine for procmap.
//!
//! A [`Rule`] fires on a cell that holds its trigger tile when its
//! [`Condition`]s, counted over a [`Kernel`](procmap_core::Kernel), are satisfied.
//! A firing rule picks one tile from its [`OutcomeSet`] by weighted random
//! selection. [`simulate`] runs one synchronous pass over a region and
//! [`stamp`] fills a region unconditionally.
//!
//! This crate has no knowledge of tile names; everything operates on
//! [`TileId`](procmap_core::TileId)s from `procmap_core`.

mod apply;
mod types;

pub use apply::{apply_outcomes, evaluate, neighbour_count, select_outcome, simulate, stamp};
pub use types::{Combinator, CompareOp, Condition, Outcome, OutcomeSet, Rule, RuleError};
