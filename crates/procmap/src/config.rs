//! Serializable generator configuration.
//!
//! These records are what a config file deserializes into. Tiles and kernels
//! are referenced by name; [`MapConfig::resolve`](crate::MapConfig::resolve)
//! interns the names and validates everything before a
//! [`Generator`](crate::Generator) can be built.

use std::collections::BTreeMap;

use procmap_automata::{Combinator, CompareOp};
use procmap_connect::RepairMode;
use procmap_core::{Rect, TileDecl};
use procmap_rooms::PartitionConfig;
use serde::{Deserialize, Serialize};

/// Name of the built-in 4-neighbourhood kernel
pub const PLUS_KERNEL: &str = "plus";
/// Name of the built-in 8-neighbourhood kernel
pub const ALL_KERNEL: &str = "all";

/// Root configuration for a generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub width: u32,
    pub height: u32,
    /// Tile declarations in id order
    pub tiles: Vec<TileDecl>,
    /// Named kernels as rows of 0/1. `plus` and `all` are always available
    /// unless redefined here.
    #[serde(default)]
    pub kernels: BTreeMap<String, Vec<Vec<u8>>>,
    /// Tile the map starts as and that counts as impassable
    pub blocking: String,
    /// Tile corridors are carved with
    pub dig: String,
    #[serde(default)]
    pub rooms: PartitionConfig,
    /// Weighted tiles stamped into every room before the first stage
    pub initial_fill: Vec<OutcomeDecl>,
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

/// A tile name with a relative weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDecl {
    pub tile: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl OutcomeDecl {
    pub fn new(tile: impl Into<String>, weight: f64) -> Self {
        Self {
            tile: tile.into(),
            weight,
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// One generation stage: simulation passes followed by optional repair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Number of synchronous simulation passes per region
    #[serde(default = "default_passes")]
    pub passes: u32,
    #[serde(default)]
    pub scope: ScopeConfig,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    /// Connectivity repair run after the passes. Omit for a smoothing stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unconnected: Option<PolicyConfig>,
}

fn default_passes() -> u32 {
    1
}

/// Which regions a stage operates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScopeConfig {
    /// The whole map, or a sub-rectangle of it
    WholeMap {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rect: Option<Rect>,
    },
    /// Every room, or the rooms at the given indices
    EachRoom {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rooms: Option<Vec<usize>>,
    },
}

impl Default for ScopeConfig {
    fn default() -> Self {
        ScopeConfig::EachRoom { rooms: None }
    }
}

/// A cellular-automaton rule, by name.
///
/// Either `conditions` (combined with `combinator`) or a single `range` may be
/// given, not both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub trigger: String,
    #[serde(default = "default_kernel")]
    pub kernel: String,
    #[serde(default)]
    pub combinator: Combinator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeCondition>,
    pub outcomes: Vec<OutcomeDecl>,
}

fn default_kernel() -> String {
    ALL_KERNEL.to_string()
}

/// `count(tile) <op> threshold`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionConfig {
    pub tile: String,
    pub op: CompareOp,
    pub threshold: i64,
}

/// Shorthand for a two-sided bound on one neighbour count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeCondition {
    pub tile: String,
    pub kind: RangeKind,
    pub low: i64,
    pub high: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKind {
    /// `low < count < high`
    In,
    /// `count < low || count > high`
    Out,
}

/// Connectivity repair settings, by kernel name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub mode: RepairMode,
    #[serde(default = "default_policy_kernel")]
    pub kernel: String,
    #[serde(default = "default_thickness")]
    pub thickness: u32,
}

fn default_policy_kernel() -> String {
    PLUS_KERNEL.to_string()
}

fn default_thickness() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_json() {
        let json = r#"{
            "width": 15,
            "height": 7,
            "tiles": [{ "name": "solid" }, { "name": "empty" }],
            "blocking": "solid",
            "dig": "empty",
            "initial_fill": [{ "tile": "solid" }, { "tile": "empty", "weight": 2 }]
        }"#;

        let config: MapConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.rooms, PartitionConfig::single_room());
        assert!(config.kernels.is_empty());
        assert!(config.stages.is_empty());
        assert_eq!(config.initial_fill[0].weight, 1.0);
        assert_eq!(config.initial_fill[1].weight, 2.0);
    }

    #[test]
    fn test_parse_stage_toml() {
        let src = r#"
            passes = 3

            [scope]
            kind = "whole_map"
            rect = { x = 1, y = 1, width = 10, height = 5 }

            [[rules]]
            trigger = "empty"
            kernel = "plus"
            range = { tile = "solid", kind = "out", low = 0, high = 5 }
            outcomes = [{ tile = "solid" }]

            [[rules]]
            trigger = "solid"
            combinator = "or"
            conditions = [
                { tile = "empty", op = ">=", threshold = 5 },
                { tile = "water", op = "==", threshold = 0 },
            ]
            outcomes = [{ tile = "empty" }]

            [unconnected]
            mode = "connect"
            thickness = 2
        "#;

        let stage: StageConfig = toml::from_str(src).unwrap();
        assert_eq!(stage.passes, 3);
        assert_eq!(
            stage.scope,
            ScopeConfig::WholeMap {
                rect: Some(Rect::new(1, 1, 10, 5))
            }
        );
        assert_eq!(stage.rules[0].range.as_ref().unwrap().kind, RangeKind::Out);
        assert_eq!(stage.rules[1].kernel, ALL_KERNEL);
        assert_eq!(stage.rules[1].combinator, Combinator::Or);
        assert_eq!(stage.rules[1].conditions[0].op, CompareOp::GreaterEqual);

        let policy = stage.unconnected.unwrap();
        assert_eq!(policy.mode, RepairMode::Connect);
        assert_eq!(policy.kernel, PLUS_KERNEL);
        assert_eq!(policy.thickness, 2);
    }

    #[test]
    fn test_stage_defaults() {
        let stage: StageConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(stage.passes, 1);
        assert_eq!(stage.scope, ScopeConfig::EachRoom { rooms: None });
        assert!(stage.rules.is_empty());
        assert!(stage.unconnected.is_none());
    }

    #[test]
    fn test_room_subset_scope() {
        let scope: ScopeConfig =
            serde_json::from_str(r#"{ "kind": "each_room", "rooms": [0, 2] }"#).unwrap();
        assert_eq!(
            scope,
            ScopeConfig::EachRoom {
                rooms: Some(vec![0, 2])
            }
        );
    }
}
