//! The generation pipeline.
//!
//! A [`Generator`] runs a fixed sequence: fill the map with the blocking
//! tile, partition it into rooms, seed the rooms with the initial fill, then
//! run every [`GenerationStage`] in order. Each stage simulates its rules over
//! its regions and optionally repairs their connectivity.

use std::fmt;

use procmap_automata::{simulate, stamp, Combinator, OutcomeSet, Rule};
use procmap_connect::{repair, RepairTiles, UnconnectedPolicy};
use procmap_core::{Grid, Rect, RunState, TileId, TileVocabulary};
use procmap_rooms::{partition, PartitionConfig};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::GenerateError;

// ─── Stages ──────────────────────────────────────────────────────────────────

/// The regions a stage operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The whole map, or the given rectangle clipped to it
    WholeMap(Option<Rect>),
    /// All rooms in shuffled order, or the rooms at these post-shuffle indices
    EachRoom(Option<Vec<usize>>),
}

impl Scope {
    /// Rectangles this scope covers for one run
    pub fn regions(&self, grid: &Grid, rooms: &[Rect]) -> Vec<Rect> {
        match self {
            Scope::WholeMap(None) => vec![grid.bounds()],
            Scope::WholeMap(Some(rect)) => vec![grid.clip(rect)],
            Scope::EachRoom(None) => rooms.to_vec(),
            Scope::EachRoom(Some(indices)) => indices
                .iter()
                .filter_map(|&index| rooms.get(index).copied())
                .collect(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::WholeMap(None) => f.write_str("whole map"),
            Scope::WholeMap(Some(rect)) => write!(f, "map region {}", rect),
            Scope::EachRoom(None) => f.write_str("each room"),
            Scope::EachRoom(Some(indices)) => write!(f, "rooms {:?}", indices),
        }
    }
}

/// One step of the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStage {
    /// Synchronous passes run over each region
    pub simulation_count: u32,
    pub scope: Scope,
    pub rules: Vec<Rule>,
    /// Repair run over each region after all passes; `None` for smoothing stages
    pub unconnected: Option<UnconnectedPolicy>,
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// A finished map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedMap {
    pub width: u32,
    pub height: u32,
    /// `height` rows of `width` tile names
    pub rows: Vec<Vec<String>>,
    /// Room rectangles in the order stages saw them
    pub rooms: Vec<Rect>,
    #[serde(skip)]
    pub grid: Grid,
}

impl GeneratedMap {
    pub fn tile_at(&self, x: u32, y: u32) -> Option<&str> {
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .map(String::as_str)
    }

    /// Number of cells holding the tile called `name`
    pub fn count(&self, name: &str) -> usize {
        let name = name.trim().to_lowercase();
        self.rows.iter().flatten().filter(|t| **t == name).count()
    }
}

// ─── Generator ───────────────────────────────────────────────────────────────

/// A validated, ready-to-run generator.
///
/// Built by [`MapConfig::resolve`](crate::MapConfig::resolve). Immutable, so
/// one generator can serve any number of runs, each with its own RNG.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub(crate) vocabulary: TileVocabulary,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) blocking: TileId,
    pub(crate) dig: TileId,
    pub(crate) rooms: PartitionConfig,
    pub(crate) initial_fill: OutcomeSet,
    pub(crate) stages: Vec<GenerationStage>,
}

impl Generator {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn blocking(&self) -> TileId {
        self.blocking
    }

    pub fn dig(&self) -> TileId {
        self.dig
    }

    pub fn vocabulary(&self) -> &TileVocabulary {
        &self.vocabulary
    }

    pub fn rooms(&self) -> &PartitionConfig {
        &self.rooms
    }

    pub fn stages(&self) -> &[GenerationStage] {
        &self.stages
    }

    /// Generate a map with a fresh [`SmallRng`] seeded from `seed`
    pub fn generate_seeded(&self, seed: u64) -> Result<GeneratedMap, GenerateError> {
        self.generate(&mut SmallRng::seed_from_u64(seed))
    }

    /// Run the whole pipeline once.
    ///
    /// The same generator and the same RNG state always produce the same map.
    pub fn generate(&self, rng: &mut impl Rng) -> Result<GeneratedMap, GenerateError> {
        let mut grid = Grid::new(self.width, self.height, self.blocking);
        let mut state = RunState::new(&self.vocabulary, &grid);
        debug!(width = self.width, height = self.height, "initialized grid");

        let mut rooms = partition(self.width, self.height, &self.rooms, rng)?;
        rooms.shuffle(rng);

        let mut seeded = 0;
        for room in &rooms {
            seeded += stamp(&mut grid, *room, &self.initial_fill, &mut state, rng);
        }
        debug!(rooms = rooms.len(), seeded, "seeded rooms");

        let tiles = RepairTiles {
            blocking: self.blocking,
            dig: self.dig,
        };

        for (index, stage) in self.stages.iter().enumerate() {
            let regions = stage.scope.regions(&grid, &rooms);

            let mut changed = 0;
            for region in &regions {
                for _ in 0..stage.simulation_count {
                    changed += simulate(&mut grid, *region, &stage.rules, &mut state, rng);
                }
            }

            let (mut corridors, mut removed) = (0, 0);
            if let Some(policy) = &stage.unconnected {
                for region in &regions {
                    let report = repair(&mut grid, *region, policy, tiles, &mut state, rng);
                    corridors += report.corridors;
                    removed += report.removed_cells;
                }
            }

            debug!(
                stage = index,
                regions = regions.len(),
                changed,
                corridors,
                removed,
                "finished stage"
            );
        }

        Ok(self.project(grid, rooms))
    }

    fn project(&self, grid: Grid, rooms: Vec<Rect>) -> GeneratedMap {
        let rows = grid
            .rows()
            .map(|row| row.iter().map(|&tile| self.tile_name(tile).to_string()).collect())
            .collect();
        GeneratedMap {
            width: self.width,
            height: self.height,
            rows,
            rooms,
            grid,
        }
    }

    fn tile_name(&self, tile: TileId) -> &str {
        self.vocabulary.name(tile).unwrap_or("?")
    }

    fn write_outcomes(&self, f: &mut fmt::Formatter<'_>, outcomes: &OutcomeSet) -> fmt::Result {
        for (i, outcome) in outcomes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {:.3}", self.tile_name(outcome.tile), outcome.weight)?;
        }
        Ok(())
    }

    fn write_rule(&self, f: &mut fmt::Formatter<'_>, rule: &Rule) -> fmt::Result {
        write!(f, "{} [{}] ", self.tile_name(rule.trigger), rule.kernel)?;
        if rule.conditions.is_empty() {
            f.write_str(match rule.combinator {
                Combinator::And => "always",
                Combinator::Or => "never",
            })?;
        }
        for (i, condition) in rule.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", rule.combinator)?;
            }
            write!(
                f,
                "{} {} {}",
                self.tile_name(condition.tile),
                condition.op,
                condition.threshold
            )?;
        }
        f.write_str(" -> ")?;
        self.write_outcomes(f, &rule.outcomes)
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "map: {}x{}", self.width, self.height)?;
        writeln!(f, "rooms: {}", self.rooms)?;
        writeln!(
            f,
            "blocking: {} dig: {}",
            self.tile_name(self.blocking),
            self.tile_name(self.dig)
        )?;

        f.write_str("tiles:")?;
        for (id, name, cap) in self.vocabulary.iter() {
            match cap {
                Some(cap) => write!(f, " {}={}(max {})", id, name, cap)?,
                None => write!(f, " {}={}", id, name)?,
            }
        }
        writeln!(f)?;

        f.write_str("initial fill: ")?;
        self.write_outcomes(f, &self.initial_fill)?;
        writeln!(f)?;

        for (index, stage) in self.stages.iter().enumerate() {
            writeln!(
                f,
                "stage {}: {} pass(es) over {}",
                index, stage.simulation_count, stage.scope
            )?;
            for rule in &stage.rules {
                f.write_str("  rule: ")?;
                self.write_rule(f, rule)?;
                writeln!(f)?;
            }
            if let Some(policy) = &stage.unconnected {
                writeln!(f, "  repair: {}", policy)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        MapConfig, OutcomeDecl, PolicyConfig, RangeCondition, RangeKind, RuleConfig, ScopeConfig,
        StageConfig,
    };
    use procmap_automata::Combinator;
    use procmap_connect::RepairMode;
    use procmap_core::TileDecl;

    fn cave_config() -> MapConfig {
        MapConfig {
            width: 40,
            height: 24,
            tiles: vec![
                TileDecl::new("solid"),
                TileDecl::new("empty"),
                TileDecl::new("gold").with_cap(6),
            ],
            kernels: Default::default(),
            blocking: "solid".into(),
            dig: "empty".into(),
            rooms: PartitionConfig::tree(5, 4, 4),
            initial_fill: vec![
                OutcomeDecl::new("solid", 1.0),
                OutcomeDecl::new("empty", 2.0),
                OutcomeDecl::new("gold", 0.2),
            ],
            stages: vec![StageConfig {
                passes: 2,
                scope: ScopeConfig::EachRoom { rooms: None },
                rules: vec![RuleConfig {
                    trigger: "empty".into(),
                    kernel: "all".into(),
                    combinator: Combinator::And,
                    conditions: Vec::new(),
                    range: Some(RangeCondition {
                        tile: "solid".into(),
                        kind: RangeKind::Out,
                        low: 0,
                        high: 5,
                    }),
                    outcomes: vec![OutcomeDecl::new("solid", 1.0), OutcomeDecl::new("gold", 1.0)],
                }],
                unconnected: Some(PolicyConfig {
                    mode: RepairMode::Connect,
                    kernel: "plus".into(),
                    thickness: 1,
                }),
            }],
        }
    }

    fn rule(trigger: &str, outcome: &str) -> RuleConfig {
        RuleConfig {
            trigger: trigger.into(),
            kernel: "plus".into(),
            combinator: Combinator::And,
            conditions: Vec::new(),
            range: None,
            outcomes: vec![OutcomeDecl::new(outcome, 1.0)],
        }
    }

    #[test]
    fn same_seed_same_map() {
        let generator = cave_config().resolve().unwrap();
        let a = generator.generate_seeded(42).unwrap();
        let b = generator.generate_seeded(42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.rows.len(), 24);
        assert!(a.rows.iter().all(|row| row.len() == 40));
    }

    #[test]
    fn different_seeds_usually_differ() {
        let generator = cave_config().resolve().unwrap();
        let maps: Vec<_> = (0..4).map(|s| generator.generate_seeded(s).unwrap()).collect();
        assert!(maps.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn capped_tile_never_exceeds_cap() {
        let generator = cave_config().resolve().unwrap();
        for seed in 0..8 {
            let map = generator.generate_seeded(seed).unwrap();
            assert!(map.count("gold") <= 6, "seed {} placed {}", seed, map.count("gold"));
        }
    }

    #[test]
    fn rows_match_grid() {
        let generator = cave_config().resolve().unwrap();
        let map = generator.generate_seeded(3).unwrap();
        for (y, row) in map.grid.rows().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                assert_eq!(
                    map.tile_at(x as u32, y as u32),
                    generator.vocabulary().name(*tile)
                );
            }
        }
    }

    #[test]
    fn room_subset_uses_shuffled_indices() {
        let mut config = cave_config();
        config.width = 20;
        config.height = 10;
        config.tiles.push(TileDecl::new("water"));
        config.rooms = PartitionConfig::equal(2, 1, 2);
        config.initial_fill = vec![OutcomeDecl::new("empty", 1.0)];
        config.stages = vec![StageConfig {
            passes: 1,
            scope: ScopeConfig::EachRoom {
                rooms: Some(vec![0]),
            },
            rules: vec![rule("empty", "water")],
            unconnected: None,
        }];

        let generator = config.resolve().unwrap();
        for seed in 0..4 {
            let map = generator.generate_seeded(seed).unwrap();
            for p in map.rooms[0].points() {
                assert_eq!(map.tile_at(p.x, p.y), Some("water"));
            }
            for p in map.rooms[1].points() {
                assert_eq!(map.tile_at(p.x, p.y), Some("empty"));
            }
        }
    }

    #[test]
    fn whole_map_stage_reaches_walls() {
        let mut config = cave_config();
        config.stages = vec![StageConfig {
            passes: 1,
            scope: ScopeConfig::WholeMap { rect: None },
            rules: vec![rule("solid", "empty")],
            unconnected: None,
        }];
        let map = config.resolve().unwrap().generate_seeded(1).unwrap();
        assert_eq!(map.count("solid"), 0);
    }

    #[test]
    fn scope_regions() {
        let grid = Grid::new(10, 10, TileId(0));
        let rooms = [Rect::new(1, 1, 3, 3), Rect::new(5, 5, 3, 3)];

        assert_eq!(Scope::WholeMap(None).regions(&grid, &rooms), vec![grid.bounds()]);
        assert_eq!(
            Scope::WholeMap(Some(Rect::new(8, 8, 5, 5))).regions(&grid, &rooms),
            vec![Rect::new(8, 8, 2, 2)]
        );
        assert_eq!(Scope::EachRoom(None).regions(&grid, &rooms), rooms.to_vec());
        assert_eq!(
            Scope::EachRoom(Some(vec![1])).regions(&grid, &rooms),
            vec![rooms[1]]
        );
    }

    #[test]
    fn display_lists_every_stage() {
        let text = cave_config().resolve().unwrap().to_string();
        assert!(text.starts_with("map: 40x24\n"));
        assert!(text.contains("blocking: solid dig: empty"));
        assert!(text.contains("#2=gold(max 6)"));
        assert!(text.contains("stage 0: 2 pass(es) over each room"));
        assert!(text.contains("rule: empty [111,101,111] solid < 0 or solid > 5 -> solid 0.500, gold 0.500"));
        assert!(text.contains("repair: connect kernel=010,101,010 thickness=1"));
    }

    #[test]
    fn generator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Generator>();
    }
}
