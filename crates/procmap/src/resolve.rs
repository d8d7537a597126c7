//! Name resolution and validation: [`MapConfig`] to [`Generator`]

use std::collections::BTreeMap;

use procmap_automata::{Condition, Outcome, OutcomeSet, Rule};
use procmap_connect::{RepairMode, UnconnectedPolicy};
use procmap_core::{Kernel, TileId, TileVocabulary};
use procmap_rooms::{PartitionError, PartitionMode, ROOM_MARGIN};
use tracing::warn;

use crate::config::{
    MapConfig, OutcomeDecl, PolicyConfig, RangeKind, RuleConfig, ScopeConfig, StageConfig,
    ALL_KERNEL, PLUS_KERNEL,
};
use crate::{ConfigError, GenerationStage, Generator, Scope};

/// Smallest map extent that still has an interior
pub const MIN_MAP_EXTENT: u32 = 3;

impl MapConfig {
    /// Intern every name and validate the configuration.
    ///
    /// Suspicious but legal settings are reported with `warn!` and accepted.
    pub fn resolve(&self) -> Result<Generator, ConfigError> {
        if self.width < MIN_MAP_EXTENT || self.height < MIN_MAP_EXTENT {
            return Err(ConfigError::MapTooSmall {
                width: self.width,
                height: self.height,
            });
        }

        let vocabulary = TileVocabulary::new(self.tiles.iter().cloned())?;
        let kernels = resolve_kernels(&self.kernels)?;
        let names = Names {
            vocabulary: &vocabulary,
            kernels: &kernels,
        };

        let blocking = names.tile(&self.blocking, "blocking")?;
        let dig = names.tile(&self.dig, "dig")?;
        if blocking == dig {
            return Err(ConfigError::BlockingIsDig(self.blocking.trim().to_lowercase()));
        }
        for (role, tile) in [("blocking", blocking), ("dig", dig)] {
            if let Some(cap) = vocabulary.cap(tile) {
                let tile = vocabulary.name(tile).unwrap_or("?");
                warn!(role, tile, cap, "cap on a structural tile only limits rule writes");
            }
        }

        self.validate_rooms()?;
        let initial_fill = names.outcomes(&self.initial_fill, "initial fill")?;

        let stages = self
            .stages
            .iter()
            .enumerate()
            .map(|(index, stage)| names.stage(index, stage, self.rooms.target))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Generator {
            vocabulary,
            width: self.width,
            height: self.height,
            blocking,
            dig,
            rooms: self.rooms,
            initial_fill,
            stages,
        })
    }

    fn validate_rooms(&self) -> Result<(), ConfigError> {
        let rooms = &self.rooms;
        if rooms.target == 0 {
            return Err(PartitionError::InvalidParameters(
                "target room count must be at least 1".to_string(),
            )
            .into());
        }

        match rooms.mode {
            PartitionMode::Equal { columns, rows } => {
                if columns == 0 || rows == 0 {
                    return Err(PartitionError::InvalidParameters(format!(
                        "equal mode needs at least one column and row, got {}x{}",
                        columns, rows
                    ))
                    .into());
                }
                let available = columns as usize * rows as usize;
                if rooms.target > available {
                    return Err(PartitionError::Unreachable {
                        requested: rooms.target,
                        available,
                    }
                    .into());
                }
                if self.width / columns <= 2 * ROOM_MARGIN || self.height / rows <= 2 * ROOM_MARGIN
                {
                    warn!(%rooms, width = self.width, height = self.height, "equal cells are too small, rooms will be empty");
                }
            }
            PartitionMode::Tree {
                min_width,
                min_height,
            } => {
                if min_width == 0 || min_height == 0 {
                    warn!(%rooms, "zero minimum room size allows empty rooms");
                }
            }
        }
        Ok(())
    }
}

/// Built-in kernels, overridden or extended by the configured ones.
fn resolve_kernels(
    declared: &BTreeMap<String, Vec<Vec<u8>>>,
) -> Result<BTreeMap<String, Kernel>, ConfigError> {
    let mut kernels = BTreeMap::new();
    kernels.insert(PLUS_KERNEL.to_string(), Kernel::plus());
    kernels.insert(ALL_KERNEL.to_string(), Kernel::all());

    for (name, rows) in declared {
        let kernel = Kernel::from_rows(rows).map_err(|source| ConfigError::Kernel {
            name: name.clone(),
            source,
        })?;
        kernels.insert(normalize(name), kernel);
    }
    Ok(kernels)
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Lookup tables shared by every resolution step
struct Names<'a> {
    vocabulary: &'a TileVocabulary,
    kernels: &'a BTreeMap<String, Kernel>,
}

impl Names<'_> {
    fn tile(&self, name: &str, context: &str) -> Result<TileId, ConfigError> {
        self.vocabulary
            .id(name)
            .ok_or_else(|| ConfigError::UnknownTile {
                name: name.to_string(),
                context: context.to_string(),
            })
    }

    fn kernel(&self, name: &str, context: &str) -> Result<Kernel, ConfigError> {
        self.kernels
            .get(&normalize(name))
            .cloned()
            .ok_or_else(|| ConfigError::UnknownKernel {
                name: name.to_string(),
                context: context.to_string(),
            })
    }

    fn outcomes(&self, decls: &[OutcomeDecl], context: &str) -> Result<OutcomeSet, ConfigError> {
        let outcomes = decls
            .iter()
            .map(|decl| Ok(Outcome::new(self.tile(&decl.tile, context)?, decl.weight)))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        OutcomeSet::new(outcomes).map_err(|source| ConfigError::Outcomes {
            context: context.to_string(),
            source,
        })
    }

    fn stage(
        &self,
        index: usize,
        stage: &StageConfig,
        room_count: usize,
    ) -> Result<GenerationStage, ConfigError> {
        let scope = match &stage.scope {
            ScopeConfig::WholeMap { rect } => Scope::WholeMap(*rect),
            ScopeConfig::EachRoom { rooms } => {
                if let Some(rooms) = rooms {
                    if let Some(&bad) = rooms.iter().find(|&&i| i >= room_count) {
                        return Err(ConfigError::RoomIndex {
                            stage: index,
                            index: bad,
                            rooms: room_count,
                        });
                    }
                }
                Scope::EachRoom(rooms.clone())
            }
        };

        let rules = stage
            .rules
            .iter()
            .enumerate()
            .map(|(rule_index, rule)| {
                self.rule(rule, &format!("stage {} rule {}", index, rule_index))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let unconnected = stage
            .unconnected
            .as_ref()
            .map(|policy| self.policy(policy, &format!("stage {} repair", index)))
            .transpose()?;

        if stage.passes == 0 && unconnected.is_none() {
            warn!(stage = index, "stage has no passes and no repair, it does nothing");
        }

        Ok(GenerationStage {
            simulation_count: stage.passes,
            scope,
            rules,
            unconnected,
        })
    }

    fn rule(&self, rule: &RuleConfig, context: &str) -> Result<Rule, ConfigError> {
        let trigger = self.tile(&rule.trigger, context)?;
        let kernel = self.kernel(&rule.kernel, context)?;
        let outcomes = self.outcomes(&rule.outcomes, context)?;

        match &rule.range {
            Some(_) if !rule.conditions.is_empty() => Err(ConfigError::InvalidRule {
                context: context.to_string(),
                message: "use either `conditions` or `range`, not both".to_string(),
            }),
            Some(range) => {
                let check = self.tile(&range.tile, context)?;
                Ok(match range.kind {
                    RangeKind::In => {
                        Rule::in_range(trigger, kernel, check, range.low, range.high, outcomes)
                    }
                    RangeKind::Out => {
                        Rule::out_of_range(trigger, kernel, check, range.low, range.high, outcomes)
                    }
                })
            }
            None => {
                let mut resolved = Rule::new(trigger, kernel, outcomes).with_combinator(rule.combinator);
                for condition in &rule.conditions {
                    let tile = self.tile(&condition.tile, context)?;
                    resolved =
                        resolved.with_condition(Condition::new(tile, condition.op, condition.threshold));
                }
                Ok(resolved)
            }
        }
    }

    fn policy(&self, policy: &PolicyConfig, context: &str) -> Result<UnconnectedPolicy, ConfigError> {
        let kernel = self.kernel(&policy.kernel, context)?;
        if policy.mode == RepairMode::Connect && !kernel.has_orthogonal_offsets() {
            warn!(
                context,
                kernel = %kernel,
                "connect kernel lacks a vertical or horizontal step; regions may stay disconnected"
            );
        }
        Ok(UnconnectedPolicy {
            mode: policy.mode,
            kernel,
            thickness: policy.thickness,
        })
    }
}
