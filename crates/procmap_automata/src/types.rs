//! Data types for the rule engine.
//!
//! A [`Rule`] is one cellular-automaton transition: a trigger tile, a set of
//! neighbourhood [`Condition`]s combined with a [`Combinator`], and an
//! [`OutcomeSet`] of weighted replacement tiles.

use std::fmt;

use procmap_core::{Kernel, TileId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Errors raised while building rules
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("outcome set is empty")]
    EmptyOutcomes,
    #[error("outcome {index} has invalid weight {weight}")]
    InvalidWeight { index: usize, weight: f64 },
    #[error("outcome weights sum to zero")]
    ZeroTotalWeight,
}

// ─── Conditions ──────────────────────────────────────────────────────────────

/// Comparison between a neighbour count and a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

impl CompareOp {
    pub fn compare(self, count: u32, threshold: i64) -> bool {
        let count = count as i64;
        match self {
            CompareOp::Less => count < threshold,
            CompareOp::Greater => count > threshold,
            CompareOp::LessEqual => count <= threshold,
            CompareOp::GreaterEqual => count >= threshold,
            CompareOp::Equal => count == threshold,
            CompareOp::NotEqual => count != threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Less => "<",
            CompareOp::Greater => ">",
            CompareOp::LessEqual => "<=",
            CompareOp::GreaterEqual => ">=",
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// How the results of a rule's conditions are combined.
///
/// `And` over zero conditions holds; `Or` over zero conditions does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => f.write_str("and"),
            Combinator::Or => f.write_str("or"),
        }
    }
}

/// `count(tile under kernel) <op> threshold`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Condition {
    pub tile: TileId,
    pub op: CompareOp,
    pub threshold: i64,
}

impl Condition {
    pub fn new(tile: TileId, op: CompareOp, threshold: i64) -> Self {
        Self { tile, op, threshold }
    }

    pub fn holds(&self, count: u32) -> bool {
        self.op.compare(count, self.threshold)
    }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// One weighted replacement tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub tile: TileId,
    pub weight: f64,
}

impl Outcome {
    pub fn new(tile: TileId, weight: f64) -> Self {
        Self { tile, weight }
    }
}

/// An ordered set of outcomes whose weights are normalized to sum to 1.
///
/// Order matters: selection walks the outcomes in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeSet {
    outcomes: Vec<Outcome>,
}

impl OutcomeSet {
    pub fn new(outcomes: Vec<Outcome>) -> Result<Self, RuleError> {
        if outcomes.is_empty() {
            return Err(RuleError::EmptyOutcomes);
        }
        for (index, outcome) in outcomes.iter().enumerate() {
            if !outcome.weight.is_finite() || outcome.weight < 0.0 {
                return Err(RuleError::InvalidWeight {
                    index,
                    weight: outcome.weight,
                });
            }
        }

        let total: f64 = outcomes.iter().map(|o| o.weight).sum();
        if total <= 0.0 {
            return Err(RuleError::ZeroTotalWeight);
        }

        let outcomes = outcomes
            .into_iter()
            .map(|o| Outcome::new(o.tile, o.weight / total))
            .collect();
        Ok(Self { outcomes })
    }

    /// A set that always yields `tile`
    pub fn single(tile: TileId) -> Self {
        Self {
            outcomes: vec![Outcome::new(tile, 1.0)],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Outcome> {
        self.outcomes.get(index)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Every tile any outcome can write
    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        self.outcomes.iter().map(|o| o.tile)
    }
}

// ─── Rule ────────────────────────────────────────────────────────────────────

/// A single cellular-automaton transition.
///
/// The rule fires at `(x, y)` when the cell holds `trigger` and the conditions,
/// each counted over `kernel`, satisfy `combinator`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub trigger: TileId,
    pub kernel: Kernel,
    pub combinator: Combinator,
    pub conditions: Vec<Condition>,
    pub outcomes: OutcomeSet,
}

impl Rule {
    /// A rule with no conditions yet (`And` combinator, so it always fires on `trigger`)
    pub fn new(trigger: TileId, kernel: Kernel, outcomes: OutcomeSet) -> Self {
        Self {
            trigger,
            kernel,
            combinator: Combinator::And,
            conditions: Vec::new(),
            outcomes,
        }
    }

    pub fn with_combinator(mut self, combinator: Combinator) -> Self {
        self.combinator = combinator;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Fires when `low < count(check) < high`
    pub fn in_range(
        trigger: TileId,
        kernel: Kernel,
        check: TileId,
        low: i64,
        high: i64,
        outcomes: OutcomeSet,
    ) -> Self {
        Self::new(trigger, kernel, outcomes)
            .with_combinator(Combinator::And)
            .with_condition(Condition::new(check, CompareOp::Greater, low))
            .with_condition(Condition::new(check, CompareOp::Less, high))
    }

    /// Fires when `count(check) < low` or `count(check) > high`
    pub fn out_of_range(
        trigger: TileId,
        kernel: Kernel,
        check: TileId,
        low: i64,
        high: i64,
        outcomes: OutcomeSet,
    ) -> Self {
        Self::new(trigger, kernel, outcomes)
            .with_combinator(Combinator::Or)
            .with_condition(Condition::new(check, CompareOp::Less, low))
            .with_condition(Condition::new(check, CompareOp::Greater, high))
    }

    /// Every tile the rule reads or writes
    pub fn referenced_tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        std::iter::once(self.trigger)
            .chain(self.conditions.iter().map(|c| c.tile))
            .chain(self.outcomes.tiles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_weights_normalize_to_one() {
        let set = OutcomeSet::new(vec![
            Outcome::new(TileId(0), 1.0),
            Outcome::new(TileId(1), 2.0),
            Outcome::new(TileId(2), 0.5),
        ])
        .unwrap();
        let total: f64 = set.iter().map(|o| o.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((set.get(1).unwrap().weight - 2.0 / 3.5).abs() < 1e-12);
    }

    #[test]
    fn outcome_set_rejects_bad_weights() {
        assert_eq!(OutcomeSet::new(Vec::new()), Err(RuleError::EmptyOutcomes));
        assert_eq!(
            OutcomeSet::new(vec![Outcome::new(TileId(0), 0.0)]),
            Err(RuleError::ZeroTotalWeight)
        );
        assert!(matches!(
            OutcomeSet::new(vec![
                Outcome::new(TileId(0), 1.0),
                Outcome::new(TileId(1), -1.0)
            ]),
            Err(RuleError::InvalidWeight { index: 1, .. })
        ));
        assert!(matches!(
            OutcomeSet::new(vec![Outcome::new(TileId(0), f64::NAN)]),
            Err(RuleError::InvalidWeight { index: 0, .. })
        ));
    }

    #[test]
    fn compare_ops() {
        assert!(CompareOp::Less.compare(3, 4));
        assert!(!CompareOp::Less.compare(4, 4));
        assert!(CompareOp::LessEqual.compare(4, 4));
        assert!(CompareOp::Greater.compare(5, 4));
        assert!(CompareOp::GreaterEqual.compare(4, 4));
        assert!(CompareOp::Equal.compare(0, 0));
        assert!(CompareOp::NotEqual.compare(1, 0));
        assert!(!CompareOp::Less.compare(0, 0));
        assert!(CompareOp::Greater.compare(0, -1));
    }

    #[test]
    fn compare_op_serde_symbols() {
        let op: CompareOp = serde_json::from_str("\">=\"").unwrap();
        assert_eq!(op, CompareOp::GreaterEqual);
        let c: Combinator = serde_json::from_str("\"or\"").unwrap();
        assert_eq!(c, Combinator::Or);
    }

    #[test]
    fn range_constructors_build_conditions() {
        let rule = Rule::out_of_range(
            TileId(1),
            Kernel::all(),
            TileId(0),
            0,
            5,
            OutcomeSet::single(TileId(0)),
        );
        assert_eq!(rule.combinator, Combinator::Or);
        assert_eq!(rule.conditions.len(), 2);
        assert_eq!(rule.conditions[0].op, CompareOp::Less);
        assert_eq!(rule.conditions[1].threshold, 5);

        let tiles: Vec<_> = rule.referenced_tiles().collect();
        assert_eq!(tiles, vec![TileId(1), TileId(0), TileId(0), TileId(0)]);
    }
}
