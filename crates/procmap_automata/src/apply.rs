//! The rule engine: evaluates rules and applies weighted outcomes to a [`Grid`].
//!
//! [`simulate`] and [`stamp`] are the region-level entry points. The other
//! functions are public so that callers can drive single cells.

use procmap_core::{Grid, Kernel, Point, Rect, RunState, TileId};
use rand::Rng;
use tracing::trace;

use crate::{Combinator, OutcomeSet, Rule};

// ─── Region passes ───────────────────────────────────────────────────────────

/// Run one synchronous simulation pass of `rules` over `rect`.
///
/// Every rule is evaluated against a snapshot taken before the pass, so no
/// cell sees a write made earlier in the same pass. Outcomes land in a second
/// buffer that replaces `rect` once the whole region has been visited. When
/// several rules fire on one cell, the last write wins.
///
/// Returns the number of cells whose tile changed.
pub fn simulate(
    grid: &mut Grid,
    rect: Rect,
    rules: &[Rule],
    state: &mut RunState,
    rng: &mut impl Rng,
) -> usize {
    let rect = grid.clip(&rect);
    if rect.is_empty() || rules.is_empty() {
        return 0;
    }

    let snapshot = grid.clone();
    let mut next = grid.clone();

    for p in rect.points() {
        for rule in rules {
            if evaluate(&snapshot, p.x, p.y, rule) {
                apply_outcomes(&mut next, p.x, p.y, &rule.outcomes, state, rng);
            }
        }
    }

    let changed = rect
        .points()
        .filter(|p| snapshot.get(p.x, p.y) != next.get(p.x, p.y))
        .count();
    grid.copy_rect_from(&next, &rect);

    trace!(%rect, changed, "simulation pass");
    changed
}

/// Fill every cell of `rect` in place from `outcomes`, without checking any condition.
///
/// Returns the number of cells written.
pub fn stamp(
    grid: &mut Grid,
    rect: Rect,
    outcomes: &OutcomeSet,
    state: &mut RunState,
    rng: &mut impl Rng,
) -> usize {
    let rect = grid.clip(&rect);
    let mut written = 0;
    for p in rect.points() {
        if apply_outcomes(grid, p.x, p.y, outcomes, state, rng) {
            written += 1;
        }
    }
    trace!(%rect, written, "stamped region");
    written
}

// ─── Single cell ─────────────────────────────────────────────────────────────

/// Return `true` if `rule` fires at `(x, y)`. Never mutates the grid.
pub fn evaluate(grid: &Grid, x: u32, y: u32, rule: &Rule) -> bool {
    if grid.get(x, y) != Some(rule.trigger) {
        return false;
    }

    let center = Point::new(x, y);
    let mut results = rule
        .conditions
        .iter()
        .map(|c| c.holds(neighbour_count(grid, center, &rule.kernel, c.tile)));

    match rule.combinator {
        Combinator::And => results.all(|held| held),
        Combinator::Or => results.any(|held| held),
    }
}

/// Count the cells marked by `kernel` around `center` that hold `tile`.
///
/// Offsets that leave the grid contribute nothing; they never wrap.
pub fn neighbour_count(grid: &Grid, center: Point, kernel: &Kernel, tile: TileId) -> u32 {
    kernel
        .offsets()
        .filter_map(|(dx, dy)| grid.offset(center, dx, dy))
        .filter(|p| grid.get(p.x, p.y) == Some(tile))
        .count() as u32
}

/// Pick one outcome and write it at `(x, y)`.
///
/// One uniform value `r ∈ [0, 1)` is drawn and the first outcome whose
/// cumulative weight exceeds `r` is chosen. If that tile has reached its cap
/// the cell is left unchanged; later outcomes are not tried instead.
///
/// Returns `true` if the cell was written.
pub fn apply_outcomes(
    grid: &mut Grid,
    x: u32,
    y: u32,
    outcomes: &OutcomeSet,
    state: &mut RunState,
    rng: &mut impl Rng,
) -> bool {
    let Some(index) = select_outcome(outcomes, rng) else {
        return false;
    };
    let Some(outcome) = outcomes.get(index) else {
        return false;
    };

    if state.is_exhausted(outcome.tile) {
        return false;
    }
    state.write(grid, x, y, outcome.tile)
}

/// Weighted selection over a normalized outcome set.
///
/// If rounding leaves the cumulative weight below the drawn value, the last
/// outcome with a positive weight is chosen. `None` only for an empty set.
pub fn select_outcome(outcomes: &OutcomeSet, rng: &mut impl Rng) -> Option<usize> {
    let pick: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (index, outcome) in outcomes.iter().enumerate() {
        cumulative += outcome.weight;
        if pick < cumulative {
            return Some(index);
        }
    }
    (0..outcomes.len())
        .rev()
        .find(|&i| outcomes.get(i).is_some_and(|o| o.weight > 0.0))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
