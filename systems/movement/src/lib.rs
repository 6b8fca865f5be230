#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Field-descending movement resolver.
//!
//! Units never plan paths; each one reads the potential field of its
//! role and steps toward the highest-scoring legal neighbor, or stays
//! put when its current tile already scores best. All battlefield
//! coordination lives in the fields, so the resolver itself stays a
//! handful of comparisons per unit.

use gravwell_core::{Direction, TileCoord, UnitSnapshot};
use gravwell_fields::PotentialField;
use gravwell_world::{GridIndex, OccupancyGrid};

/// Picks the step a mobile unit should take this turn.
///
/// A neighbor is legal when it is passable terrain and either empty or
/// held by a friendly completed structure; stepping onto a structure is
/// how a unit requests boarding. Only a strictly higher score than the
/// unit's current tile wins, and ties between neighbors resolve to the
/// first direction in [`Direction::ALL`] order, so resolution is
/// deterministic. `None` means staying put is best.
#[must_use]
pub fn best_move(
    unit: &UnitSnapshot,
    field: &PotentialField,
    grid: &GridIndex,
    occupancy: &OccupancyGrid,
) -> Option<Direction> {
    let mut best = None;
    let mut best_score = field.score(unit.tile);
    for direction in Direction::ALL {
        let Some(tile) = direction.step_from(unit.tile) else {
            continue;
        };
        if !grid.passable(tile) {
            continue;
        }
        let legal = match occupancy.at(tile) {
            None => true,
            Some(occupant) => occupant.is_boardable_structure(),
        };
        if !legal {
            continue;
        }
        let score = field.score(tile);
        if score > best_score {
            best_score = score;
            best = Some(direction);
        }
    }
    best
}

/// Picks where a structure should unload a garrisoned unit.
///
/// Same comparison as [`best_move`] against the structure's own tile,
/// but legality narrows to open tiles: an ejected unit cannot displace
/// anyone and cannot land on another structure. `None` means no open
/// neighbor improves on staying garrisoned this turn.
#[must_use]
pub fn best_eject(
    structure_tile: TileCoord,
    field: &PotentialField,
    grid: &GridIndex,
    occupancy: &OccupancyGrid,
) -> Option<Direction> {
    let mut best = None;
    let mut best_score = field.score(structure_tile);
    for direction in Direction::ALL {
        let Some(tile) = direction.step_from(structure_tile) else {
            continue;
        };
        if !grid.passable(tile) || !occupancy.is_free(tile) {
            continue;
        }
        let score = field.score(tile);
        if score > best_score {
            best_score = score;
            best = Some(direction);
        }
    }
    best
}
