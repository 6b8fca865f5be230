#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Multi-source potential-field propagation and per-role field assembly.
//!
//! Attraction spreads outward from source tiles in breadth-first rings,
//! weakening with the square of the walking distance, so every unit can
//! pick its next step by reading only its own tile and its neighbors.
//! [`RippleEngine`] performs one such propagation; [`FieldSet`] composes
//! the per-role fields a turn needs from jitter, threat, and the
//! role-specific attractors.

use gravwell_core::{Role, Team, TileCoord, ROLE_COUNT};
use gravwell_world::{GridIndex, OccupancyGrid};

mod builder;
mod field;

pub use builder::{FieldInputs, FieldSet, TransportCall};
pub use field::PotentialField;

/// First turn on which broadcast ripples may pull workers off mining.
pub const WORKER_BROADCAST_TURN: u32 = 700;

/// Destination of one ripple propagation.
///
/// `AllRoles` replaces an implicit everyone-listen convention with an
/// explicit variant: the deposit lands in every role's field, except
/// that the worker field is skipped before [`WORKER_BROADCAST_TURN`] so
/// the economy keeps running while the match is young.
pub enum RippleTarget<'a> {
    /// Deposit into one field.
    Single(&'a mut PotentialField),
    /// Deposit into every role's field, subject to the worker cutoff.
    AllRoles {
        /// One field per role, indexed by [`Role::index`].
        fields: &'a mut [PotentialField; ROLE_COUNT],
        /// Current turn, checked against [`WORKER_BROADCAST_TURN`].
        turn: u32,
    },
}

impl RippleTarget<'_> {
    fn deposit(&mut self, tile: TileCoord, value: f64) {
        match self {
            Self::Single(field) => field.add(tile, value),
            Self::AllRoles { fields, turn } => {
                for role in Role::ALL {
                    if role == Role::Worker && *turn < WORKER_BROADCAST_TURN {
                        continue;
                    }
                    fields[role.index()].add(tile, value);
                }
            }
        }
    }
}

/// Breadth-first attraction spreader with reusable scratch state.
///
/// The visited marks are epoch-stamped so consecutive calls cost
/// O(tiles actually reached) without clearing a map-sized buffer each
/// time.
#[derive(Clone, Debug, Default)]
pub struct RippleEngine {
    visited: Vec<u32>,
    epoch: u32,
    ring: Vec<TileCoord>,
    next_ring: Vec<TileCoord>,
}

impl RippleEngine {
    /// Creates an engine with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spreads `strength` outward from `sources` into `target`.
    ///
    /// Sources sit at walking distance 1 and every ring at distance `d`
    /// receives `strength / d²`. Duplicate and impassable sources are
    /// dropped; when none survive the call is a no-op.
    ///
    /// Friendly units encountered during the spread count toward
    /// `quota` when they match `role_filter` (any friendly matches when
    /// the filter is `None`). Once a fully scored ring brings the count
    /// to `quota`, propagation stops: enough units have already heard
    /// the call, and tiles farther out stay untouched. A matching unit
    /// standing on a source tile is scored but does not propagate.
    ///
    /// `stop_distance` caps the spread depth regardless of the quota.
    #[allow(clippy::too_many_arguments)]
    pub fn ripple(
        &mut self,
        mut target: RippleTarget<'_>,
        grid: &GridIndex,
        occupancy: &OccupancyGrid,
        sources: &[TileCoord],
        strength: f64,
        role_filter: Option<Role>,
        quota: usize,
        stop_distance: Option<u32>,
    ) {
        if self.visited.len() != grid.tile_count() {
            self.visited = vec![0; grid.tile_count()];
            self.epoch = 0;
        }
        if self.epoch == u32::MAX {
            self.visited.fill(0);
            self.epoch = 0;
        }
        self.epoch += 1;
        let epoch = self.epoch;

        self.ring.clear();
        for &source in sources {
            if !grid.passable(source) {
                continue;
            }
            let Some(index) = grid.index_of(source) else {
                continue;
            };
            if self.visited[index] != epoch {
                self.visited[index] = epoch;
                self.ring.push(source);
            }
        }
        if self.ring.is_empty() {
            return;
        }

        let mut distance: u32 = 1;
        let mut matched: usize = 0;
        loop {
            self.next_ring.clear();
            let deposit = strength / f64::from(distance * distance);
            for position in 0..self.ring.len() {
                let tile = self.ring[position];
                target.deposit(tile, deposit);

                let is_match = occupancy.at(tile).map_or(false, |unit| {
                    unit.team == Team::Friendly
                        && role_filter.map_or(true, |role| unit.kind.role() == Some(role))
                });
                if is_match {
                    matched += 1;
                    if distance == 1 {
                        continue;
                    }
                }
                for &next in grid.passable_neighbors(tile) {
                    let Some(index) = grid.index_of(next) else {
                        continue;
                    };
                    if self.visited[index] != epoch {
                        self.visited[index] = epoch;
                        self.next_ring.push(next);
                    }
                }
            }

            if matched >= quota {
                break;
            }
            if stop_distance.map_or(false, |cap| distance >= cap) {
                break;
            }
            if self.next_ring.is_empty() {
                break;
            }
            std::mem::swap(&mut self.ring, &mut self.next_ring);
            distance += 1;
        }
    }
}
