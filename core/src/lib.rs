#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gravwell engine.
//!
//! This crate defines the vocabulary that connects the persistent world
//! caches, the potential-field systems, and the movement resolver: grid
//! coordinates and directions, unit roles and snapshots, the fixed
//! resource replenishment schedule, and the cooperative turn budget.
//! Everything here is plain data; the spatial algorithms live in the
//! `gravwell-world` and system crates.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Identifies which of the two linked battle maps a grid describes.
///
/// Tiles themselves carry no map tag; the tag lives on the grid that owns
/// them, so coordinates from different maps cannot be mixed by a single
/// index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapId {
    /// The map the agent starts on.
    Home,
    /// The map units are ferried to later in the match.
    Destination,
}

/// Location of a single grid tile expressed as x and y coordinates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileCoord {
    x: u32,
    y: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the tile.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the tile.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Squared Euclidean distance between two tiles.
    #[must_use]
    pub fn distance_squared(self, other: TileCoord) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx * dx + dy * dy
    }
}

/// The eight compass directions a unit may step in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward decreasing y.
    North,
    /// Toward increasing x, decreasing y.
    Northeast,
    /// Toward increasing x.
    East,
    /// Toward increasing x and y.
    Southeast,
    /// Toward increasing y.
    South,
    /// Toward decreasing x, increasing y.
    Southwest,
    /// Toward decreasing x.
    West,
    /// Toward decreasing x and y.
    Northwest,
}

impl Direction {
    /// Every direction in the deterministic enumeration order used for
    /// tie-breaking.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::Northeast,
        Direction::East,
        Direction::Southeast,
        Direction::South,
        Direction::Southwest,
        Direction::West,
        Direction::Northwest,
    ];

    /// The (dx, dy) offset one step in this direction applies.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::Northeast => (1, -1),
            Direction::East => (1, 0),
            Direction::Southeast => (1, 1),
            Direction::South => (0, 1),
            Direction::Southwest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::Northwest => (-1, -1),
        }
    }

    /// Direction from one tile to a Chebyshev-adjacent tile.
    ///
    /// Returns `None` when the tiles coincide or are more than one step
    /// apart on either axis.
    #[must_use]
    pub fn between(from: TileCoord, to: TileCoord) -> Option<Direction> {
        let dx = i64::from(to.x()) - i64::from(from.x());
        let dy = i64::from(to.y()) - i64::from(from.y());
        if dx == 0 && dy == 0 {
            return None;
        }
        if dx.abs() > 1 || dy.abs() > 1 {
            return None;
        }

        let direction = match (dx, dy) {
            (0, -1) => Direction::North,
            (1, -1) => Direction::Northeast,
            (1, 0) => Direction::East,
            (1, 1) => Direction::Southeast,
            (0, 1) => Direction::South,
            (-1, 1) => Direction::Southwest,
            (-1, 0) => Direction::West,
            _ => Direction::Northwest,
        };
        Some(direction)
    }

    /// The tile one step in this direction, if it stays in quadrant one.
    #[must_use]
    pub fn step_from(self, tile: TileCoord) -> Option<TileCoord> {
        let (dx, dy) = self.offset();
        let x = i64::from(tile.x()) + i64::from(dx);
        let y = i64::from(tile.y()) + i64::from(dy);
        if x < 0 || y < 0 {
            return None;
        }
        Some(TileCoord::new(x as u32, y as u32))
    }
}

/// Number of mobile unit roles the field builder maintains maps for.
pub const ROLE_COUNT: usize = 5;

/// Behavioural role of a mobile friendly unit.
///
/// Each role owns one potential field per turn; structures have no role
/// and never consult a field to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Harvests resources and raises or repairs structures.
    Worker,
    /// Long-range attacker with a minimum no-fire ring.
    Ranged,
    /// Area-damage attacker that must stay clear of its own splash.
    Splash,
    /// Restores damaged friendly units.
    Healer,
    /// Close-range attacker that walks into danger to close distance.
    Melee,
}

impl Role {
    /// Every role in field-array order.
    pub const ALL: [Role; ROLE_COUNT] = [
        Role::Worker,
        Role::Ranged,
        Role::Splash,
        Role::Healer,
        Role::Melee,
    ];

    /// Dense index of this role within per-role arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Role::Worker => 0,
            Role::Ranged => 1,
            Role::Splash => 2,
            Role::Healer => 3,
            Role::Melee => 4,
        }
    }
}

/// Unique identifier assigned to a unit by the simulation engine.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a connected zone of passable terrain.
///
/// Zone ids are assigned from 1 upward during analysis; the reserved
/// value 0 marks impassable tiles that belong to no zone.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ZoneId(u16);

impl ZoneId {
    /// The reserved id carried by impassable tiles.
    pub const NONE: ZoneId = ZoneId(0);

    /// Creates a new zone identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Which side a sensed unit belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Team {
    /// A unit under this agent's control.
    Friendly,
    /// A unit controlled by the opposing player.
    Hostile,
}

/// Kind of unit reported by the simulation engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// Mobile harvester and builder.
    Worker,
    /// Mobile long-range attacker.
    Ranged,
    /// Mobile area-damage attacker.
    Splash,
    /// Mobile support unit that heals allies.
    Healer,
    /// Mobile close-range attacker.
    Melee,
    /// Stationary structure that ferries units to the destination map.
    Transport,
    /// Stationary structure that produces new mobile units.
    Producer,
}

impl UnitKind {
    /// The field role a mobile unit of this kind consults, if any.
    #[must_use]
    pub const fn role(self) -> Option<Role> {
        match self {
            UnitKind::Worker => Some(Role::Worker),
            UnitKind::Ranged => Some(Role::Ranged),
            UnitKind::Splash => Some(Role::Splash),
            UnitKind::Healer => Some(Role::Healer),
            UnitKind::Melee => Some(Role::Melee),
            UnitKind::Transport | UnitKind::Producer => None,
        }
    }

    /// Reports whether this kind is a stationary structure.
    #[must_use]
    pub const fn is_structure(self) -> bool {
        matches!(self, UnitKind::Transport | UnitKind::Producer)
    }
}

/// Immutable per-turn description of one sensed unit.
///
/// Snapshots are produced from the simulation engine's visible-unit list
/// once per turn and copied into the occupancy cache, which then mutates
/// as units act within the turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Identifier assigned by the simulation engine.
    pub id: UnitId,
    /// Kind of unit.
    pub kind: UnitKind,
    /// Side the unit fights for.
    pub team: Team,
    /// Tile the unit currently occupies.
    pub tile: TileCoord,
    /// Remaining hit points.
    pub health: u32,
    /// Hit points when undamaged.
    pub max_health: u32,
    /// Damage dealt by one attack; zero for units that cannot attack.
    pub damage: u32,
    /// Squared attack range.
    pub attack_range_sq: u32,
    /// Squared inner ring the unit cannot fire into; zero if none.
    pub min_attack_range_sq: u32,
    /// Whether the unit's cooldown allows an attack next turn.
    pub can_strike_next_turn: bool,
    /// Whether a structure has finished construction. Always true for
    /// mobile units.
    pub built: bool,
    /// Units currently garrisoned inside a structure.
    pub garrison: u32,
    /// Garrison capacity of a structure; zero for mobile units.
    pub capacity: u32,
}

impl UnitSnapshot {
    /// Reports whether the unit has lost any hit points.
    #[must_use]
    pub const fn is_damaged(&self) -> bool {
        self.health < self.max_health
    }

    /// Reports whether this is a friendly completed structure that other
    /// units may step onto to request boarding.
    #[must_use]
    pub fn is_boardable_structure(&self) -> bool {
        self.team == Team::Friendly && self.kind.is_structure() && self.built
    }

    /// Reports whether the unit projects danger onto nearby tiles.
    #[must_use]
    pub fn is_threat(&self) -> bool {
        self.team == Team::Hostile && self.damage > 0 && self.can_strike_next_turn
    }
}

/// One scheduled resource replenishment, known for the whole match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishEvent {
    /// Turn on which the deposit lands.
    pub turn: u32,
    /// Tile receiving the deposit.
    pub tile: TileCoord,
    /// Amount added to the tile.
    pub amount: u32,
}

/// Minimum wall-clock budget that must remain before another unit is
/// processed.
pub const BUDGET_SAFETY_MARGIN: Duration = Duration::from_millis(500);

/// Cooperative wall-clock budget for one turn of decisions.
///
/// The core never blocks or cancels work; the orchestration layer checks
/// [`TurnBudget::should_continue`] between units and simply stops asking
/// for decisions once the margin is gone. Units left unprocessed idle for
/// the turn, which is an accepted outcome rather than an error.
#[derive(Clone, Copy, Debug)]
pub struct TurnBudget {
    deadline: Instant,
    margin: Duration,
}

impl TurnBudget {
    /// Starts a budget of `total` wall-clock time from now, with the
    /// default safety margin.
    #[must_use]
    pub fn starting(total: Duration) -> Self {
        Self::with_margin(total, BUDGET_SAFETY_MARGIN)
    }

    /// Starts a budget with an explicit safety margin.
    #[must_use]
    pub fn with_margin(total: Duration, margin: Duration) -> Self {
        Self {
            deadline: Instant::now() + total,
            margin,
        }
    }

    /// Wall-clock time left before the deadline.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whether enough budget remains to process another unit.
    #[must_use]
    pub fn should_continue(&self) -> bool {
        self.remaining() > self.margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    #[test]
    fn distance_squared_matches_expectation() {
        let origin = TileCoord::new(1, 1);
        let destination = TileCoord::new(4, 3);
        assert_eq!(origin.distance_squared(destination), 13);
        assert_eq!(destination.distance_squared(origin), 13);
        assert_eq!(origin.distance_squared(origin), 0);
    }

    #[test]
    fn direction_between_adjacent_tiles() {
        let origin = TileCoord::new(3, 3);
        assert_eq!(
            Direction::between(origin, TileCoord::new(3, 2)),
            Some(Direction::North)
        );
        assert_eq!(
            Direction::between(origin, TileCoord::new(4, 4)),
            Some(Direction::Southeast)
        );
        assert_eq!(
            Direction::between(origin, TileCoord::new(2, 3)),
            Some(Direction::West)
        );
        assert_eq!(Direction::between(origin, origin), None);
        assert_eq!(Direction::between(origin, TileCoord::new(5, 3)), None);
    }

    #[test]
    fn every_direction_round_trips_through_between() {
        let origin = TileCoord::new(5, 5);
        for direction in Direction::ALL {
            let stepped = direction.step_from(origin).expect("step stays on grid");
            assert_eq!(Direction::between(origin, stepped), Some(direction));
        }
    }

    #[test]
    fn step_from_rejects_negative_coordinates() {
        assert_eq!(Direction::North.step_from(TileCoord::new(0, 0)), None);
        assert_eq!(Direction::West.step_from(TileCoord::new(0, 5)), None);
        assert_eq!(
            Direction::South.step_from(TileCoord::new(0, 0)),
            Some(TileCoord::new(0, 1))
        );
    }

    #[test]
    fn role_indices_are_dense_and_distinct() {
        for (expected, role) in Role::ALL.into_iter().enumerate() {
            assert_eq!(role.index(), expected);
        }
    }

    #[test]
    fn structure_kinds_have_no_role() {
        assert_eq!(UnitKind::Transport.role(), None);
        assert_eq!(UnitKind::Producer.role(), None);
        assert!(UnitKind::Transport.is_structure());
        assert!(!UnitKind::Melee.is_structure());
        assert_eq!(UnitKind::Melee.role(), Some(Role::Melee));
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: serde::Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&UnitId::new(42));
        assert_round_trip(&ZoneId::new(7));
        assert_round_trip(&TileCoord::new(5, 9));
        assert_round_trip(&MapId::Destination);
        assert_round_trip(&ReplenishEvent {
            turn: 250,
            tile: TileCoord::new(3, 4),
            amount: 60,
        });
    }

    #[test]
    fn spent_budget_stops_processing() {
        let budget = TurnBudget::starting(Duration::ZERO);
        assert!(!budget.should_continue());
    }

    #[test]
    fn fresh_budget_allows_processing() {
        let budget = TurnBudget::with_margin(Duration::from_secs(10), Duration::from_millis(1));
        assert!(budget.should_continue());
        assert!(budget.remaining() > Duration::from_secs(5));
    }
}
