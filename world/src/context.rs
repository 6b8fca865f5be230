//! Per-turn bundle of the mutable battlefield caches.

use gravwell_core::{TileCoord, UnitSnapshot};

use crate::{GridIndex, OccupancyGrid, ThreatGrid, Visibility};

/// Everything that must be re-sensed at the top of a turn, refreshed
/// together so no system reads a cache from a previous turn.
///
/// The context is created once per map and carried across turns;
/// [`TurnContext::begin`] rebuilds occupancy and threat from scratch and
/// folds new sightings into the cumulative visibility record.
#[derive(Clone, Debug)]
pub struct TurnContext {
    turn: u32,
    /// Tile-to-unit snapshot for this turn.
    pub occupancy: OccupancyGrid,
    /// Projected enemy damage per tile for this turn.
    pub threat: ThreatGrid,
    /// Cumulative exploration record.
    pub visibility: Visibility,
}

impl TurnContext {
    /// Creates empty caches sized to the map.
    #[must_use]
    pub fn new(grid: &GridIndex) -> Self {
        Self {
            turn: 0,
            occupancy: OccupancyGrid::new(grid),
            threat: ThreatGrid::new(grid),
            visibility: Visibility::new(grid),
        }
    }

    /// Refreshes every cache from this turn's sensor data.
    pub fn begin(
        &mut self,
        turn: u32,
        grid: &mut GridIndex,
        sensed_units: &[UnitSnapshot],
        visible_tiles: &[TileCoord],
    ) {
        self.turn = turn;
        self.occupancy.refresh(sensed_units);
        self.threat.refresh(grid, sensed_units);
        self.visibility.refresh(grid, visible_tiles);
    }

    /// Turn the caches were last refreshed for.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::open_grid;
    use gravwell_core::{Team, UnitId, UnitKind};

    #[test]
    fn begin_refreshes_all_caches_together() {
        let mut grid = open_grid(5, 5);
        let mut context = TurnContext::new(&grid);
        let enemy = UnitSnapshot {
            id: UnitId::new(1),
            kind: UnitKind::Melee,
            team: Team::Hostile,
            tile: TileCoord::new(2, 2),
            health: 250,
            max_health: 250,
            damage: 60,
            attack_range_sq: 2,
            min_attack_range_sq: 0,
            can_strike_next_turn: true,
            built: true,
            garrison: 0,
            capacity: 0,
        };

        context.begin(41, &mut grid, &[enemy], &[TileCoord::new(2, 2)]);
        assert_eq!(context.turn(), 41);
        assert!(context.occupancy.at(TileCoord::new(2, 2)).is_some());
        assert!(context.threat.at(TileCoord::new(2, 1)) > 0.0);
        assert!(context.visibility.is_seen(&grid, TileCoord::new(2, 2)));

        context.begin(42, &mut grid, &[], &[]);
        assert_eq!(context.turn(), 42);
        assert!(context.occupancy.at(TileCoord::new(2, 2)).is_none());
        assert_eq!(context.threat.at(TileCoord::new(2, 1)), 0.0);
        assert!(context.visibility.is_seen(&grid, TileCoord::new(2, 2)));
    }
}
