//! Per-turn snapshot of which unit stands on which tile.

use gravwell_core::{TileCoord, UnitSnapshot};

use crate::GridIndex;

/// Dense tile-to-unit map rebuilt from sensor data each turn.
///
/// Between rebuilds the grid is adjusted optimistically as moves and
/// boardings are committed, so later decisions within the same turn see
/// tiles that are already claimed. Off-map queries answer as occupied
/// and off-map writes are ignored; movement legality is decided
/// elsewhere.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    units: Vec<Option<UnitSnapshot>>,
}

impl OccupancyGrid {
    /// Creates an empty grid matching the index dimensions.
    #[must_use]
    pub fn new(grid: &GridIndex) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            units: vec![None; grid.tile_count()],
        }
    }

    /// Replaces the whole snapshot with freshly sensed units.
    ///
    /// Units reported off the map are dropped; garrisoned units never
    /// appear here because they stand on no tile.
    pub fn refresh(&mut self, sensed: &[UnitSnapshot]) {
        self.units.fill(None);
        for unit in sensed {
            if let Some(index) = self.index_of(unit.tile) {
                self.units[index] = Some(*unit);
            }
        }
    }

    /// The unit standing on a tile, if any.
    #[must_use]
    pub fn at(&self, tile: TileCoord) -> Option<&UnitSnapshot> {
        self.index_of(tile)
            .and_then(|index| self.units[index].as_ref())
    }

    /// Whether a tile is on the map and empty.
    #[must_use]
    pub fn is_free(&self, tile: TileCoord) -> bool {
        self.index_of(tile)
            .map_or(false, |index| self.units[index].is_none())
    }

    /// Clears a tile after its occupant moved away or boarded a
    /// structure.
    pub fn remove(&mut self, tile: TileCoord) {
        if let Some(index) = self.index_of(tile) {
            self.units[index] = None;
        }
    }

    /// Places a unit on its snapshot tile, replacing any previous
    /// occupant.
    pub fn set(&mut self, unit: UnitSnapshot) {
        if let Some(index) = self.index_of(unit.tile) {
            self.units[index] = Some(unit);
        }
    }

    fn index_of(&self, tile: TileCoord) -> Option<usize> {
        if tile.x() < self.width && tile.y() < self.height {
            Some((tile.y() * self.width + tile.x()) as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::open_grid;
    use gravwell_core::{Team, UnitId, UnitKind};

    fn worker(id: u32, tile: TileCoord) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            kind: UnitKind::Worker,
            team: Team::Friendly,
            tile,
            health: 100,
            max_health: 100,
            damage: 0,
            attack_range_sq: 0,
            min_attack_range_sq: 0,
            can_strike_next_turn: false,
            built: true,
            garrison: 0,
            capacity: 0,
        }
    }

    #[test]
    fn refresh_replaces_the_previous_snapshot() {
        let grid = open_grid(4, 4);
        let mut occupancy = OccupancyGrid::new(&grid);

        occupancy.refresh(&[worker(1, TileCoord::new(0, 0))]);
        assert!(occupancy.at(TileCoord::new(0, 0)).is_some());

        occupancy.refresh(&[worker(1, TileCoord::new(2, 3))]);
        assert!(occupancy.at(TileCoord::new(0, 0)).is_none());
        let moved = occupancy.at(TileCoord::new(2, 3)).expect("unit present");
        assert_eq!(moved.id, UnitId::new(1));
    }

    #[test]
    fn committed_move_keeps_one_tile_per_unit() {
        let grid = open_grid(4, 4);
        let mut occupancy = OccupancyGrid::new(&grid);
        let from = TileCoord::new(1, 1);
        let to = TileCoord::new(2, 1);
        occupancy.refresh(&[worker(7, from)]);

        let mut moved = *occupancy.at(from).expect("unit present");
        moved.tile = to;
        occupancy.remove(from);
        occupancy.set(moved);

        assert!(occupancy.is_free(from));
        assert_eq!(occupancy.at(to).map(|unit| unit.id), Some(UnitId::new(7)));
    }

    #[test]
    fn off_map_access_is_tolerated() {
        let grid = open_grid(2, 2);
        let mut occupancy = OccupancyGrid::new(&grid);
        let outside = TileCoord::new(5, 5);

        occupancy.refresh(&[worker(3, outside)]);
        assert!(occupancy.at(outside).is_none());
        assert!(!occupancy.is_free(outside));
        occupancy.remove(outside);
        occupancy.set(worker(3, outside));
        assert!(occupancy.at(outside).is_none());
    }
}
