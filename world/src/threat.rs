//! Projected enemy damage per tile.

use gravwell_core::{TileCoord, UnitSnapshot};

use crate::{GridIndex, RadiusBounds};

/// Inner reach assumed for every attacker, so even short-ranged enemies
/// project danger over the tiles they could step into before firing.
const MIN_REACH_SQ: u32 = 8;

/// Dense field of damage hostile units could deliver to each tile,
/// rebuilt from the sensed unit list every turn.
///
/// Overlapping attackers sum, so the field reads as expected incoming
/// damage rather than a binary danger mask. Attackers with a dead zone
/// project nothing inside it; standing next to such a unit is safe from
/// it.
#[derive(Clone, Debug)]
pub struct ThreatGrid {
    width: u32,
    damage: Vec<f64>,
}

impl ThreatGrid {
    /// Creates a zeroed field matching the index dimensions.
    #[must_use]
    pub fn new(grid: &GridIndex) -> Self {
        Self {
            width: grid.width(),
            damage: vec![0.0; grid.tile_count()],
        }
    }

    /// Rebuilds the field from this turn's sensed units.
    ///
    /// Only hostiles that deal damage and are off cooldown contribute;
    /// a disarmed or recharging enemy is not a threat this turn.
    pub fn refresh(&mut self, grid: &mut GridIndex, sensed: &[UnitSnapshot]) {
        self.damage.fill(0.0);
        let width = self.width;
        for unit in sensed {
            if !unit.is_threat() || !grid.contains(unit.tile) {
                continue;
            }
            let reach = unit.attack_range_sq.max(MIN_REACH_SQ);
            let bounds = if unit.min_attack_range_sq > 0 {
                RadiusBounds::ring(unit.min_attack_range_sq, reach)
            } else {
                RadiusBounds::up_to(reach)
            };
            let projected = f64::from(unit.damage);
            for tile in grid.within(unit.tile, bounds) {
                let index = (tile.y() * width + tile.x()) as usize;
                self.damage[index] += projected;
            }
        }
    }

    /// Damage hostiles could deliver to a tile next turn; zero off the
    /// map.
    #[must_use]
    pub fn at(&self, tile: TileCoord) -> f64 {
        if tile.x() < self.width {
            self.damage
                .get((tile.y() * self.width + tile.x()) as usize)
                .copied()
                .unwrap_or(0.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::open_grid;
    use gravwell_core::{Team, UnitId, UnitKind};

    fn hostile(
        id: u32,
        tile: TileCoord,
        damage: u32,
        attack_range_sq: u32,
        min_attack_range_sq: u32,
    ) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            kind: UnitKind::Ranged,
            team: Team::Hostile,
            tile,
            health: 200,
            max_health: 200,
            damage,
            attack_range_sq,
            min_attack_range_sq,
            can_strike_next_turn: true,
            built: true,
            garrison: 0,
            capacity: 0,
        }
    }

    #[test]
    fn overlapping_attackers_sum() {
        let mut grid = open_grid(9, 9);
        let mut threat = ThreatGrid::new(&grid);
        let units = [
            hostile(1, TileCoord::new(3, 4), 30, 8, 0),
            hostile(2, TileCoord::new(5, 4), 40, 8, 0),
        ];
        threat.refresh(&mut grid, &units);

        assert_eq!(threat.at(TileCoord::new(4, 4)), 70.0);
        assert_eq!(threat.at(TileCoord::new(1, 4)), 30.0);
        assert_eq!(threat.at(TileCoord::new(0, 0)), 0.0);
    }

    #[test]
    fn dead_zone_projects_no_threat() {
        let mut grid = open_grid(11, 11);
        let mut threat = ThreatGrid::new(&grid);
        let center = TileCoord::new(5, 5);
        threat.refresh(&mut grid, &[hostile(1, center, 30, 50, 10)]);

        // Adjacent tiles sit inside the dead zone, dist² <= 2.
        assert_eq!(threat.at(center), 0.0);
        assert_eq!(threat.at(TileCoord::new(6, 6)), 0.0);
        assert_eq!(threat.at(TileCoord::new(5, 9)), 30.0);
    }

    #[test]
    fn short_ranged_units_still_project_nearby() {
        let mut grid = open_grid(7, 7);
        let mut threat = ThreatGrid::new(&grid);
        let center = TileCoord::new(3, 3);
        threat.refresh(&mut grid, &[hostile(1, center, 25, 2, 0)]);

        // Reach is widened to dist² <= 8 for melee-class attackers.
        assert_eq!(threat.at(TileCoord::new(5, 5)), 25.0);
        assert_eq!(threat.at(TileCoord::new(6, 3)), 0.0);
    }

    #[test]
    fn cooldown_and_harmless_units_are_ignored() {
        let mut grid = open_grid(5, 5);
        let mut threat = ThreatGrid::new(&grid);

        let mut recharging = hostile(1, TileCoord::new(2, 2), 30, 50, 0);
        recharging.can_strike_next_turn = false;
        let harmless = hostile(2, TileCoord::new(2, 2), 0, 50, 0);
        threat.refresh(&mut grid, &[recharging, harmless]);

        assert_eq!(threat.at(TileCoord::new(2, 2)), 0.0);
    }

    #[test]
    fn refresh_clears_stale_damage() {
        let mut grid = open_grid(5, 5);
        let mut threat = ThreatGrid::new(&grid);
        threat.refresh(&mut grid, &[hostile(1, TileCoord::new(2, 2), 30, 50, 0)]);
        assert!(threat.at(TileCoord::new(2, 2)) > 0.0);

        threat.refresh(&mut grid, &[]);
        assert_eq!(threat.at(TileCoord::new(2, 2)), 0.0);
    }
}
