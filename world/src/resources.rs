//! Incrementally maintained view of harvestable resource on the map.

use std::collections::HashMap;

use gravwell_core::{ReplenishEvent, TileCoord, ZoneId};

use crate::{GridIndex, ZoneMap};

/// Amount a worker extracts from a deposit per harvest action.
pub const HARVEST_RATE: u32 = 3;

/// Turns one worker is assumed to spend harvesting when sizing crews.
pub const TURNS_PER_WORKER: u32 = 100;

/// Lower bound on the worker crew assigned to any occupied zone.
pub const MIN_WORKERS_PER_ZONE: u32 = 4;

/// Live record of where resource sits and how much of it remains.
///
/// The ledger is corrected from sensor data every turn and adjusted
/// optimistically in between: a harvest decrements the local amount
/// immediately so two workers never chase the same depleted deposit
/// within one turn.
#[derive(Clone, Debug, Default)]
pub struct ResourceLedger {
    amounts: HashMap<TileCoord, u32>,
    schedule: Vec<ReplenishEvent>,
    turn: u32,
}

impl ResourceLedger {
    /// Creates a ledger seeded from the static map's initial deposits
    /// and the match-long replenishment schedule.
    #[must_use]
    pub fn new(initial_amounts: &[(TileCoord, u32)], schedule: &[ReplenishEvent]) -> Self {
        let amounts = initial_amounts
            .iter()
            .copied()
            .filter(|&(_, amount)| amount > 0)
            .collect();
        Self {
            amounts,
            schedule: schedule.to_vec(),
            turn: 0,
        }
    }

    /// Resource currently believed to sit on a tile.
    #[must_use]
    pub fn amount(&self, tile: TileCoord) -> u32 {
        self.amounts.get(&tile).copied().unwrap_or(0)
    }

    /// Every tile currently believed to carry resource.
    pub fn locations(&self) -> impl Iterator<Item = (TileCoord, u32)> + '_ {
        self.amounts.iter().map(|(&tile, &amount)| (tile, amount))
    }

    /// Records one harvest action against a deposit and returns the
    /// amount actually extracted.
    ///
    /// Extraction saturates at the remaining amount; a deposit that
    /// reaches zero is dropped from the location set so field sources
    /// stop pointing at it the same turn.
    pub fn harvest(&mut self, tile: TileCoord) -> u32 {
        let Some(remaining) = self.amounts.get_mut(&tile) else {
            return 0;
        };
        let taken = (*remaining).min(HARVEST_RATE);
        *remaining -= taken;
        if *remaining == 0 {
            let _ = self.amounts.remove(&tile);
        }
        taken
    }

    /// Replaces believed amounts with freshly sensed ones and applies
    /// any replenishment scheduled for this turn.
    ///
    /// Sensed data wins over local bookkeeping wherever the two
    /// disagree. Deposits landing this turn are added afterwards, which
    /// re-registers tiles the sensor pass saw as empty.
    pub fn refresh(&mut self, sensed: &[(TileCoord, u32)], turn: u32) {
        self.turn = turn;
        for &(tile, amount) in sensed {
            if amount == 0 {
                let _ = self.amounts.remove(&tile);
            } else {
                let _ = self.amounts.insert(tile, amount);
            }
        }
        for event in &self.schedule {
            if event.turn == turn {
                *self.amounts.entry(event.tile).or_insert(0) += event.amount;
            }
        }
    }

    /// Worker crew size a zone can usefully employ.
    ///
    /// Each deposit needs `ceil(amount / HARVEST_RATE)` harvest actions;
    /// spread over [`TURNS_PER_WORKER`] turns per worker that yields the
    /// crew size, floored at [`MIN_WORKERS_PER_ZONE`] so small zones
    /// still get a token presence.
    #[must_use]
    pub fn max_workers(&self, grid: &GridIndex, zones: &ZoneMap, zone: ZoneId) -> u32 {
        let mut actions: u64 = 0;
        for (tile, amount) in self.locations() {
            if zones.zone_of(grid, tile) == zone {
                actions += u64::from(amount.div_ceil(HARVEST_RATE));
            }
        }
        // Deposits already landed are counted through their tiles above.
        for event in &self.schedule {
            if event.turn > self.turn && zones.zone_of(grid, event.tile) == zone {
                actions += u64::from(event.amount.div_ceil(HARVEST_RATE));
            }
        }
        let crew = (actions / u64::from(TURNS_PER_WORKER)) as u32;
        crew.max(MIN_WORKERS_PER_ZONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{grid_from_rows, open_grid};

    #[test]
    fn harvest_depletes_in_rate_sized_steps() {
        let tile = TileCoord::new(2, 2);
        let mut ledger = ResourceLedger::new(&[(tile, 10)], &[]);

        assert_eq!(ledger.harvest(tile), 3);
        assert_eq!(ledger.harvest(tile), 3);
        assert_eq!(ledger.harvest(tile), 3);
        assert_eq!(ledger.amount(tile), 1);
        assert_eq!(ledger.harvest(tile), 1);
        assert_eq!(ledger.amount(tile), 0);
        assert_eq!(ledger.harvest(tile), 0);
        assert_eq!(ledger.locations().count(), 0);
    }

    #[test]
    fn refresh_prefers_sensed_amounts() {
        let tile = TileCoord::new(1, 0);
        let mut ledger = ResourceLedger::new(&[(tile, 30)], &[]);
        let _ = ledger.harvest(tile);

        ledger.refresh(&[(tile, 12)], 5);
        assert_eq!(ledger.amount(tile), 12);

        ledger.refresh(&[(tile, 0)], 6);
        assert_eq!(ledger.amount(tile), 0);
        assert_eq!(ledger.locations().count(), 0);
    }

    #[test]
    fn replenishment_re_registers_empty_tiles() {
        let tile = TileCoord::new(4, 4);
        let schedule = [ReplenishEvent {
            turn: 120,
            tile,
            amount: 50,
        }];
        let mut ledger = ResourceLedger::new(&[], &schedule);

        ledger.refresh(&[], 119);
        assert_eq!(ledger.amount(tile), 0);

        ledger.refresh(&[(tile, 0)], 120);
        assert_eq!(ledger.amount(tile), 50);
        assert_eq!(ledger.locations().count(), 1);
    }

    #[test]
    fn zone_crew_size_scales_with_resource() {
        let grid = open_grid(6, 6);
        let zones = ZoneMap::analyse(&grid, &[], &[]);
        let zone = zones.zones()[0].id();

        // 2400 resource needs 800 harvest actions, or 8 worker-lifetimes.
        let deposits = [
            (TileCoord::new(0, 0), 1200),
            (TileCoord::new(5, 5), 1200),
        ];
        let ledger = ResourceLedger::new(&deposits, &[]);
        assert_eq!(ledger.max_workers(&grid, &zones, zone), 8);
    }

    #[test]
    fn sparse_zone_still_gets_minimum_crew() {
        let grid = grid_from_rows(&[
            "..#..", //
            "..#..",
        ]);
        let zones = ZoneMap::analyse(&grid, &[], &[]);
        let zone = zones.zone_of(&grid, TileCoord::new(0, 0));
        let ledger = ResourceLedger::new(&[(TileCoord::new(0, 0), 9)], &[]);
        assert_eq!(ledger.max_workers(&grid, &zones, zone), MIN_WORKERS_PER_ZONE);
    }
}
