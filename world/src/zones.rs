//! One-time decomposition of passable terrain into connected zones.

use std::collections::VecDeque;

use gravwell_core::{ReplenishEvent, TileCoord, ZoneId};

use crate::GridIndex;

/// Pool of tiles eligible to receive an arriving transport.
///
/// Consumers reserve a site before committing a landing and release it
/// if the landing falls through, instead of deleting entries from a
/// shared list. A zone whose pool is exhausted simply offers no sites.
#[derive(Clone, Debug, Default)]
pub struct LandingPool {
    available: Vec<TileCoord>,
    reserved: Vec<TileCoord>,
}

impl LandingPool {
    fn new(tiles: Vec<TileCoord>) -> Self {
        Self {
            available: tiles,
            reserved: Vec::new(),
        }
    }

    /// Sites currently open for reservation.
    #[must_use]
    pub fn available(&self) -> &[TileCoord] {
        &self.available
    }

    /// Claims a site, removing it from the available set.
    ///
    /// Returns false when the tile is not an available site.
    pub fn reserve(&mut self, tile: TileCoord) -> bool {
        let Some(position) = self.available.iter().position(|&t| t == tile) else {
            return false;
        };
        let claimed = self.available.swap_remove(position);
        self.reserved.push(claimed);
        true
    }

    /// Returns a previously reserved site to the available set, e.g.
    /// after a failed landing.
    ///
    /// Returns false when the tile was not reserved.
    pub fn release(&mut self, tile: TileCoord) -> bool {
        let Some(position) = self.reserved.iter().position(|&t| t == tile) else {
            return false;
        };
        let freed = self.reserved.swap_remove(position);
        self.available.push(freed);
        true
    }

    /// Whether no sites remain available.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.available.is_empty()
    }
}

/// A maximal connected component of passable tiles under
/// eight-connectivity.
///
/// Zones are created once from static terrain and never merge or split;
/// only the landing pool mutates over a run.
#[derive(Clone, Debug)]
pub struct Zone {
    id: ZoneId,
    tiles: Vec<TileCoord>,
    resource_total: u64,
    /// Tiles of this zone still eligible for incoming transports.
    pub landing_sites: LandingPool,
}

impl Zone {
    /// Identifier assigned during analysis.
    #[must_use]
    pub const fn id(&self) -> ZoneId {
        self.id
    }

    /// Every member tile, in row-major discovery order.
    #[must_use]
    pub fn tiles(&self) -> &[TileCoord] {
        &self.tiles
    }

    /// Total resource ever depositable in the zone: initial amounts of
    /// member tiles plus all scheduled replenishment landing inside.
    #[must_use]
    pub const fn resource_total(&self) -> u64 {
        self.resource_total
    }

    /// Desirability rank used to order zones: tile count plus a tenth of
    /// the resource total.
    #[must_use]
    pub fn rank(&self) -> u64 {
        self.tiles.len() as u64 + self.resource_total / 10
    }
}

/// Complete zone decomposition of one map.
#[derive(Clone, Debug)]
pub struct ZoneMap {
    zone_ids: Vec<ZoneId>,
    zones: Vec<Zone>,
    by_id: Vec<usize>,
}

impl ZoneMap {
    /// Labels every passable tile with a zone id via flood fill, then
    /// scores and orders the zones, best first.
    ///
    /// `initial_amounts` lists the resource-bearing tiles of the static
    /// map; `schedule` is the fixed match-long replenishment plan. Both
    /// contribute to each zone's resource total so landing priority can
    /// account for deposits that have not fallen yet. The analysis is
    /// total over any terrain, including the destination map, which
    /// needs no live visibility.
    #[must_use]
    pub fn analyse(
        grid: &GridIndex,
        initial_amounts: &[(TileCoord, u32)],
        schedule: &[ReplenishEvent],
    ) -> Self {
        let mut zone_ids = vec![ZoneId::NONE; grid.tile_count()];
        let mut next_id: u16 = 1;

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let tile = TileCoord::new(x, y);
                let Some(index) = grid.index_of(tile) else {
                    continue;
                };
                if grid.passable(tile) && zone_ids[index] == ZoneId::NONE {
                    flood(grid, tile, ZoneId::new(next_id), &mut zone_ids);
                    next_id += 1;
                }
            }
        }

        let zone_count = usize::from(next_id - 1);
        let mut tiles_per_zone: Vec<Vec<TileCoord>> = vec![Vec::new(); zone_count];
        let mut resource_per_zone: Vec<u64> = vec![0; zone_count];

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let tile = TileCoord::new(x, y);
                let Some(index) = grid.index_of(tile) else {
                    continue;
                };
                let id = zone_ids[index];
                if id != ZoneId::NONE {
                    tiles_per_zone[usize::from(id.get() - 1)].push(tile);
                }
            }
        }

        for &(tile, amount) in initial_amounts {
            if let Some(index) = grid.index_of(tile) {
                let id = zone_ids[index];
                if id != ZoneId::NONE {
                    resource_per_zone[usize::from(id.get() - 1)] += u64::from(amount);
                }
            }
        }
        for event in schedule {
            if let Some(index) = grid.index_of(event.tile) {
                let id = zone_ids[index];
                if id != ZoneId::NONE {
                    resource_per_zone[usize::from(id.get() - 1)] += u64::from(event.amount);
                }
            }
        }

        let mut zones: Vec<Zone> = tiles_per_zone
            .into_iter()
            .zip(resource_per_zone)
            .enumerate()
            .map(|(offset, (tiles, resource_total))| Zone {
                id: ZoneId::new(offset as u16 + 1),
                landing_sites: LandingPool::new(tiles.clone()),
                tiles,
                resource_total,
            })
            .collect();

        // Stable sort keeps discovery order between equally ranked zones.
        zones.sort_by_key(|zone| std::cmp::Reverse(zone.rank()));

        let mut by_id = vec![0; zone_count];
        for (position, zone) in zones.iter().enumerate() {
            by_id[usize::from(zone.id.get() - 1)] = position;
        }

        Self {
            zone_ids,
            zones,
            by_id,
        }
    }

    /// Zone id of a tile; [`ZoneId::NONE`] for impassable or off-map
    /// tiles.
    #[must_use]
    pub fn zone_of(&self, grid: &GridIndex, tile: TileCoord) -> ZoneId {
        grid.index_of(tile)
            .map_or(ZoneId::NONE, |index| self.zone_ids[index])
    }

    /// Every zone, best ranked first.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Looks up a zone by id.
    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        if id == ZoneId::NONE {
            return None;
        }
        self.by_id
            .get(usize::from(id.get() - 1))
            .map(|&position| &self.zones[position])
    }

    /// Looks up a zone by id for landing-pool mutation.
    pub fn zone_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        if id == ZoneId::NONE {
            return None;
        }
        self.by_id
            .get(usize::from(id.get() - 1))
            .copied()
            .map(move |position| &mut self.zones[position])
    }
}

fn flood(grid: &GridIndex, start: TileCoord, id: ZoneId, zone_ids: &mut [ZoneId]) {
    let mut queue = VecDeque::new();
    if let Some(index) = grid.index_of(start) {
        zone_ids[index] = id;
        queue.push_back(start);
    }

    while let Some(tile) = queue.pop_front() {
        for &next in grid.passable_neighbors(tile) {
            let Some(index) = grid.index_of(next) else {
                continue;
            };
            if zone_ids[index] == ZoneId::NONE {
                zone_ids[index] = id;
                queue.push_back(next);
            }
        }
    }
}
