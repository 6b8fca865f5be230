//! Cumulative record of which tiles have ever been observed.

use gravwell_core::TileCoord;

use crate::GridIndex;

/// Exploration state of the map, grown monotonically from each turn's
/// visible-tile report.
///
/// The frontier is the set of passable tiles that have never been seen
/// but touch a seen tile; exploration fields pull units toward it until
/// it empties.
#[derive(Clone, Debug)]
pub struct Visibility {
    seen: Vec<bool>,
    frontier: Vec<TileCoord>,
    unseen_passable: usize,
}

impl Visibility {
    /// Creates a fully unexplored record for the map.
    #[must_use]
    pub fn new(grid: &GridIndex) -> Self {
        let mut unseen_passable = 0;
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.passable(TileCoord::new(x, y)) {
                    unseen_passable += 1;
                }
            }
        }
        Self {
            seen: vec![false; grid.tile_count()],
            frontier: Vec::new(),
            unseen_passable,
        }
    }

    /// Folds this turn's visible tiles into the record and recomputes
    /// the frontier.
    ///
    /// Seen status never reverts; a tile that falls out of sensor range
    /// stays explored.
    pub fn refresh(&mut self, grid: &GridIndex, visible: &[TileCoord]) {
        for &tile in visible {
            let Some(index) = grid.index_of(tile) else {
                continue;
            };
            if !self.seen[index] {
                self.seen[index] = true;
                if grid.passable(tile) {
                    self.unseen_passable -= 1;
                }
            }
        }

        self.frontier.clear();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let tile = TileCoord::new(x, y);
                let Some(index) = grid.index_of(tile) else {
                    continue;
                };
                if self.seen[index] || !grid.passable(tile) {
                    continue;
                }
                let touches_seen = grid
                    .neighbors(tile)
                    .iter()
                    .any(|&neighbor| self.is_seen(grid, neighbor));
                if touches_seen {
                    self.frontier.push(tile);
                }
            }
        }
    }

    /// Whether a tile has ever been observed.
    #[must_use]
    pub fn is_seen(&self, grid: &GridIndex, tile: TileCoord) -> bool {
        grid.index_of(tile).map_or(false, |index| self.seen[index])
    }

    /// Unseen passable tiles adjacent to explored ground, in row-major
    /// order.
    #[must_use]
    pub fn frontier(&self) -> &[TileCoord] {
        &self.frontier
    }

    /// Whether every passable tile has been observed.
    #[must_use]
    pub fn fully_explored(&self) -> bool {
        self.unseen_passable == 0
    }
}
