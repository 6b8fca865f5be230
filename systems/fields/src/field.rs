//! Scalar attraction field over the tiles of one map.

use gravwell_core::TileCoord;
use gravwell_world::GridIndex;

/// Per-tile signed score that units descend by always stepping toward
/// the highest-scoring neighbor.
///
/// Attractors deposit positive score, threat and standing penalties
/// subtract, and the resolver only ever compares neighboring tiles, so
/// absolute magnitudes matter less than local gradients.
#[derive(Clone, Debug)]
pub struct PotentialField {
    width: u32,
    scores: Vec<f64>,
}

impl PotentialField {
    /// Creates a zeroed field matching the index dimensions.
    #[must_use]
    pub fn new(grid: &GridIndex) -> Self {
        Self {
            width: grid.width(),
            scores: vec![0.0; grid.tile_count()],
        }
    }

    /// Score of a tile; zero off the map.
    #[must_use]
    pub fn score(&self, tile: TileCoord) -> f64 {
        if tile.x() < self.width {
            self.scores
                .get((tile.y() * self.width + tile.x()) as usize)
                .copied()
                .unwrap_or(0.0)
        } else {
            0.0
        }
    }

    /// Adds to a tile's score; off-map deposits are dropped.
    pub fn add(&mut self, tile: TileCoord, delta: f64) {
        if tile.x() >= self.width {
            return;
        }
        let index = (tile.y() * self.width + tile.x()) as usize;
        if let Some(score) = self.scores.get_mut(index) {
            *score += delta;
        }
    }

    /// Resets every tile to zero.
    pub fn reset(&mut self) {
        self.scores.fill(0.0);
    }
}
