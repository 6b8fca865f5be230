//! Static per-tile spatial index with memoized radius queries.

use std::collections::HashMap;

use gravwell_core::{MapId, TileCoord};

use crate::Terrain;

/// Squared-distance bounds for a radius query.
///
/// [`RadiusBounds::up_to`] selects every tile with `dist² <= max`,
/// including the center itself. [`RadiusBounds::ring`] selects the
/// annulus `min < dist² <= max`, which always excludes the center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RadiusBounds {
    min_sq: Option<u32>,
    max_sq: u32,
}

impl RadiusBounds {
    /// Bounds selecting the full disc `dist² <= max_sq`, center included.
    #[must_use]
    pub const fn up_to(max_sq: u32) -> Self {
        Self {
            min_sq: None,
            max_sq,
        }
    }

    /// Bounds selecting the annulus `min_sq < dist² <= max_sq`.
    #[must_use]
    pub const fn ring(min_sq: u32, max_sq: u32) -> Self {
        Self {
            min_sq: Some(min_sq),
            max_sq,
        }
    }

    /// Whether the center tile itself satisfies the bounds.
    #[must_use]
    pub const fn includes_center(&self) -> bool {
        self.min_sq.is_none()
    }

    /// Whether a squared distance satisfies the bounds.
    #[must_use]
    pub fn admits(&self, dist_sq: u32) -> bool {
        if dist_sq > self.max_sq {
            return false;
        }
        match self.min_sq {
            None => true,
            Some(min) => dist_sq > min,
        }
    }

    /// Upper squared-distance bound.
    #[must_use]
    pub const fn max_sq(&self) -> u32 {
        self.max_sq
    }
}

/// Immutable spatial index over one map's static terrain.
///
/// Construction is two-pass: passability is recorded for every tile
/// first, then the per-tile neighbor and passable-neighbor lists are
/// derived from it. Both lists are pure functions of the terrain and
/// never change afterwards. Radius queries are memoized per
/// `(tile, bounds)` pair because the same small set of bounds recurs
/// every turn; the memo table is append-only for the life of the
/// process.
#[derive(Clone, Debug)]
pub struct GridIndex {
    map: MapId,
    width: u32,
    height: u32,
    passable: Vec<bool>,
    neighbors: Vec<Vec<TileCoord>>,
    passable_neighbors: Vec<Vec<TileCoord>>,
    radius_memo: HashMap<(usize, RadiusBounds), Vec<TileCoord>>,
}

impl GridIndex {
    /// Builds the index from static terrain.
    #[must_use]
    pub fn build(terrain: &Terrain) -> Self {
        let width = terrain.width();
        let height = terrain.height();
        let passable = terrain.passable_cells().to_vec();
        let tile_count = passable.len();

        let mut neighbors = Vec::with_capacity(tile_count);
        for y in 0..height {
            for x in 0..width {
                neighbors.push(adjacent_tiles(TileCoord::new(x, y), width, height));
            }
        }

        let mut passable_neighbors = Vec::with_capacity(tile_count);
        for list in &neighbors {
            passable_neighbors.push(
                list.iter()
                    .copied()
                    .filter(|tile| {
                        passable[(tile.y() * width + tile.x()) as usize]
                    })
                    .collect(),
            );
        }

        Self {
            map: terrain.map(),
            width,
            height,
            passable,
            neighbors,
            passable_neighbors,
            radius_memo: HashMap::new(),
        }
    }

    /// Map this index describes.
    #[must_use]
    pub const fn map(&self) -> MapId {
        self.map
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of tiles on the map.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.passable.len()
    }

    /// Whether the tile lies on this map.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.x() < self.width && tile.y() < self.height
    }

    /// Dense row-major index of an on-map tile.
    #[must_use]
    pub fn index_of(&self, tile: TileCoord) -> Option<usize> {
        if self.contains(tile) {
            Some((tile.y() * self.width + tile.x()) as usize)
        } else {
            None
        }
    }

    /// Whether a ground unit may occupy or cross the tile. Off-map tiles
    /// are never passable.
    #[must_use]
    pub fn passable(&self, tile: TileCoord) -> bool {
        self.index_of(tile)
            .map_or(false, |index| self.passable[index])
    }

    /// All tiles adjacent to `tile` (up to eight; edge tiles have fewer).
    ///
    /// # Panics
    ///
    /// Panics when `tile` lies outside the map; callers must bound-check
    /// coordinates before querying the index.
    #[must_use]
    pub fn neighbors(&self, tile: TileCoord) -> &[TileCoord] {
        &self.neighbors[self.bounded_index(tile)]
    }

    /// The passable subset of [`GridIndex::neighbors`], in the same
    /// order.
    ///
    /// # Panics
    ///
    /// Panics when `tile` lies outside the map.
    #[must_use]
    pub fn passable_neighbors(&self, tile: TileCoord) -> &[TileCoord] {
        &self.passable_neighbors[self.bounded_index(tile)]
    }

    /// All on-map tiles whose squared distance from `center` satisfies
    /// `bounds`, exactly equal to the brute-force circle enumeration.
    ///
    /// Results are memoized; the first query for a `(tile, bounds)` pair
    /// enumerates the circle by symmetry, later queries return the
    /// cached slice. Tiles beyond the map edge are skipped, never
    /// wrapped or clamped.
    ///
    /// # Panics
    ///
    /// Panics when `center` lies outside the map.
    pub fn within(&mut self, center: TileCoord, bounds: RadiusBounds) -> &[TileCoord] {
        let key = (self.bounded_index(center), bounds);
        let width = self.width;
        let height = self.height;
        self.radius_memo
            .entry(key)
            .or_insert_with(|| enumerate_circle(center, bounds, width, height))
    }

    fn bounded_index(&self, tile: TileCoord) -> usize {
        match self.index_of(tile) {
            Some(index) => index,
            None => panic!(
                "tile ({}, {}) is outside the {}x{} map",
                tile.x(),
                tile.y(),
                self.width,
                self.height
            ),
        }
    }
}

fn adjacent_tiles(center: TileCoord, width: u32, height: u32) -> Vec<TileCoord> {
    let mut result = Vec::with_capacity(8);
    for direction in gravwell_core::Direction::ALL {
        let Some(tile) = direction.step_from(center) else {
            continue;
        };
        if tile.x() < width && tile.y() < height {
            result.push(tile);
        }
    }
    result
}

/// Enumerates the circle by its symmetry classes: the center, the four
/// axis arms, the four diagonal arms, then the eight-way symmetric
/// remainder. Every offset `(dx, dy)` falls in exactly one class, so the
/// result equals brute-force enumeration while touching only candidate
/// tiles.
fn enumerate_circle(
    center: TileCoord,
    bounds: RadiusBounds,
    width: u32,
    height: u32,
) -> Vec<TileCoord> {
    let mut result = Vec::new();
    let cx = i64::from(center.x());
    let cy = i64::from(center.y());
    let max = i64::from(bounds.max_sq());

    let mut push = |x: i64, y: i64| {
        if x >= 0 && y >= 0 && x < i64::from(width) && y < i64::from(height) {
            result.push(TileCoord::new(x as u32, y as u32));
        }
    };

    if bounds.includes_center() {
        push(cx, cy);
    }

    // Horizontal and vertical arms: dist² = x².
    let mut x = 1i64;
    while x * x <= max {
        if bounds.admits((x * x) as u32) {
            push(cx + x, cy);
            push(cx, cy + x);
            push(cx - x, cy);
            push(cx, cy - x);
        }
        x += 1;
    }

    // Diagonal arms: dist² = 2x².
    let mut x = 1i64;
    while 2 * x * x <= max {
        if bounds.admits((2 * x * x) as u32) {
            push(cx + x, cy + x);
            push(cx + x, cy - x);
            push(cx - x, cy + x);
            push(cx - x, cy - x);
        }
        x += 1;
    }

    // Remaining offsets with x > y >= 1 appear under eight-way symmetry.
    let mut x = 2i64;
    while x * x + 1 <= max {
        let mut y = 1i64;
        while y < x && x * x + y * y <= max {
            if bounds.admits((x * x + y * y) as u32) {
                push(cx + x, cy + y);
                push(cx + x, cy - y);
                push(cx - y, cy + x);
                push(cx - y, cy - x);
                push(cx - x, cy - y);
                push(cx - x, cy + y);
                push(cx + y, cy - x);
                push(cx + y, cy + x);
            }
            y += 1;
        }
        x += 1;
    }

    result
}
