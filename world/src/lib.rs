#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spatial state management for the Gravwell engine.
//!
//! This crate owns everything the decision systems sense the battlefield
//! through: the immutable [`GridIndex`] built once from static terrain,
//! the one-time zone decomposition in [`ZoneMap`], the incrementally
//! updated [`ResourceLedger`], and the per-turn caches gathered in
//! [`TurnContext`] (occupancy, threat, visibility). The potential-field
//! and movement systems consume these through immutable views or
//! explicit mutation points; nothing here performs engine actions.

use gravwell_core::MapId;
use thiserror::Error;

mod context;
mod index;
mod occupancy;
mod resources;
mod threat;
mod visibility;
mod zones;

pub use context::TurnContext;
pub use index::{GridIndex, RadiusBounds};
pub use occupancy::OccupancyGrid;
pub use resources::{ResourceLedger, HARVEST_RATE, MIN_WORKERS_PER_ZONE, TURNS_PER_WORKER};
pub use threat::ThreatGrid;
pub use visibility::Visibility;
pub use zones::{LandingPool, Zone, ZoneMap};

/// Reasons static terrain data may be rejected during construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TerrainError {
    /// The passability table does not match the declared dimensions.
    #[error("terrain expects {expected} passability entries, got {actual}")]
    DimensionMismatch {
        /// Number of entries the dimensions require.
        expected: usize,
        /// Number of entries supplied.
        actual: usize,
    },
}

/// Static terrain description for one map, fixed for the whole match.
#[derive(Clone, Debug)]
pub struct Terrain {
    map: MapId,
    width: u32,
    height: u32,
    passable: Vec<bool>,
}

impl Terrain {
    /// Creates terrain from row-major passability data.
    ///
    /// The table must hold exactly `width * height` entries, indexed by
    /// `y * width + x`.
    pub fn new(
        map: MapId,
        width: u32,
        height: u32,
        passable: Vec<bool>,
    ) -> Result<Self, TerrainError> {
        let expected = width as usize * height as usize;
        if passable.len() != expected {
            return Err(TerrainError::DimensionMismatch {
                expected,
                actual: passable.len(),
            });
        }
        Ok(Self {
            map,
            width,
            height,
            passable,
        })
    }

    /// Map this terrain belongs to.
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

    pub(crate) fn passable_cells(&self) -> &[bool] {
        &self.passable
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{GridIndex, Terrain};
    use gravwell_core::MapId;

    /// Builds a grid index from an ASCII sketch: `.` passable, `#` not.
    pub(crate) fn grid_from_rows(rows: &[&str]) -> GridIndex {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |row| row.len()) as u32;
        let mut passable = Vec::with_capacity((width * height) as usize);
        for row in rows {
            assert_eq!(row.len() as u32, width, "ragged terrain sketch");
            passable.extend(row.chars().map(|c| c == '.'));
        }
        let terrain =
            Terrain::new(MapId::Home, width, height, passable).expect("sketch dimensions");
        GridIndex::build(&terrain)
    }

    /// Builds a fully passable grid index of the given size.
    pub(crate) fn open_grid(width: u32, height: u32) -> GridIndex {
        let terrain = Terrain::new(
            MapId::Home,
            width,
            height,
            vec![true; (width * height) as usize],
        )
        .expect("open terrain dimensions");
        GridIndex::build(&terrain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_rejects_mismatched_dimensions() {
        let result = Terrain::new(MapId::Home, 3, 2, vec![true; 5]);
        assert_eq!(
            result.err(),
            Some(TerrainError::DimensionMismatch {
                expected: 6,
                actual: 5,
            })
        );
    }

    #[test]
    fn terrain_accepts_exact_dimensions() {
        let terrain =
            Terrain::new(MapId::Destination, 3, 2, vec![true; 6]).expect("valid terrain");
        assert_eq!(terrain.map(), MapId::Destination);
        assert_eq!(terrain.width(), 3);
        assert_eq!(terrain.height(), 2);
    }
}
