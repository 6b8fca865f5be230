//! Assembly of the five per-role fields a turn actually steers by.

use gravwell_core::{Role, TileCoord, UnitSnapshot, ROLE_COUNT};
use gravwell_world::{GridIndex, OccupancyGrid, RadiusBounds, ThreatGrid};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{PotentialField, RippleEngine, RippleTarget};

/// Upper bound (exclusive) of the per-tile tie-breaking noise.
const JITTER_MAX: f64 = 1e-3;

/// Resource amount covered by one attraction bucket.
const RESOURCE_BUCKET: u32 = 25;

/// Largest bucket a single deposit can occupy.
const BUCKET_CAP: u32 = 8;

/// Attraction of a build or repair site.
const BUILD_STRENGTH: f64 = 200.0;

/// Attraction of an engagement ring or a hostile tile.
const ENGAGE_STRENGTH: f64 = 100.0;

/// Attraction of a damaged friendly unit.
const HEAL_STRENGTH: f64 = 100.0;

/// Attraction of an unexplored frontier tile.
const FRONTIER_STRENGTH: f64 = 30.0;

/// Preferred standoff annulus for ranged units around a hostile.
const RANGED_STANDOFF: RadiusBounds = RadiusBounds::ring(10, 50);

/// Preferred standoff annulus for splash units around a hostile.
const SPLASH_STANDOFF: RadiusBounds = RadiusBounds::ring(8, 50);

/// Reach within which a healer positions toward damaged friendlies.
const HEAL_REACH: RadiusBounds = RadiusBounds::up_to(30);

/// One transport asking for passengers.
#[derive(Clone, Copy, Debug)]
pub struct TransportCall {
    /// Tile the transport stands on.
    pub tile: TileCoord,
    /// Remaining embarkation allowance per role.
    pub wanted: [u32; ROLE_COUNT],
}

/// Borrowed per-turn demand data the builder turns into fields.
///
/// Assembled by the orchestration layer from the ledger, the turn
/// context, and its own build queue; the builder never senses anything
/// itself.
#[derive(Clone, Copy, Debug)]
pub struct FieldInputs<'a> {
    /// Resource-bearing tiles with their believed amounts.
    pub deposits: &'a [(TileCoord, u32)],
    /// Tiles holding an unfinished or damaged friendly structure.
    pub build_sites: &'a [TileCoord],
    /// Visible hostile units.
    pub hostiles: &'a [UnitSnapshot],
    /// Friendly mobile units below full health.
    pub damaged_friendlies: &'a [UnitSnapshot],
    /// Unexplored passable tiles bordering explored ground.
    pub frontier: &'a [TileCoord],
    /// Transports asking for passengers.
    pub transports: &'a [TransportCall],
    /// Friendly unit count per role, used as ripple quotas.
    pub role_counts: [u32; ROLE_COUNT],
}

/// Lazily built, per-turn-memoized set of role fields.
///
/// A field is rebuilt at most once per `(role, turn)` pair; every later
/// request within the turn returns the cached field, so systems may ask
/// for fields in any order without duplicating work.
pub struct FieldSet {
    seed: u64,
    turn: u32,
    fields: [PotentialField; ROLE_COUNT],
    built: [bool; ROLE_COUNT],
    engine: RippleEngine,
}

impl FieldSet {
    /// Creates an unbuilt set sized to the map, with a fixed noise seed.
    #[must_use]
    pub fn new(grid: &GridIndex, seed: u64) -> Self {
        Self {
            seed,
            turn: 0,
            fields: std::array::from_fn(|_| PotentialField::new(grid)),
            built: [false; ROLE_COUNT],
            engine: RippleEngine::new(),
        }
    }

    /// Marks the start of a turn, invalidating every cached field.
    pub fn begin_turn(&mut self, turn: u32) {
        if turn != self.turn {
            self.turn = turn;
            self.built = [false; ROLE_COUNT];
        }
    }

    /// Turn the set currently builds fields for.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// The field for a role this turn, building it on first request.
    pub fn field(
        &mut self,
        role: Role,
        grid: &mut GridIndex,
        occupancy: &OccupancyGrid,
        threat: &ThreatGrid,
        inputs: &FieldInputs<'_>,
    ) -> &PotentialField {
        if !self.built[role.index()] {
            self.rebuild(role, grid, occupancy, threat, inputs);
            self.built[role.index()] = true;
        }
        &self.fields[role.index()]
    }

    /// Ripples an all-roles call (e.g. a final evacuation signal) into
    /// every field of this turn.
    ///
    /// Unbuilt fields are materialized first so the deposit cannot be
    /// wiped by a later rebuild. The worker cutoff of
    /// [`RippleTarget::AllRoles`] applies.
    pub fn broadcast(
        &mut self,
        grid: &mut GridIndex,
        occupancy: &OccupancyGrid,
        threat: &ThreatGrid,
        inputs: &FieldInputs<'_>,
        sources: &[TileCoord],
        strength: f64,
        quota: usize,
    ) {
        for role in Role::ALL {
            if !self.built[role.index()] {
                self.rebuild(role, grid, occupancy, threat, inputs);
                self.built[role.index()] = true;
            }
        }
        self.engine.ripple(
            RippleTarget::AllRoles {
                fields: &mut self.fields,
                turn: self.turn,
            },
            grid,
            occupancy,
            sources,
            strength,
            None,
            quota,
            None,
        );
    }

    fn rebuild(
        &mut self,
        role: Role,
        grid: &mut GridIndex,
        occupancy: &OccupancyGrid,
        threat: &ThreatGrid,
        inputs: &FieldInputs<'_>,
    ) {
        let slot = role.index();
        self.reset_base(role, grid, occupancy, threat);

        let quota = inputs.role_counts[slot] as usize;
        match role {
            Role::Worker => self.build_worker(grid, occupancy, inputs, quota),
            Role::Ranged => {
                self.build_standoff(Role::Ranged, RANGED_STANDOFF, grid, occupancy, inputs, quota);
            }
            Role::Splash => {
                self.build_standoff(Role::Splash, SPLASH_STANDOFF, grid, occupancy, inputs, quota);
            }
            Role::Healer => self.build_healer(grid, occupancy, inputs, quota),
            Role::Melee => self.build_melee(grid, occupancy, inputs, quota),
        }

        // Boarding calls grow more urgent as the match ages.
        let urgency = f64::from(self.turn) * 100.0;
        for call in inputs.transports {
            let wanted = call.wanted[slot];
            if wanted == 0 {
                continue;
            }
            self.engine.ripple(
                RippleTarget::Single(&mut self.fields[slot]),
                grid,
                occupancy,
                &[call.tile],
                urgency,
                Some(role),
                wanted as usize,
                None,
            );
        }
    }

    /// Resets a field to tie-breaking jitter minus projected threat.
    ///
    /// Jitter is drawn for every tile so the noise pattern depends only
    /// on `(seed, turn, role)`, then withheld from tiles holding a
    /// friendly completed structure: those must win ties only for units
    /// that genuinely want to board. Melee fields ignore threat; closing
    /// distance is their job.
    fn reset_base(
        &mut self,
        role: Role,
        grid: &GridIndex,
        occupancy: &OccupancyGrid,
        threat: &ThreatGrid,
    ) {
        let slot = role.index();
        let stream = u64::from(self.turn) * ROLE_COUNT as u64 + slot as u64;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(stream));
        let field = &mut self.fields[slot];
        field.reset();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let tile = TileCoord::new(x, y);
                let noise = rng.gen_range(0.0..JITTER_MAX);
                let parked_structure = occupancy
                    .at(tile)
                    .map_or(false, UnitSnapshot::is_boardable_structure);
                if !parked_structure {
                    field.add(tile, noise);
                }
                if role != Role::Melee {
                    field.add(tile, -threat.at(tile));
                }
            }
        }
    }

    fn build_worker(
        &mut self,
        grid: &mut GridIndex,
        occupancy: &OccupancyGrid,
        inputs: &FieldInputs<'_>,
        quota: usize,
    ) {
        let slot = Role::Worker.index();

        let mut buckets: [Vec<TileCoord>; BUCKET_CAP as usize] =
            std::array::from_fn(|_| Vec::new());
        for &(tile, amount) in inputs.deposits {
            if amount == 0 {
                continue;
            }
            let bucket = (amount / RESOURCE_BUCKET).clamp(1, BUCKET_CAP);
            buckets[(bucket - 1) as usize].push(tile);
        }
        for (offset, sources) in buckets.iter().enumerate() {
            if sources.is_empty() {
                continue;
            }
            let strength = f64::from(RESOURCE_BUCKET) * (offset as f64 + 1.0);
            self.engine.ripple(
                RippleTarget::Single(&mut self.fields[slot]),
                grid,
                occupancy,
                sources,
                strength,
                Some(Role::Worker),
                quota,
                None,
            );
        }

        for &site in inputs.build_sites {
            self.engine.ripple(
                RippleTarget::Single(&mut self.fields[slot]),
                grid,
                occupancy,
                &[site],
                BUILD_STRENGTH,
                Some(Role::Worker),
                quota,
                None,
            );
            // Builders stand beside the site, never on it.
            self.fields[slot].add(site, -BUILD_STRENGTH);
        }

        if inputs.deposits.is_empty() && inputs.build_sites.is_empty() {
            self.ripple_frontier(Role::Worker, grid, occupancy, inputs, quota);
        }
    }

    fn build_standoff(
        &mut self,
        role: Role,
        standoff: RadiusBounds,
        grid: &mut GridIndex,
        occupancy: &OccupancyGrid,
        inputs: &FieldInputs<'_>,
        quota: usize,
    ) {
        if inputs.hostiles.is_empty() {
            self.ripple_frontier(role, grid, occupancy, inputs, quota);
            return;
        }
        let mut sources = Vec::new();
        for hostile in inputs.hostiles {
            if !grid.contains(hostile.tile) {
                continue;
            }
            sources.extend_from_slice(grid.within(hostile.tile, standoff));
        }
        self.engine.ripple(
            RippleTarget::Single(&mut self.fields[role.index()]),
            grid,
            occupancy,
            &sources,
            ENGAGE_STRENGTH,
            Some(role),
            quota,
            None,
        );
    }

    fn build_healer(
        &mut self,
        grid: &mut GridIndex,
        occupancy: &OccupancyGrid,
        inputs: &FieldInputs<'_>,
        quota: usize,
    ) {
        let mut sources = Vec::new();
        for unit in inputs.damaged_friendlies {
            if unit.kind.is_structure() || !grid.contains(unit.tile) {
                continue;
            }
            sources.extend_from_slice(grid.within(unit.tile, HEAL_REACH));
        }
        self.engine.ripple(
            RippleTarget::Single(&mut self.fields[Role::Healer.index()]),
            grid,
            occupancy,
            &sources,
            HEAL_STRENGTH,
            Some(Role::Healer),
            quota,
            None,
        );
    }

    fn build_melee(
        &mut self,
        grid: &mut GridIndex,
        occupancy: &OccupancyGrid,
        inputs: &FieldInputs<'_>,
        quota: usize,
    ) {
        if inputs.hostiles.is_empty() {
            self.ripple_frontier(Role::Melee, grid, occupancy, inputs, quota);
            return;
        }
        let sources: Vec<TileCoord> = inputs
            .hostiles
            .iter()
            .map(|hostile| hostile.tile)
            .collect();
        self.engine.ripple(
            RippleTarget::Single(&mut self.fields[Role::Melee.index()]),
            grid,
            occupancy,
            &sources,
            ENGAGE_STRENGTH,
            Some(Role::Melee),
            quota,
            None,
        );
    }

    fn ripple_frontier(
        &mut self,
        role: Role,
        grid: &GridIndex,
        occupancy: &OccupancyGrid,
        inputs: &FieldInputs<'_>,
        quota: usize,
    ) {
        self.engine.ripple(
            RippleTarget::Single(&mut self.fields[role.index()]),
            grid,
            occupancy,
            inputs.frontier,
            FRONTIER_STRENGTH,
            Some(role),
            quota,
            None,
        );
    }
}
