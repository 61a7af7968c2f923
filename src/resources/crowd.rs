//! Crowd resources: configuration, the live actor registry, the random source
//! and the per-frame tick.
//!
//! # Lifecycle
//!
//! 1. [`generate_crowd`](crate::systems::crowd::generate_crowd) validates the
//!    [`CrowdConfig`] against the current track width, plans a layout with
//!    [`CrowdRng`], renders a fresh texture cache and swaps a new
//!    [`CrowdRegistry`] in.
//! 2. Every frame the host sets [`CrowdTick`] (or calls
//!    [`update_crowd`](crate::systems::crowd::update_crowd)) and the
//!    [`animate_crowd`](crate::systems::crowd::animate_crowd) system updates a
//!    bounded window of the registry.
//! 3. A regeneration tears the old actors down before the new ones spawn.

use bevy_ecs::prelude::*;
use fastrand::Rng;

use crate::components::spectator::SpectatorKey;
use crate::resources::track::AD_BOARD_OFFSET;

/// Upper bound on the grid cells one layout may enumerate.
pub const MAX_CROWD_CELLS: usize = 100_000;

/// Errors raised while building a crowd.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CrowdError {
    /// A layout asked for a texture variant the cache never rendered.
    #[error("no spectator texture for variant {key}")]
    CacheMiss { key: SpectatorKey },

    /// Track width or grid parameters are outside sane bounds.
    #[error("invalid crowd configuration: {0}")]
    InvalidConfiguration(String),
}

/// Grid and animation parameters of the crowd.
///
/// Defaults reproduce the stock stands: three rows per side, 35 units apart,
/// from z = 200 down to z = -4200, standing 70 units beyond the ad boards.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CrowdConfig {
    /// Rows of spectators per side.
    pub rows: u32,
    /// Longitudinal distance between seats.
    pub spacing: f32,
    /// First seat z (inclusive).
    pub start_z: f32,
    /// Seats continue while `z > end_z`.
    pub end_z: f32,
    /// Gap between the ad boards and the first row.
    pub stand_offset: f32,
    /// Extra lateral distance per row.
    pub row_step: f32,
    /// Height of the stand floor.
    pub floor_y: f32,
    /// Probability that a seat stays empty.
    pub skip_probability: f32,
    /// Half extent of the uniform x/z jitter.
    pub jitter: f32,
    /// Actors animated per frame.
    pub window_size: usize,
    /// Chance that a visited actor flips its arms.
    pub toggle_probability: f32,
    /// Scale the toggle chance by `registry / window` so flips per second
    /// do not depend on crowd size.
    pub scale_toggle_with_crowd: bool,
    pub sprite_width: f32,
    pub sprite_height: f32,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            spacing: 35.0,
            start_z: 200.0,
            end_z: -4200.0,
            stand_offset: 70.0,
            row_step: 12.0,
            floor_y: 8.0,
            skip_probability: 0.3,
            jitter: 2.5,
            window_size: 100,
            toggle_probability: 0.01,
            scale_toggle_with_crowd: false,
            sprite_width: 28.0,
            sprite_height: 42.0,
        }
    }
}

impl CrowdConfig {
    /// Reject parameters no layout can be built from.
    pub fn validate(&self, track_width: f32) -> Result<(), CrowdError> {
        let invalid =
            |msg: String| -> Result<(), CrowdError> { Err(CrowdError::InvalidConfiguration(msg)) };
        if !track_width.is_finite() || track_width < 0.0 {
            return invalid(format!("track width {} must be finite and >= 0", track_width));
        }
        if self.rows == 0 {
            return invalid("rows must be at least 1".into());
        }
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return invalid(format!("spacing {} must be > 0", self.spacing));
        }
        if !(self.start_z.is_finite() && self.end_z.is_finite()) || self.start_z <= self.end_z {
            return invalid(format!(
                "start_z {} must lie beyond end_z {}",
                self.start_z, self.end_z
            ));
        }
        match self.cell_count() {
            Some(cells) if cells <= MAX_CROWD_CELLS => {}
            _ => {
                return invalid(format!(
                    "grid of {} rows over z {}..{} every {} exceeds {} cells",
                    self.rows, self.start_z, self.end_z, self.spacing, MAX_CROWD_CELLS
                ));
            }
        }
        let offsets = [self.stand_offset, self.row_step, self.floor_y];
        if !offsets.iter().all(|v| v.is_finite()) {
            return invalid(format!("stand offsets {:?} must be finite", offsets));
        }
        if !(0.0..=1.0).contains(&self.skip_probability) {
            return invalid(format!("skip probability {} not in [0, 1]", self.skip_probability));
        }
        if !(0.0..=1.0).contains(&self.toggle_probability) {
            return invalid(format!(
                "toggle probability {} not in [0, 1]",
                self.toggle_probability
            ));
        }
        if !(self.jitter.is_finite() && self.jitter >= 0.0) {
            return invalid(format!("jitter {} must be >= 0", self.jitter));
        }
        if self.window_size == 0 {
            return invalid("window size must be at least 1".into());
        }
        if !(self.sprite_width > 0.0 && self.sprite_height > 0.0) {
            return invalid("sprite size must be positive".into());
        }
        Ok(())
    }

    /// Seats per row: `z = start_z, start_z - spacing, …` while `z > end_z`.
    ///
    /// `None` when the count is not finite or exceeds [`MAX_CROWD_CELLS`].
    pub fn seats_per_row(&self) -> Option<usize> {
        let seats = ((self.start_z - self.end_z) / self.spacing).ceil();
        (seats >= 0.0 && seats <= MAX_CROWD_CELLS as f32).then_some(seats as usize)
    }

    /// Candidate cells on both sides, `None` on overflow.
    pub fn cell_count(&self) -> Option<usize> {
        self.seats_per_row()?
            .checked_mul(self.rows as usize)?
            .checked_mul(2)
    }

    /// Lateral distance from the track centre line to the first row.
    pub fn stand_distance(&self, track_width: f32) -> f32 {
        track_width / 2.0 + AD_BOARD_OFFSET + self.stand_offset
    }
}

/// Ordered list of live spectator entities.
///
/// Indices are stable for the lifetime of one crowd, which is what the
/// round-robin window relies on.
#[derive(Resource, Debug, Default, Clone)]
pub struct CrowdRegistry {
    actors: Vec<Entity>,
    /// Number of completed generations.
    pub generation: u32,
}

impl CrowdRegistry {
    pub fn new(actors: Vec<Entity>, generation: u32) -> Self {
        Self { actors, generation }
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Entity> {
        self.actors.get(index).copied()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.actors
    }

    /// Take the actor list out, leaving the registry empty.
    pub fn take(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.actors)
    }
}

/// Random source for layout and pose flips. Seed it for reproducible crowds.
#[derive(Resource, Debug, Clone)]
pub struct CrowdRng(pub Rng);

impl Default for CrowdRng {
    fn default() -> Self {
        Self(Rng::new())
    }
}

impl CrowdRng {
    pub fn with_seed(seed: u64) -> Self {
        Self(Rng::with_seed(seed))
    }

    /// Uniform in `[min, max)`.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.0.f32() * (max - min)
    }

    /// Uniform in `[-half, half)`.
    pub fn jitter(&mut self, half: f32) -> f32 {
        (self.0.f32() - 0.5) * 2.0 * half
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        self.0.f32() < p
    }

    pub fn index(&mut self, len: usize) -> usize {
        self.0.usize(0..len)
    }
}

/// Per-frame animation input: whether the race is running and the frame
/// counter that drives the window rotation.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrowdTick {
    pub active: bool,
    pub frame: u64,
}

/// The slice of the registry animated on one frame.
///
/// Covers `[start, start + len) mod registry` with
/// `len = min(window_size, registry)` and
/// `start = (frame * len) mod registry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrowdWindow {
    pub start: usize,
    pub len: usize,
    pub registry: usize,
}

impl CrowdWindow {
    pub fn new(frame: u64, registry: usize, window_size: usize) -> Self {
        if registry == 0 {
            return Self {
                start: 0,
                len: 0,
                registry: 0,
            };
        }
        let len = window_size.min(registry);
        let start = ((frame as u128 * len as u128) % registry as u128) as usize;
        Self {
            start,
            len,
            registry,
        }
    }

    /// Registry indices covered by this window, wrapping at the end.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).map(move |i| (self.start + i) % self.registry)
    }

    /// Frames needed to visit every actor at least once.
    pub fn cycle_frames(&self) -> usize {
        if self.len == 0 {
            0
        } else {
            self.registry.div_ceil(self.len)
        }
    }
}
