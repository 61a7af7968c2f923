//! Crowd layout, generation and amortized animation.
//!
//! Host entry points:
//! - [`generate_crowd`] – rebuild the whole crowd for the current track width
//! - [`update_crowd`] – per-frame tick; runs [`animate_crowd`] on a window
//!
//! Lower-level pieces are public so tests and tools can drive them directly:
//! [`plan_crowd_layout`] produces a pure description of the crowd, and
//! [`instantiate_crowd`] turns a plan into entities against whatever texture
//! cache is currently in the world.
//!
//! A generation either completes or leaves the previous crowd untouched.
//! Every texture key of the new plan is resolved before a single old actor is
//! despawned, so only the texture caches ever coexist, never two crowds.

use std::f32::consts::TAU;

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, info, trace, warn};
use serde::Serialize;
use smallvec::SmallVec;

use crate::components::group::SPECTATOR_GROUP;
use crate::components::mapposition::MapPosition;
use crate::components::rotation::Rotation;
use crate::components::spectator::{
    ArmPose, HairStyle, ShirtColor, Spectator, SpectatorKey, TrackSide,
};
use crate::components::sprite::Sprite;
use crate::resources::crowd::{
    CrowdConfig, CrowdError, CrowdRegistry, CrowdRng, CrowdTick, CrowdWindow,
};
use crate::resources::spectatortextures::{SpectatorTextures, TextureId};
use crate::resources::track::TrackLayout;
use crate::resources::worldtime::WorldTime;

/// Height above the stand floor where a sprite centre is placed on spawn.
const SPAWN_LIFT: f32 = 20.0;
/// Height above the stand floor the bounce animation rests on.
const REST_LIFT: f32 = 8.0;

/// One planned actor. Produced by [`plan_crowd_layout`], consumed by
/// [`instantiate_crowd`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectatorSpawn {
    pub key: SpectatorKey,
    pub side: TrackSide,
    pub row: u32,
    pub position: Vec3,
    pub base_height: f32,
    pub phase: f32,
    pub speed: f32,
    pub amplitude: f32,
}

impl SpectatorSpawn {
    fn spectator(&self) -> Spectator {
        Spectator {
            shirt: self.key.shirt,
            hair: self.key.hair,
            pose: self.key.pose,
            side: self.side,
            base_height: self.base_height,
            phase: self.phase,
            speed: self.speed,
            amplitude: self.amplitude,
            last_visit: None,
        }
    }
}

/// Outcome of a successful generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrowdSummary {
    /// Actors registered.
    pub actors: usize,
    /// Candidate grid cells enumerated.
    pub cells: usize,
    /// Texture variants in the cache.
    pub textures: usize,
    pub track_width: f32,
    pub generation: u32,
}

/// Enumerate every `(side, row, z)` cell and decide what stands there.
///
/// Per cell the random source is drawn in a fixed order: skip test, x jitter,
/// z jitter, shirt, arm pose, hair, phase, speed, amplitude. With a seeded
/// [`CrowdRng`] the plan is fully reproducible.
pub fn plan_crowd_layout(
    track_width: f32,
    config: &CrowdConfig,
    rng: &mut CrowdRng,
) -> Result<Vec<SpectatorSpawn>, CrowdError> {
    config.validate(track_width)?;

    let cells = config.cell_count().ok_or_else(|| {
        CrowdError::InvalidConfiguration("crowd grid size overflows".into())
    })?;
    let stand = config.stand_distance(track_width);
    let seats = cells / (2 * config.rows as usize);
    let spawn_y = config.floor_y + SPAWN_LIFT;
    let base_height = config.floor_y + REST_LIFT;

    let expected = (cells as f32 * (1.0 - config.skip_probability)).ceil();
    let mut plan = Vec::with_capacity(expected as usize);

    for side in TrackSide::BOTH {
        for row in 0..config.rows {
            let x = side.sign() * (stand + row as f32 * config.row_step);
            for seat in 0..seats {
                let z = config.start_z - seat as f32 * config.spacing;
                if rng.chance(config.skip_probability) {
                    continue;
                }
                let jitter_x = rng.jitter(config.jitter);
                let jitter_z = rng.jitter(config.jitter);
                let shirt = ShirtColor::ALL[rng.index(ShirtColor::ALL.len())];
                let pose = ArmPose::from_raised(rng.chance(0.5));
                let hair = HairStyle::ALL[rng.index(HairStyle::ALL.len())];

                plan.push(SpectatorSpawn {
                    key: SpectatorKey::new(shirt, hair, pose),
                    side,
                    row,
                    position: Vec3::new(x + jitter_x, spawn_y, z + jitter_z),
                    base_height,
                    phase: rng.range(0.0, TAU),
                    speed: rng.range(2.0, 4.0),
                    amplitude: rng.range(1.0, 2.5),
                });
            }
        }
    }

    debug!(
        "planned {} spectators over {} cells (stand at +/-{})",
        plan.len(),
        cells,
        stand
    );
    Ok(plan)
}

/// Resolve every key of `plan` against `textures`, failing on the first miss.
fn resolve_plan(
    textures: &SpectatorTextures,
    plan: &[SpectatorSpawn],
) -> Result<Vec<TextureId>, CrowdError> {
    plan.iter().map(|spawn| textures.resolve(spawn.key)).collect()
}

/// Spawn already-resolved actors and install them as the live registry.
fn spawn_resolved(
    world: &mut World,
    plan: &[SpectatorSpawn],
    ids: &[TextureId],
    sprite_size: (f32, f32),
) -> usize {
    let (width, height) = sprite_size;
    let actors: Vec<Entity> = plan
        .iter()
        .zip(ids)
        .map(|(spawn, &texture)| {
            world
                .spawn((
                    spawn.spectator(),
                    MapPosition {
                        pos: spawn.position,
                    },
                    Rotation::yaw(spawn.side.facing_degrees()),
                    Sprite::cutout(texture, width, height),
                    SPECTATOR_GROUP,
                ))
                .id()
        })
        .collect();

    let count = actors.len();
    let generation = world
        .get_resource::<CrowdRegistry>()
        .map(|r| r.generation)
        .unwrap_or(0)
        + 1;
    world.insert_resource(CrowdRegistry::new(actors, generation));
    count
}

/// Turn a plan into live actors using the texture cache already in the world.
///
/// Fails with [`CrowdError::CacheMiss`] when the cache is absent or lacks any
/// key of the plan; in that case nothing is despawned, spawned or registered.
/// On success the previous crowd is despawned first and the registry is
/// replaced.
pub fn instantiate_crowd(world: &mut World, plan: &[SpectatorSpawn]) -> Result<usize, CrowdError> {
    let ids = match world.get_resource::<SpectatorTextures>() {
        Some(textures) => resolve_plan(textures, plan)?,
        None => match plan.first() {
            Some(spawn) => return Err(CrowdError::CacheMiss { key: spawn.key }),
            None => Vec::new(),
        },
    };
    let size = sprite_size(world);
    despawn_crowd(world);
    Ok(spawn_resolved(world, plan, &ids, size))
}

/// Despawn every registered actor and empty the registry. Returns how many
/// entities were removed.
pub fn despawn_crowd(world: &mut World) -> usize {
    let Some(mut registry) = world.get_resource_mut::<CrowdRegistry>() else {
        return 0;
    };
    let actors = registry.take();
    let removed = actors
        .into_iter()
        .filter(|entity| world.despawn(*entity))
        .count();
    if removed > 0 {
        debug!("despawned {} spectators", removed);
    }
    removed
}

fn sprite_size(world: &World) -> (f32, f32) {
    world
        .get_resource::<CrowdConfig>()
        .map(|c| (c.sprite_width, c.sprite_height))
        .unwrap_or_else(|| {
            let c = CrowdConfig::default();
            (c.sprite_width, c.sprite_height)
        })
}

/// Rebuild the crowd for the current [`TrackLayout`] width.
///
/// Steps: validate, plan, render a fresh texture cache, resolve every planned
/// key against it, then tear down the old actors and cache and spawn the new
/// set. Any error before the teardown leaves the old crowd live.
pub fn generate_crowd(world: &mut World) -> Result<CrowdSummary, CrowdError> {
    let track_width = world
        .get_resource::<TrackLayout>()
        .map(|t| t.width())
        .ok_or_else(|| CrowdError::InvalidConfiguration("no track layout in world".into()))?;
    let config = world.get_resource::<CrowdConfig>().cloned().unwrap_or_default();

    let plan = {
        let mut rng = world.get_resource_or_insert_with(CrowdRng::default);
        plan_crowd_layout(track_width, &config, &mut rng)?
    };

    let textures = SpectatorTextures::build();
    let ids = resolve_plan(&textures, &plan)?;
    let texture_count = textures.len();

    despawn_crowd(world);
    world.remove_resource::<SpectatorTextures>();
    world.insert_resource(textures);
    let actors = spawn_resolved(
        world,
        &plan,
        &ids,
        (config.sprite_width, config.sprite_height),
    );

    let summary = CrowdSummary {
        actors,
        cells: config.cell_count().unwrap_or_default(),
        textures: texture_count,
        track_width,
        generation: world.resource::<CrowdRegistry>().generation,
    };
    info!(
        "crowd generation {}: {} spectators over {} cells, {} textures, track width {}",
        summary.generation, summary.actors, summary.cells, summary.textures, summary.track_width
    );
    Ok(summary)
}

/// Animate the current window of the registry.
///
/// For every actor in the window the height is set from the shared clock and,
/// with the configured probability, the arm pose flips and the sprite swaps to
/// the matching cached texture. No-op when the tick is inactive or the
/// registry is empty.
pub fn animate_crowd(
    tick: Res<CrowdTick>,
    time: Res<WorldTime>,
    config: Res<CrowdConfig>,
    registry: Res<CrowdRegistry>,
    textures: Option<Res<SpectatorTextures>>,
    mut rng: ResMut<CrowdRng>,
    mut actors: Query<(&mut Spectator, &mut MapPosition, &mut Sprite)>,
) {
    if !tick.active || registry.is_empty() {
        return;
    }

    let window = CrowdWindow::new(tick.frame, registry.len(), config.window_size);
    let batch: SmallVec<[Entity; 128]> = window.indices().filter_map(|i| registry.get(i)).collect();

    let toggle = if config.scale_toggle_with_crowd {
        (config.toggle_probability * window.registry as f32 / window.len as f32).min(1.0)
    } else {
        config.toggle_probability
    };

    let clock = time.elapsed;
    for entity in batch {
        let Ok((mut spectator, mut position, mut sprite)) = actors.get_mut(entity) else {
            continue;
        };
        position.pos.y = spectator.height_at(clock);
        spectator.last_visit = Some(tick.frame);

        if rng.chance(toggle) {
            let next = spectator.key().with_pose(spectator.pose.toggled());
            match textures.as_deref().map(|t| t.resolve(next)) {
                Some(Ok(texture)) => {
                    spectator.pose = next.pose;
                    sprite.texture = texture;
                }
                Some(Err(err)) => warn!("pose flip skipped: {}", err),
                None => warn!("pose flip skipped: no texture cache"),
            }
        }
    }

    trace!(
        "animated window start={} len={} of {} at t={:.3}",
        window.start, window.len, window.registry, clock
    );
}

/// Per-frame host tick: record the tick and animate the current window.
pub fn update_crowd(world: &mut World, is_active: bool, frame_counter: u64) {
    world.insert_resource(CrowdTick {
        active: is_active,
        frame: frame_counter,
    });
    let idle = world
        .get_resource::<CrowdRegistry>()
        .is_none_or(|r| r.is_empty());
    if !is_active || idle {
        return;
    }
    world.init_resource::<CrowdConfig>();
    world.init_resource::<CrowdRng>();
    world.init_resource::<WorldTime>();
    if let Err(err) = world.run_system_cached(animate_crowd) {
        warn!("crowd update failed: {}", err);
    }
}
