//! Drifting cloud layer.
//!
//! [`spawn_clouds`] scatters 30 clouds above the course; [`cloud_drift`]
//! moves them along +x every frame and wraps them back to the far side.

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::debug;
use smallvec::SmallVec;

use crate::components::cloud::{Cloud, Puff};
use crate::components::group::CLOUD_GROUP;
use crate::components::mapposition::MapPosition;
use crate::resources::crowd::CrowdRng;
use crate::systems::track::despawn_group;

pub const CLOUD_COUNT: usize = 30;
/// Clouds past this x reappear at `-CLOUD_WRAP_X`.
pub const CLOUD_WRAP_X: f32 = 1_200.0;

/// Scatter [`CLOUD_COUNT`] clouds using the shared random source.
pub fn spawn_clouds(world: &mut World) -> usize {
    despawn_group(world, CLOUD_GROUP);
    let clouds: Vec<(Cloud, MapPosition)> = {
        let mut rng = world.get_resource_or_insert_with(CrowdRng::default);
        (0..CLOUD_COUNT)
            .map(|_| {
                let puff_count = 3 + rng.index(4);
                let puffs: SmallVec<[Puff; 6]> = (0..puff_count)
                    .map(|j| {
                        let radius = rng.range(20.0, 50.0);
                        let offset = Vec3::new(
                            j as f32 * 25.0 - puff_count as f32 * 12.0,
                            rng.range(-5.0, 5.0),
                            rng.range(-7.0, 8.0),
                        );
                        Puff { offset, radius }
                    })
                    .collect();
                let pos = MapPosition::new(
                    rng.range(-1_000.0, 1_000.0),
                    rng.range(150.0, 350.0),
                    rng.range(-4_500.0, 0.0),
                );
                let speed = rng.range(0.1, 0.3);
                (Cloud { speed, puffs }, pos)
            })
            .collect()
    };
    for (cloud, pos) in clouds {
        world.spawn((cloud, pos, CLOUD_GROUP));
    }
    debug!("spawned {} clouds", CLOUD_COUNT);
    CLOUD_COUNT
}

/// Advance every cloud by its per-frame speed, wrapping at the edge.
pub fn cloud_drift(mut query: Query<(&mut MapPosition, &Cloud)>) {
    for (mut position, cloud) in query.iter_mut() {
        position.pos.x += cloud.speed;
        if position.pos.x > CLOUD_WRAP_X {
            position.pos.x = -CLOUD_WRAP_X;
        }
    }
}
