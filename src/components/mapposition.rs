use bevy_ecs::prelude::Component;
use glam::Vec3;

/// World-space position. `y` is up, the track runs along `-z`.
#[derive(Component, Clone, Copy, Debug)]
pub struct MapPosition {
    pub pos: Vec3,
}

impl MapPosition {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            pos: Vec3::new(x, y, z),
        }
    }
}
