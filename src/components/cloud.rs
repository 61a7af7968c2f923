use bevy_ecs::prelude::Component;
use glam::Vec3;
use smallvec::SmallVec;

/// One sphere of a cloud, relative to the cloud origin.
#[derive(Clone, Copy, Debug)]
pub struct Puff {
    pub offset: Vec3,
    pub radius: f32,
}

/// A drifting cloud made of a handful of flattened white puffs.
#[derive(Component, Clone, Debug)]
pub struct Cloud {
    /// Drift along +x, world units per frame.
    pub speed: f32,
    pub puffs: SmallVec<[Puff; 6]>,
}
