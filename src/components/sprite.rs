use bevy_ecs::prelude::Component;

use crate::resources::spectatortextures::TextureId;

/// Billboard sprite: a textured plane of `width` × `height` world units.
/// `texture` indexes the texture store and may be swapped at runtime; the
/// remaining fields are material flags for the renderer.
#[derive(Component, Clone, Debug)]
pub struct Sprite {
    pub texture: TextureId,
    pub width: f32,
    pub height: f32,
    pub transparent: bool,
    pub double_sided: bool,
    pub depth_write: bool,
    pub alpha_test: f32,
}

impl Sprite {
    /// Cut-out sprite as used for spectators: transparent, visible from both
    /// sides, no depth write, alpha test at 0.5.
    pub fn cutout(texture: TextureId, width: f32, height: f32) -> Self {
        Self {
            texture,
            width,
            height,
            transparent: true,
            double_sided: true,
            depth_write: false,
            alpha_test: 0.5,
        }
    }
}
