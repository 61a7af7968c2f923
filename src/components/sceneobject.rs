//! Static scene-graph objects built by the track builders.
//!
//! These components describe *what* exists in the scene (shape, size,
//! colour, labels) without tying it to a rendering API. A renderer maps
//! [`SceneMesh`] to its own geometry and material types.

use bevy_ecs::prelude::Component;

/// Geometry of a scene object, in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeshShape {
    Plane { width: f32, height: f32 },
    Box { width: f32, height: f32, depth: f32 },
}

/// Surface description. `lit` selects a shaded material over a flat one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: u32,
    pub lit: bool,
    pub emissive: Option<(u32, f32)>,
}

impl Material {
    pub const fn flat(color: u32) -> Self {
        Self {
            color,
            lit: false,
            emissive: None,
        }
    }

    pub const fn lit(color: u32) -> Self {
        Self {
            color,
            lit: true,
            emissive: None,
        }
    }

    pub const fn glowing(color: u32, intensity: f32) -> Self {
        Self {
            color,
            lit: true,
            emissive: Some((color, intensity)),
        }
    }
}

#[derive(Component, Clone, Copy, Debug)]
pub struct SceneMesh {
    pub shape: MeshShape,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl SceneMesh {
    pub fn new(shape: MeshShape, material: Material) -> Self {
        Self {
            shape,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    pub fn receiving_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }
}

/// Text painted onto the face of a mesh (distance markers, signs).
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub foreground: u32,
    pub background: u32,
}

/// Two-colour checkerboard texture repeated along the mesh width.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Checkerboard {
    pub columns: u32,
    pub rows: u32,
    pub repeat_x: f32,
}
