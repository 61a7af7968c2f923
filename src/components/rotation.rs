use bevy_ecs::prelude::Component;

/// Euler rotation in degrees. Pitch turns ground planes flat, yaw turns
/// billboards towards the track.
#[derive(Component, Clone, Debug, Copy, Default)]
pub struct Rotation {
    pub pitch_degrees: f32,
    pub yaw_degrees: f32,
}

impl Rotation {
    pub fn yaw(degrees: f32) -> Self {
        Self {
            pitch_degrees: 0.0,
            yaw_degrees: degrees,
        }
    }

    /// Plane lying on the ground.
    pub fn flat() -> Self {
        Self {
            pitch_degrees: -90.0,
            yaw_degrees: 0.0,
        }
    }
}
