//! Track dimensions shared by the scene builders and the crowd layout.
//!
//! The track is `lanes × 30` units wide, centred on `x = 0` and running from
//! the start line at `z = 0` towards negative `z`. The lane count is clamped
//! to `[8, 20]`. The finish line sits at `z = -3500` unless a reverse event
//! moved it.

use bevy_ecs::prelude::Resource;

pub const LANE_WIDTH: f32 = 30.0;
pub const MIN_LANES: u32 = 8;
pub const MAX_LANES: u32 = 20;
pub const ORIGINAL_FINISH_Z: f32 = -3500.0;
/// Gap between the track edge and the ad boards; the stands start beyond it.
pub const AD_BOARD_OFFSET: f32 = 30.0;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct TrackLayout {
    lanes: u32,
    finish_line_z: f32,
}

impl Default for TrackLayout {
    fn default() -> Self {
        Self {
            lanes: MIN_LANES,
            finish_line_z: ORIGINAL_FINISH_Z,
        }
    }
}

impl TrackLayout {
    pub fn with_lanes(lanes: u32) -> Self {
        let mut layout = Self::default();
        layout.set_lanes(lanes);
        layout
    }

    /// Set the lane count, clamped to `[MIN_LANES, MAX_LANES]`. Returns the
    /// applied value.
    pub fn set_lanes(&mut self, lanes: u32) -> u32 {
        self.lanes = lanes.clamp(MIN_LANES, MAX_LANES);
        self.lanes
    }

    pub fn lanes(&self) -> u32 {
        self.lanes
    }

    pub fn width(&self) -> f32 {
        self.lanes as f32 * LANE_WIDTH
    }

    pub fn half_width(&self) -> f32 {
        self.width() / 2.0
    }

    pub fn finish_line_z(&self) -> f32 {
        self.finish_line_z
    }

    pub fn set_finish_line_z(&mut self, z: f32) {
        self.finish_line_z = z;
    }

    /// `true` once the finish line has been moved away from its original spot.
    pub fn is_reversed(&self) -> bool {
        self.finish_line_z != ORIGINAL_FINISH_Z
    }

    /// Put the finish line back at its original position.
    pub fn reset(&mut self) {
        self.finish_line_z = ORIGINAL_FINISH_Z;
    }
}

/// Vertical background gradient, top (`0.0`) to horizon (`1.0`).
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SkyGradient {
    pub stops: Vec<(f32, u32)>,
}

impl Default for SkyGradient {
    fn default() -> Self {
        Self {
            stops: vec![
                (0.0, 0x1e3c72),
                (0.3, 0x2a5298),
                (0.6, 0x87ceeb),
                (1.0, 0xb0e0e6),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_are_clamped() {
        let mut layout = TrackLayout::default();
        assert_eq!(layout.set_lanes(2), MIN_LANES);
        assert_eq!(layout.set_lanes(99), MAX_LANES);
        assert_eq!(layout.width(), 600.0);
    }

    #[test]
    fn default_track_is_eight_lanes_wide() {
        let layout = TrackLayout::default();
        assert_eq!(layout.width(), 240.0);
        assert_eq!(layout.finish_line_z(), ORIGINAL_FINISH_Z);
    }

    #[test]
    fn reset_restores_finish_line() {
        let mut layout = TrackLayout::with_lanes(10);
        layout.set_finish_line_z(0.0);
        assert!(layout.is_reversed());
        layout.reset();
        assert!(!layout.is_reversed());
        assert_eq!(layout.lanes(), 10);
    }
}
