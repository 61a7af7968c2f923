//! Spectator actor component and the visual variant keys it is drawn with.
//!
//! Every spectator in the crowd is an entity with a [`Spectator`] component.
//! The component stores the immutable visual identity (shirt colour and hair
//! style), the mutable arm pose, and the per-actor animation parameters that
//! the [`animate_crowd`](crate::systems::crowd::animate_crowd) system reads
//! each time the actor falls inside the update window.
//!
//! # Variant keys
//!
//! A [`SpectatorKey`] is the `(shirt, hair, arm pose)` triple that identifies a
//! pre-rendered texture in
//! [`SpectatorTextures`](crate::resources::spectatortextures::SpectatorTextures).
//! There are `10 × 10 × 2 = 200` distinct keys.
//!
//! # Related
//!
//! - [`crate::systems::crowd`] – layout, generation and animation
//! - [`crate::resources::crowd::CrowdRegistry`] – ordered list of live actors

use bevy_ecs::prelude::Component;
use std::fmt;

/// Number of shirt colours in the palette.
pub const SHIRT_COLOR_COUNT: usize = 10;
/// Number of hair styles.
pub const HAIR_STYLE_COUNT: usize = 10;

const SHIRT_PALETTE: [[u8; 3]; SHIRT_COLOR_COUNT] = [
    [0xff, 0x6b, 0x6b],
    [0x4e, 0xcd, 0xc4],
    [0xff, 0xe6, 0x6d],
    [0x95, 0xe1, 0xd3],
    [0xf3, 0x81, 0x81],
    [0xaa, 0x96, 0xda],
    [0xfc, 0xba, 0xd3],
    [0xa8, 0xd8, 0xea],
    [0xff, 0x9f, 0x43],
    [0x6a, 0x89, 0xcc],
];

/// Index into the fixed shirt palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShirtColor(u8);

impl ShirtColor {
    /// Every colour of the palette, in palette order.
    pub const ALL: [ShirtColor; SHIRT_COLOR_COUNT] = [
        ShirtColor(0),
        ShirtColor(1),
        ShirtColor(2),
        ShirtColor(3),
        ShirtColor(4),
        ShirtColor(5),
        ShirtColor(6),
        ShirtColor(7),
        ShirtColor(8),
        ShirtColor(9),
    ];

    /// Palette entry by index, `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn rgb(self) -> [u8; 3] {
        SHIRT_PALETTE[self.index()]
    }

    /// CSS-style hex name, e.g. `ff6b6b`. Used for texture file names and logs.
    pub fn hex(self) -> String {
        let [r, g, b] = self.rgb();
        format!("{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Hair style drawn on top of the shared head silhouette.
///
/// Styles 5 to 9 share the mohawk shape and differ only in colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HairStyle {
    Short,
    Long,
    BaldBeard,
    Cap,
    Spiked,
    MohawkPink,
    MohawkGreen,
    MohawkBlue,
    MohawkYellow,
    MohawkPurple,
}

impl HairStyle {
    pub const ALL: [HairStyle; HAIR_STYLE_COUNT] = [
        HairStyle::Short,
        HairStyle::Long,
        HairStyle::BaldBeard,
        HairStyle::Cap,
        HairStyle::Spiked,
        HairStyle::MohawkPink,
        HairStyle::MohawkGreen,
        HairStyle::MohawkBlue,
        HairStyle::MohawkYellow,
        HairStyle::MohawkPurple,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Mohawk colour slot (0..5) for mohawk styles.
    pub fn mohawk_slot(self) -> Option<usize> {
        match self {
            HairStyle::MohawkPink
            | HairStyle::MohawkGreen
            | HairStyle::MohawkBlue
            | HairStyle::MohawkYellow
            | HairStyle::MohawkPurple => Some(self.index() - HairStyle::MohawkPink.index()),
            _ => None,
        }
    }
}

/// Arm pose of a spectator. Toggled stochastically while the race is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArmPose {
    Down,
    Up,
}

impl ArmPose {
    pub fn from_raised(raised: bool) -> Self {
        if raised { ArmPose::Up } else { ArmPose::Down }
    }

    pub fn is_up(self) -> bool {
        matches!(self, ArmPose::Up)
    }

    pub fn toggled(self) -> Self {
        match self {
            ArmPose::Down => ArmPose::Up,
            ArmPose::Up => ArmPose::Down,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArmPose::Down => "down",
            ArmPose::Up => "up",
        }
    }
}

/// Texture variant key: one rendered image per distinct triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpectatorKey {
    pub shirt: ShirtColor,
    pub hair: HairStyle,
    pub pose: ArmPose,
}

impl SpectatorKey {
    pub fn new(shirt: ShirtColor, hair: HairStyle, pose: ArmPose) -> Self {
        Self { shirt, hair, pose }
    }

    /// Same shirt and hair, other arm pose.
    pub fn with_pose(self, pose: ArmPose) -> Self {
        Self { pose, ..self }
    }
}

impl fmt::Display for SpectatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.shirt.hex(),
            self.pose.label(),
            self.hair.index()
        )
    }
}

/// Which side of the track an actor stands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackSide {
    Left,
    Right,
}

impl TrackSide {
    pub const BOTH: [TrackSide; 2] = [TrackSide::Left, TrackSide::Right];

    /// Lateral sign: -1 for the left stand, +1 for the right stand.
    pub fn sign(self) -> f32 {
        match self {
            TrackSide::Left => -1.0,
            TrackSide::Right => 1.0,
        }
    }

    /// Yaw in degrees that turns the sprite plane towards the track centre.
    pub fn facing_degrees(self) -> f32 {
        match self {
            TrackSide::Left => 90.0,
            TrackSide::Right => -90.0,
        }
    }
}

/// One spectator actor.
///
/// `shirt` and `hair` never change after spawn. `pose` flips now and then.
/// `phase`, `speed` and `amplitude` are randomised once so neighbouring actors
/// bounce out of step.
#[derive(Component, Clone, Copy, Debug)]
pub struct Spectator {
    pub shirt: ShirtColor,
    pub hair: HairStyle,
    pub pose: ArmPose,
    pub side: TrackSide,
    /// Resting height; the actor only ever rises above it.
    pub base_height: f32,
    /// Phase offset in radians, `[0, 2π)`.
    pub phase: f32,
    /// Angular speed multiplier, `[2, 4)`.
    pub speed: f32,
    /// Bounce amplitude in world units, `[1, 2.5)`.
    pub amplitude: f32,
    /// Frame counter of the last animation visit, if any.
    pub last_visit: Option<u64>,
}

impl Spectator {
    /// Current texture key of this actor.
    pub fn key(&self) -> SpectatorKey {
        SpectatorKey::new(self.shirt, self.hair, self.pose)
    }

    /// Sinusoidal bounce at `clock` seconds, before flooring.
    pub fn bounce(&self, clock: f32) -> f32 {
        (clock * self.speed + self.phase).sin() * self.amplitude
    }

    /// Height at `clock` seconds. Never below `base_height`.
    pub fn height_at(&self, clock: f32) -> f32 {
        self.base_height + self.bounce(clock).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> Spectator {
        Spectator {
            shirt: ShirtColor::ALL[3],
            hair: HairStyle::Cap,
            pose: ArmPose::Down,
            side: TrackSide::Left,
            base_height: 16.0,
            phase: 0.0,
            speed: 2.0,
            amplitude: 2.0,
            last_visit: None,
        }
    }

    #[test]
    fn height_never_dips_below_base() {
        let s = actor();
        for step in 0..400 {
            let clock = step as f32 * 0.037;
            assert!(s.height_at(clock) >= s.base_height);
        }
    }

    #[test]
    fn height_peaks_at_amplitude() {
        let s = actor();
        // sin(2 * pi/4) = 1
        let h = s.height_at(std::f32::consts::FRAC_PI_4);
        assert!((h - 18.0).abs() < 1e-4);
    }

    #[test]
    fn mohawk_slots_cover_the_last_five_styles() {
        let slots: Vec<_> = HairStyle::ALL.iter().filter_map(|h| h.mohawk_slot()).collect();
        assert_eq!(slots, vec![0, 1, 2, 3, 4]);
        assert_eq!(HairStyle::Spiked.mohawk_slot(), None);
    }

    #[test]
    fn key_display_matches_texture_file_stem() {
        let key = SpectatorKey::new(ShirtColor::ALL[0], HairStyle::Long, ArmPose::Up);
        assert_eq!(key.to_string(), "ff6b6b_up_1");
        assert_eq!(key.with_pose(ArmPose::Down).to_string(), "ff6b6b_down_1");
    }

    #[test]
    fn pose_toggle_round_trips() {
        assert_eq!(ArmPose::Up.toggled(), ArmPose::Down);
        assert_eq!(ArmPose::Down.toggled().toggled(), ArmPose::Down);
        assert!(ArmPose::from_raised(true).is_up());
    }

    #[test]
    fn facing_turns_towards_the_track() {
        assert_eq!(TrackSide::Left.facing_degrees(), 90.0);
        assert_eq!(TrackSide::Right.facing_degrees(), -90.0);
        assert_eq!(TrackSide::Left.sign(), -1.0);
    }
}
