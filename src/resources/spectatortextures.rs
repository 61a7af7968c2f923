//! Pre-rendered spectator textures keyed by [`SpectatorKey`].
//!
//! The crowd never paints a texture while animating. Every variant an actor
//! can take is rendered once by [`SpectatorTextures::build`] when the crowd is
//! (re)generated, and actors hold a [`TextureId`] into this store. Swapping an
//! actor's arm pose is a lookup, not a repaint.
//!
//! Painting is a pure function of the key: the same key always yields the same
//! pixels, and no randomness is involved. The hair style only selects which
//! drawing branch runs.
//!
//! # Related
//!
//! - [`crate::canvas::Canvas`] – the pixmap painter
//! - [`crate::systems::crowd::generate_crowd`] – builds this store
//! - [`crate::components::sprite::Sprite`] – holds the `TextureId`

use bevy_ecs::prelude::Resource;
use glam::Vec2;
use log::{debug, error, info};
use rustc_hash::FxHashMap;
use std::f32::consts::PI;
use std::path::Path;
use tiny_skia::Pixmap;

use crate::canvas::{Canvas, rgb, to_rgba_image};
use crate::components::spectator::{ArmPose, HairStyle, ShirtColor, SpectatorKey};
use crate::resources::crowd::CrowdError;

/// Texture width in pixels.
pub const TEXTURE_WIDTH: u32 = 64;
/// Texture height in pixels.
pub const TEXTURE_HEIGHT: u32 = 96;

const CENTER_X: f32 = 32.0;
const SKIN: u32 = 0xffdbac;
const EYES: u32 = 0x333333;
const MOUTH: u32 = 0xcc4444;
const TROUSERS: u32 = 0x2c3e50;
const SHOES: u32 = 0x1a1a1a;
const CAP: u32 = 0xe74c3c;
const HAIR_COLORS: [u32; 5] = [0x4a3728, 0x1a1a1a, 0x8b4513, 0xdaa520, 0xa0522d];
const MOHAWK_COLORS: [u32; 5] = [0xff1493, 0x00ff00, 0x00bfff, 0xffd700, 0x9932cc];

/// Handle to one surface in [`SpectatorTextures`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(u16);

impl TextureId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Texture cache for one crowd generation.
///
/// Owned by the world for as long as the crowd it was built for is alive;
/// replaced wholesale on regeneration.
#[derive(Resource, Debug, Default)]
pub struct SpectatorTextures {
    surfaces: Vec<Pixmap>,
    keys: Vec<SpectatorKey>,
    index: FxHashMap<SpectatorKey, TextureId>,
}

impl SpectatorTextures {
    /// Render every variant of the full palette: 10 colours × 10 styles × 2 poses.
    pub fn build() -> Self {
        Self::build_for(&ShirtColor::ALL, &HairStyle::ALL)
    }

    /// Render every variant for the given colours and styles, both poses each.
    ///
    /// Duplicate inputs are rendered once.
    pub fn build_for(shirts: &[ShirtColor], hairs: &[HairStyle]) -> Self {
        let mut store = Self::default();
        for &shirt in shirts {
            for &hair in hairs {
                for pose in [ArmPose::Up, ArmPose::Down] {
                    store.insert(SpectatorKey::new(shirt, hair, pose));
                }
            }
        }
        info!("Spectator textures built: {} variants", store.len());
        store
    }

    fn insert(&mut self, key: SpectatorKey) {
        if self.index.contains_key(&key) {
            return;
        }
        // an unpainted variant stays missing and surfaces as a CacheMiss
        let Some(surface) = paint_spectator(key) else {
            error!("Failed to allocate spectator surface for {}", key);
            return;
        };
        let id = TextureId(self.surfaces.len() as u16);
        self.surfaces.push(surface);
        self.keys.push(key);
        self.index.insert(key, id);
    }

    /// Look up the texture for `key`.
    ///
    /// A missing key means the layout and the cache disagree about the
    /// palette, which is reported as [`CrowdError::CacheMiss`].
    pub fn resolve(&self, key: SpectatorKey) -> Result<TextureId, CrowdError> {
        self.index
            .get(&key)
            .copied()
            .ok_or(CrowdError::CacheMiss { key })
    }

    pub fn contains(&self, key: SpectatorKey) -> bool {
        self.index.contains_key(&key)
    }

    pub fn surface(&self, id: TextureId) -> Option<&Pixmap> {
        self.surfaces.get(id.index())
    }

    pub fn key_of(&self, id: TextureId) -> Option<SpectatorKey> {
        self.keys.get(id.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Iterate `(key, surface)` pairs in build order.
    pub fn iter(&self) -> impl Iterator<Item = (SpectatorKey, &Pixmap)> {
        self.keys.iter().copied().zip(self.surfaces.iter())
    }

    /// Write every surface as `<dir>/<key>.png`.
    pub fn export_png(&self, dir: &Path) -> Result<usize, String> {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
        for (key, surface) in self.iter() {
            let path = dir.join(format!("{}.png", key));
            to_rgba_image(surface)
                .ok_or_else(|| format!("Surface for {} has no pixel data", key))?
                .save(&path)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            debug!("Wrote spectator texture {}", path.display());
        }
        info!("Exported {} spectator textures to {}", self.len(), dir.display());
        Ok(self.len())
    }
}

/// Paint one spectator variant.
pub fn paint_spectator(key: SpectatorKey) -> Option<Pixmap> {
    let mut c = Canvas::new(TEXTURE_WIDTH, TEXTURE_HEIGHT)?;
    let shirt = {
        let [r, g, b] = key.shirt.rgb();
        rgb(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    };

    // head
    c.set_fill(rgb(SKIN));
    c.fill_circle(CENTER_X, 18.0, 12.0);

    paint_hair(&mut c, key.hair);

    // eyes
    c.set_fill(rgb(EYES));
    c.fill_circle(CENTER_X - 4.0, 18.0, 2.0);
    c.fill_circle(CENTER_X + 4.0, 18.0, 2.0);

    // smile
    c.set_fill(rgb(MOUTH));
    c.stroke_arc(CENTER_X, 22.0, 4.0, 0.1 * PI, 0.9 * PI, 2.0);

    // torso
    c.set_fill(shirt);
    c.fill_polygon(&[
        Vec2::new(CENTER_X - 12.0, 30.0),
        Vec2::new(CENTER_X + 12.0, 30.0),
        Vec2::new(CENTER_X + 10.0, 58.0),
        Vec2::new(CENTER_X - 10.0, 58.0),
    ]);

    // arms and hands
    let (reach, wrist_y, hand_y) = match key.pose {
        ArmPose::Up => (20.0, 18.0, 14.0),
        ArmPose::Down => (18.0, 50.0, 52.0),
    };
    for sign in [-1.0, 1.0] {
        c.stroke_line(
            Vec2::new(CENTER_X + sign * 12.0, 34.0),
            Vec2::new(CENTER_X + sign * reach, wrist_y),
            8.0,
        );
    }
    c.set_fill(rgb(SKIN));
    for sign in [-1.0, 1.0] {
        c.fill_circle(CENTER_X + sign * reach, hand_y, 5.0);
    }

    // legs
    c.set_fill(rgb(TROUSERS));
    c.fill_rect(CENTER_X - 8.0, 58.0, 6.0, 24.0);
    c.fill_rect(CENTER_X + 2.0, 58.0, 6.0, 24.0);

    // shoes
    c.set_fill(rgb(SHOES));
    c.fill_rect(CENTER_X - 9.0, 80.0, 8.0, 6.0);
    c.fill_rect(CENTER_X + 1.0, 80.0, 8.0, 6.0);

    Some(c.into_pixmap())
}

fn paint_hair(c: &mut Canvas, hair: HairStyle) {
    let hair_color = rgb(HAIR_COLORS[hair.index() % HAIR_COLORS.len()]);
    c.set_fill(hair_color);
    match hair {
        HairStyle::Short => {
            c.fill_upper_half_disc(CENTER_X, 14.0, 11.0);
        }
        HairStyle::Long => {
            c.fill_upper_half_disc(CENTER_X, 14.0, 11.0);
            c.fill_rect(CENTER_X - 12.0, 12.0, 6.0, 20.0);
            c.fill_rect(CENTER_X + 6.0, 12.0, 6.0, 20.0);
        }
        HairStyle::BaldBeard => {
            c.set_fill(rgb(SKIN));
            c.fill_upper_half_disc(CENTER_X, 16.0, 11.0);
            c.set_fill(hair_color);
            c.fill_rect(CENTER_X - 6.0, 24.0, 12.0, 4.0);
        }
        HairStyle::Cap => {
            c.set_fill(rgb(CAP));
            c.fill_rect(CENTER_X - 14.0, 4.0, 28.0, 8.0);
            c.fill_rect(CENTER_X - 8.0, 0.0, 16.0, 8.0);
        }
        HairStyle::Spiked => {
            c.fill_polygon(&[
                Vec2::new(CENTER_X - 10.0, 18.0),
                Vec2::new(CENTER_X - 6.0, 2.0),
                Vec2::new(CENTER_X, 10.0),
                Vec2::new(CENTER_X + 6.0, 0.0),
                Vec2::new(CENTER_X + 10.0, 18.0),
            ]);
        }
        HairStyle::MohawkPink
        | HairStyle::MohawkGreen
        | HairStyle::MohawkBlue
        | HairStyle::MohawkYellow
        | HairStyle::MohawkPurple => {
            let slot = hair.mohawk_slot().unwrap_or(0);
            c.set_fill(rgb(MOHAWK_COLORS[slot]));
            c.fill_polygon(&[
                Vec2::new(CENTER_X - 3.0, 18.0),
                Vec2::new(CENTER_X - 4.0, -2.0),
                Vec2::new(CENTER_X, 4.0),
                Vec2::new(CENTER_X + 4.0, -2.0),
                Vec2::new(CENTER_X + 3.0, 18.0),
            ]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_build_has_two_hundred_variants() {
        let store = SpectatorTextures::build();
        assert_eq!(store.len(), 200);
        for shirt in ShirtColor::ALL {
            for hair in HairStyle::ALL {
                for pose in [ArmPose::Up, ArmPose::Down] {
                    let key = SpectatorKey::new(shirt, hair, pose);
                    let id = store.resolve(key).unwrap();
                    assert_eq!(store.key_of(id), Some(key));
                }
            }
        }
    }

    #[test]
    fn painting_is_deterministic() {
        for hair in HairStyle::ALL {
            let key = SpectatorKey::new(ShirtColor::ALL[4], hair, ArmPose::Up);
            assert_eq!(
                paint_spectator(key).unwrap().data(),
                paint_spectator(key).unwrap().data()
            );
        }
    }

    #[test]
    fn duplicate_inputs_render_once() {
        let shirts = [ShirtColor::ALL[0], ShirtColor::ALL[0]];
        let store = SpectatorTextures::build_for(&shirts, &[HairStyle::Cap]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn pose_changes_hand_placement() {
        let paint = |pose| {
            paint_spectator(SpectatorKey::new(ShirtColor::ALL[0], HairStyle::Short, pose)).unwrap()
        };
        let rgba = |pixmap: &Pixmap, x, y| {
            let p = pixmap.pixel(x, y).unwrap();
            [p.red(), p.green(), p.blue(), p.alpha()]
        };
        let (up, down) = (paint(ArmPose::Up), paint(ArmPose::Down));
        // raised hand at (12, 14), lowered hand at (14, 52)
        assert_eq!(rgba(&up, 12, 14), [0xff, 0xdb, 0xac, 0xff]);
        assert_eq!(rgba(&down, 12, 14)[3], 0);
        assert_eq!(rgba(&down, 14, 52), [0xff, 0xdb, 0xac, 0xff]);
    }

    #[test]
    fn each_hair_style_paints_differently() {
        let images: Vec<_> = HairStyle::ALL
            .iter()
            .map(|&h| paint_spectator(SpectatorKey::new(ShirtColor::ALL[1], h, ArmPose::Down)).unwrap())
            .collect();
        for i in 0..images.len() {
            for j in i + 1..images.len() {
                assert_ne!(
                    images[i].data(),
                    images[j].data(),
                    "styles {} and {} look the same",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn subset_cache_misses_other_keys() {
        let store = SpectatorTextures::build_for(&[ShirtColor::ALL[2]], &[HairStyle::Long]);
        let missing = SpectatorKey::new(ShirtColor::ALL[3], HairStyle::Long, ArmPose::Up);
        assert!(matches!(
            store.resolve(missing),
            Err(CrowdError::CacheMiss { key }) if key == missing
        ));
    }

    #[test]
    fn export_writes_one_png_per_variant() {
        let store = SpectatorTextures::build_for(&[ShirtColor::ALL[5]], &[HairStyle::Spiked]);
        let dir = std::env::temp_dir().join(format!("trackside-textures-{}", std::process::id()));
        assert_eq!(store.export_png(&dir).unwrap(), 2);
        for (key, surface) in store.iter() {
            let saved = image::open(dir.join(format!("{}.png", key))).unwrap().to_rgba8();
            assert_eq!(saved.dimensions(), (TEXTURE_WIDTH, TEXTURE_HEIGHT));
            assert_eq!(saved, to_rgba_image(surface).unwrap());
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
