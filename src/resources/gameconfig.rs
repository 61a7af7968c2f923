//! Game configuration resource.
//!
//! Manages settings loaded from an INI configuration file. Provides defaults
//! for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [track]
//! lanes = 8
//!
//! [crowd]
//! rows = 3
//! spacing = 35
//! start_z = 200
//! end_z = -4200
//! skip_probability = 0.3
//! jitter = 2.5
//! window_size = 100
//! toggle_probability = 0.01
//! scale_toggle_with_crowd = false
//!
//! [audio]
//! enabled = true
//! sample_rate = 44100
//! hoof_cooldown_ms = 80
//!
//! [host]
//! target_fps = 60
//! frames = 600
//! seed = 7
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::resources::crowd::CrowdConfig;
use crate::resources::track::MIN_LANES;

const DEFAULT_SAMPLE_RATE: u32 = 44_100;
const DEFAULT_HOOF_COOLDOWN_MS: u64 = 80;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_FRAMES: u64 = 600;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Game configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Requested lane count (clamped by the track).
    pub lanes: u32,
    /// Crowd grid and animation parameters.
    pub crowd: CrowdConfig,
    pub audio_enabled: bool,
    pub sample_rate: u32,
    /// Minimum gap between two hoof sounds.
    pub hoof_cooldown_ms: u64,
    /// Fixed simulation rate of the host loop.
    pub target_fps: u32,
    /// Frames simulated by the headless host.
    pub frames: u64,
    /// Seed for the crowd random source; entropy when absent.
    pub seed: Option<u64>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            lanes: MIN_LANES,
            crowd: CrowdConfig::default(),
            audio_enabled: true,
            sample_rate: DEFAULT_SAMPLE_RATE,
            hoof_cooldown_ms: DEFAULT_HOOF_COOLDOWN_MS,
            target_fps: DEFAULT_TARGET_FPS,
            frames: DEFAULT_FRAMES,
            seed: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);

        info!(
            "Loaded config: lanes={}, crowd rows={} window={}, audio={} @{}Hz, fps={}, frames={}, seed={:?}",
            self.lanes,
            self.crowd.rows,
            self.crowd.window_size,
            self.audio_enabled,
            self.sample_rate,
            self.target_fps,
            self.frames,
            self.seed
        );

        Ok(())
    }

    /// Parse configuration from INI text. Used by tests and embedded defaults.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        let float = |section: &str, key: &str| config.getfloat(section, key).ok().flatten();
        let uint = |section: &str, key: &str| config.getuint(section, key).ok().flatten();
        let boolean = |section: &str, key: &str| config.getbool(section, key).ok().flatten();

        // [track] section
        if let Some(lanes) = uint("track", "lanes") {
            self.lanes = lanes as u32;
        }

        // [crowd] section
        let crowd = &mut self.crowd;
        if let Some(rows) = uint("crowd", "rows") {
            crowd.rows = rows as u32;
        }
        if let Some(v) = float("crowd", "spacing") {
            crowd.spacing = v as f32;
        }
        if let Some(v) = float("crowd", "start_z") {
            crowd.start_z = v as f32;
        }
        if let Some(v) = float("crowd", "end_z") {
            crowd.end_z = v as f32;
        }
        if let Some(v) = float("crowd", "row_step") {
            crowd.row_step = v as f32;
        }
        if let Some(v) = float("crowd", "skip_probability") {
            crowd.skip_probability = v as f32;
        }
        if let Some(v) = float("crowd", "jitter") {
            crowd.jitter = v as f32;
        }
        if let Some(v) = uint("crowd", "window_size") {
            crowd.window_size = v as usize;
        }
        if let Some(v) = float("crowd", "toggle_probability") {
            crowd.toggle_probability = v as f32;
        }
        if let Some(v) = boolean("crowd", "scale_toggle_with_crowd") {
            crowd.scale_toggle_with_crowd = v;
        }

        // [audio] section
        if let Some(v) = boolean("audio", "enabled") {
            self.audio_enabled = v;
        }
        if let Some(v) = uint("audio", "sample_rate") {
            self.sample_rate = v as u32;
        }
        if let Some(v) = uint("audio", "hoof_cooldown_ms") {
            self.hoof_cooldown_ms = v;
        }

        // [host] section
        if let Some(v) = uint("host", "target_fps") {
            self.target_fps = (v as u32).max(1);
        }
        if let Some(v) = uint("host", "frames") {
            self.frames = v;
        }
        if let Some(v) = uint("host", "seed") {
            self.seed = Some(v);
        }
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();
        let crowd = &self.crowd;

        config.set("track", "lanes", Some(self.lanes.to_string()));

        config.set("crowd", "rows", Some(crowd.rows.to_string()));
        config.set("crowd", "spacing", Some(crowd.spacing.to_string()));
        config.set("crowd", "start_z", Some(crowd.start_z.to_string()));
        config.set("crowd", "end_z", Some(crowd.end_z.to_string()));
        config.set("crowd", "row_step", Some(crowd.row_step.to_string()));
        config.set("crowd", "skip_probability", Some(crowd.skip_probability.to_string()));
        config.set("crowd", "jitter", Some(crowd.jitter.to_string()));
        config.set("crowd", "window_size", Some(crowd.window_size.to_string()));
        config.set("crowd", "toggle_probability", Some(crowd.toggle_probability.to_string()));
        config.set(
            "crowd",
            "scale_toggle_with_crowd",
            Some(crowd.scale_toggle_with_crowd.to_string()),
        );

        config.set("audio", "enabled", Some(self.audio_enabled.to_string()));
        config.set("audio", "sample_rate", Some(self.sample_rate.to_string()));
        config.set("audio", "hoof_cooldown_ms", Some(self.hoof_cooldown_ms.to_string()));

        config.set("host", "target_fps", Some(self.target_fps.to_string()));
        config.set("host", "frames", Some(self.frames.to_string()));
        if let Some(seed) = self.seed {
            config.set("host", "seed", Some(seed.to_string()));
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Fixed frame delta of the host loop, in seconds.
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_stands() {
        let config = GameConfig::new();
        assert_eq!(config.lanes, 8);
        assert_eq!(config.crowd, CrowdConfig::default());
        assert_eq!(config.hoof_cooldown_ms, 80);
        assert!(config.seed.is_none());
    }

    #[test]
    fn ini_overrides_only_present_keys() {
        let mut config = GameConfig::new();
        config
            .load_from_str(
                "[track]\nlanes = 12\n\n[crowd]\nwindow_size = 50\ntoggle_probability = 0\n\n[host]\nseed = 99\n",
            )
            .unwrap();
        assert_eq!(config.lanes, 12);
        assert_eq!(config.crowd.window_size, 50);
        assert_eq!(config.crowd.toggle_probability, 0.0);
        assert_eq!(config.crowd.rows, 3);
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn unparsable_values_keep_defaults() {
        let mut config = GameConfig::new();
        config.load_from_str("[crowd]\nspacing = wide\n").unwrap();
        assert_eq!(config.crowd.spacing, 35.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut config = GameConfig::with_path("/nonexistent/trackside.ini");
        assert!(config.load_from_file().is_err());
    }

    #[test]
    fn saved_file_loads_back() {
        let path = std::env::temp_dir().join(format!("trackside-{}.ini", std::process::id()));
        let mut saved = GameConfig::with_path(&path);
        saved.lanes = 14;
        saved.seed = Some(3);
        saved.crowd.scale_toggle_with_crowd = true;
        saved.save_to_file().unwrap();

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.lanes, 14);
        assert_eq!(loaded.seed, Some(3));
        assert_eq!(loaded.crowd, saved.crowd);
    }

    #[test]
    fn frame_delta_follows_target_fps() {
        let config = GameConfig {
            target_fps: 50,
            ..GameConfig::new()
        };
        assert!((config.frame_delta() - 0.02).abs() < 1e-6);
    }
}
