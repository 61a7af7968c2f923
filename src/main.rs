//! Trackside headless host.
//!
//! Builds the trackside scene in a bevy_ecs `World`, generates the crowd and
//! drives it for a fixed number of frames at the configured rate, the way a
//! renderer's frame loop would:
//!
//! 1. Load `config.ini` (or `--config`), apply CLI overrides
//! 2. Insert resources, spawn the audio thread, register observers
//! 3. Build sky, ground, track, lines, billboard, clouds and the crowd
//! 4. Per frame: advance time, run the schedule (clouds, audio bridge),
//!    tick the crowd, queue countdown and hoof sounds
//! 5. Optionally resize the track halfway through (`--relane`)
//! 6. Shut the audio thread down and report a summary
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --lanes 12 --frames 900 --seed 7 --summary-json -
//! cargo run --release -- --dump-textures out/spectators
//! ```

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use clap::Parser;
use log::{error, info, warn};
use serde::Serialize;
use std::path::PathBuf;

use trackside::events::audio::AudioMessage;
use trackside::events::track::{TrackResizedEvent, track_resized_observer};
use trackside::resources::audio::{setup_audio, shutdown_audio};
use trackside::resources::crowd::{CrowdRegistry, CrowdRng};
use trackside::resources::gameconfig::GameConfig;
use trackside::resources::spectatortextures::SpectatorTextures;
use trackside::resources::track::TrackLayout;
use trackside::resources::worldtime::WorldTime;
use trackside::synth::SoundFx;
use trackside::systems::audio::{
    forward_audio_cmds, play_fx, poll_audio_messages, update_bevy_audio_cmds,
    update_bevy_audio_messages,
};
use trackside::systems::clouds::{cloud_drift, spawn_clouds};
use trackside::systems::crowd::{CrowdSummary, generate_crowd, update_crowd};
use trackside::systems::time::update_world_time;
use trackside::systems::track::{rebuild_track_scene, spawn_ground, spawn_sky};

/// Trackside scene and crowd host
#[derive(Parser)]
#[command(version, about = "Builds the trackside scene and drives the spectator crowd headlessly.")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Lane count (clamped to 8..=20).
    #[arg(long)]
    lanes: Option<u32>,

    /// Frames to simulate.
    #[arg(long)]
    frames: Option<u64>,

    /// Seed for the crowd random source.
    #[arg(long)]
    seed: Option<u64>,

    /// Write every spectator texture as PNG into DIR and exit.
    #[arg(long, value_name = "DIR")]
    dump_textures: Option<PathBuf>,

    /// Resize the track to this many lanes halfway through the run.
    #[arg(long, value_name = "LANES")]
    relane: Option<u32>,

    /// Write the run summary as JSON to PATH (`-` for stdout).
    #[arg(long, value_name = "PATH")]
    summary_json: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunSummary {
    lanes: u32,
    frames: u64,
    elapsed: f32,
    /// First generation; a relane regenerates and bumps `generation`.
    crowd: CrowdSummary,
    registered: usize,
    generation: u32,
    fx_rendered: usize,
    fx_dropped: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Early-exit: dump the texture cache and quit
    if let Some(dir) = cli.dump_textures {
        match SpectatorTextures::build().export_png(&dir) {
            Ok(count) => println!("{} spectator textures written to {}", count, dir.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    // --------------- Configuration ---------------
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = GameConfig::with_path(path);
            if let Err(e) = config.load_from_file() {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
            config
        }
        None => {
            let mut config = GameConfig::new();
            if let Err(e) = config.load_from_file() {
                warn!("{}; using defaults", e);
            }
            config
        }
    };
    if let Some(lanes) = cli.lanes {
        config.lanes = lanes;
    }
    if let Some(frames) = cli.frames {
        config.frames = frames;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(1.0));
    world.insert_resource(TrackLayout::with_lanes(config.lanes));
    world.insert_resource(config.crowd.clone());
    world.insert_resource(match config.seed {
        Some(seed) => CrowdRng::with_seed(seed),
        None => CrowdRng::default(),
    });
    world.insert_resource(config.clone());

    // Init audio
    if config.audio_enabled {
        setup_audio(&mut world, config.sample_rate, config.hoof_cooldown_ms);
    }

    world.spawn(Observer::new(track_resized_observer));
    world.flush();

    // --------------- Scene ---------------
    spawn_sky(&mut world);
    spawn_ground(&mut world);
    rebuild_track_scene(&mut world);
    spawn_clouds(&mut world);
    let crowd = match generate_crowd(&mut world) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Failed to generate crowd: {}", e);
            shutdown_audio(&mut world);
            std::process::exit(1);
        }
    };

    let mut update = Schedule::default();
    update.add_systems(cloud_drift);
    if config.audio_enabled {
        update.add_systems(
            // audio systems must be together
            (
                update_bevy_audio_cmds,
                forward_audio_cmds,
                poll_audio_messages,
                update_bevy_audio_messages,
            )
                .chain(),
        );
    }

    // --------------- Main loop ---------------
    let fps = config.target_fps.max(1) as u64;
    let dt = config.frame_delta();
    let countdown_end = 3 * fps;
    let relane_at = config.frames / 2;
    let mut fx_rendered = 0;
    let mut fx_dropped = 0;

    info!("Running {} frames at {} fps", config.frames, fps);
    for frame in 0..config.frames {
        let tick = update_world_time(&mut world, dt);

        if config.audio_enabled {
            if frame <= countdown_end && frame % fps == 0 {
                play_fx(
                    &mut world,
                    SoundFx::Count {
                        go: frame == countdown_end,
                    },
                );
            } else if frame > countdown_end {
                play_fx(
                    &mut world,
                    SoundFx::Hoof {
                        volume: SoundFx::DEFAULT_HOOF_VOLUME,
                    },
                );
            }
        }

        if frame == relane_at {
            if let Some(lanes) = cli.relane {
                world.trigger(TrackResizedEvent { lanes });
                world.flush();
            }
        }

        update.run(&mut world);
        update_crowd(&mut world, frame >= countdown_end, tick);

        if let Some(mut msgs) = world.get_resource_mut::<Messages<AudioMessage>>() {
            for msg in msgs.drain() {
                match msg {
                    AudioMessage::FxRendered { .. } => fx_rendered += 1,
                    AudioMessage::FxDropped { .. } => fx_dropped += 1,
                }
            }
        }
        world.clear_trackers();
    }

    shutdown_audio(&mut world);

    let layout = *world.resource::<TrackLayout>();
    let registry = world.resource::<CrowdRegistry>();
    let summary = RunSummary {
        lanes: layout.lanes(),
        frames: config.frames,
        elapsed: world.resource::<WorldTime>().elapsed,
        crowd,
        registered: registry.len(),
        generation: registry.generation,
        fx_rendered,
        fx_dropped,
    };
    info!(
        "Done: {} spectators on {} lanes (generation {}), {} fx rendered, {} dropped",
        summary.registered, summary.lanes, summary.generation, fx_rendered, fx_dropped
    );

    if let Some(path) = cli.summary_json {
        let json = match serde_json::to_string_pretty(&summary) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error serializing summary: {e}");
                std::process::exit(1);
            }
        };
        if path.as_os_str() == "-" {
            println!("{}", json);
        } else if let Err(e) = std::fs::write(&path, json) {
            eprintln!("Error writing {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}
