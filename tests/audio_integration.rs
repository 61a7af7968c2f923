//! Audio bridge integration tests: effects travel to the synthesis thread,
//! come back as messages, and hoof sounds are debounced on the world clock.

use std::time::Duration;

use bevy_ecs::prelude::*;
use crossbeam_channel::{Sender, unbounded};

use trackside::events::audio::AudioMessage;
use trackside::resources::audio::{AudioSink, setup_audio_with_sink, shutdown_audio};
use trackside::resources::worldtime::WorldTime;
use trackside::synth::{SoundBuffer, SoundFx};
use trackside::systems::audio::{
    forward_audio_cmds, play_fx, poll_audio_messages, update_bevy_audio_cmds,
    update_bevy_audio_messages,
};

const SAMPLE_RATE: u32 = 8_000;

/// Sink that reports what it received.
struct ChannelSink(Sender<(&'static str, usize)>);

impl AudioSink for ChannelSink {
    fn submit(&mut self, fx: &SoundFx, buffer: &SoundBuffer) {
        let _ = self.0.send((fx.name(), buffer.samples.len()));
    }
}

fn audio_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            update_bevy_audio_cmds,
            forward_audio_cmds,
            poll_audio_messages,
            update_bevy_audio_messages,
        )
            .chain(),
    );
    schedule
}

fn set_clock(world: &mut World, seconds: f32) {
    world.resource_mut::<WorldTime>().elapsed = seconds;
}

#[test]
fn played_effect_reaches_the_sink() {
    let (tx, rx) = unbounded();
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    setup_audio_with_sink(&mut world, SAMPLE_RATE, 80, ChannelSink(tx));

    assert!(play_fx(&mut world, SoundFx::Count { go: true }));
    let mut schedule = audio_schedule();
    schedule.run(&mut world);

    let (name, frames) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(name, "go");
    assert_eq!(frames, (SAMPLE_RATE as f32 * 0.4).round() as usize);

    // the reply arrives asynchronously; poll until it shows up
    let mut rendered = Vec::new();
    for _ in 0..200 {
        schedule.run(&mut world);
        rendered.extend(world.resource_mut::<Messages<AudioMessage>>().drain());
        if !rendered.is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(matches!(
        rendered.first(),
        Some(AudioMessage::FxRendered { name: "go", .. })
    ));

    shutdown_audio(&mut world);
}

#[test]
fn hoof_sounds_are_debounced_on_the_world_clock() {
    let (tx, _rx) = unbounded();
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    setup_audio_with_sink(&mut world, SAMPLE_RATE, 80, ChannelSink(tx));
    let hoof = || SoundFx::Hoof {
        volume: SoundFx::DEFAULT_HOOF_VOLUME,
    };

    set_clock(&mut world, 1.0);
    assert!(play_fx(&mut world, hoof()));
    set_clock(&mut world, 1.05);
    assert!(!play_fx(&mut world, hoof()));
    set_clock(&mut world, 1.1);
    assert!(play_fx(&mut world, hoof()));

    let dropped: Vec<_> = world
        .resource_mut::<Messages<AudioMessage>>()
        .drain()
        .collect();
    assert_eq!(dropped, vec![AudioMessage::FxDropped { name: "hoof" }]);

    // other effects are never debounced
    assert!(play_fx(&mut world, SoundFx::Boost));
    assert!(play_fx(&mut world, SoundFx::Boost));

    shutdown_audio(&mut world);
}

#[test]
fn shutdown_joins_the_thread() {
    let (tx, rx) = unbounded();
    let mut world = World::new();
    setup_audio_with_sink(&mut world, SAMPLE_RATE, 80, ChannelSink(tx));
    shutdown_audio(&mut world);
    // the sink was dropped with the thread
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}
