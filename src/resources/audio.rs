//! ECS resources that bridge the main thread with the background audio thread.
//!
//! Use [`setup_audio`] once during initialization to spawn the audio thread
//! and insert the [`AudioBridge`] and message resources. Call
//! [`shutdown_audio`] during teardown to stop the thread.

use crate::events::audio::{AudioCmd, AudioMessage};
use crate::synth::{HoofCooldown, SoundBuffer, SoundFx};
use crate::systems::audio::audio_thread;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, info};

/// Destination for rendered effects. Runs on the audio thread.
pub trait AudioSink: Send + 'static {
    fn submit(&mut self, fx: &SoundFx, buffer: &SoundBuffer);
}

/// Sink that discards everything. Used by the headless host.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn submit(&mut self, fx: &SoundFx, buffer: &SoundBuffer) {
        debug!(
            "[audio] discarded fx='{}' frames={}",
            fx.name(),
            buffer.samples.len()
        );
    }
}

/// Shared bridge between the ECS world and the audio thread.
#[derive(Resource)]
pub struct AudioBridge {
    /// Sender for [`AudioCmd`] messages (ECS -> audio thread).
    pub tx_cmd: Sender<AudioCmd>,
    /// Receiver for [`AudioMessage`] messages (audio thread -> ECS).
    pub rx_msg: Receiver<AudioMessage>,
    /// Join handle for the background audio thread.
    pub handle: std::thread::JoinHandle<()>,
}

/// Debounce state for hoof sounds, keyed on the world clock.
#[derive(Resource, Debug, Clone, Copy)]
pub struct HoofGate(pub HoofCooldown);

/// Spawn the audio thread with a [`NullSink`].
pub fn setup_audio(world: &mut World, sample_rate: u32, hoof_cooldown_ms: u64) {
    setup_audio_with_sink(world, sample_rate, hoof_cooldown_ms, NullSink);
}

/// Spawn the audio thread feeding `sink` and register bridge resources.
///
/// This function:
/// - Creates command/event channels.
/// - Spawns the background thread running [`audio_thread`].
/// - Inserts [`AudioBridge`], [`HoofGate`] and the `Messages<AudioCmd>` /
///   `Messages<AudioMessage>` mailboxes.
pub fn setup_audio_with_sink(
    world: &mut World,
    sample_rate: u32,
    hoof_cooldown_ms: u64,
    sink: impl AudioSink,
) {
    let (tx_cmd, rx_cmd) = unbounded::<AudioCmd>();
    let (tx_msg, rx_msg) = unbounded::<AudioMessage>();

    let handle = std::thread::spawn(move || audio_thread(rx_cmd, tx_msg, sample_rate, sink));

    world.insert_resource(AudioBridge {
        tx_cmd,
        rx_msg,
        handle,
    });
    world.insert_resource(HoofGate(HoofCooldown::new(hoof_cooldown_ms as f32 / 1000.0)));
    world.insert_resource(Messages::<AudioMessage>::default());
    world.insert_resource(Messages::<AudioCmd>::default());
    info!("[audio] bridge ready at {} Hz", sample_rate);
}

/// Gracefully request shutdown of the audio thread and join it.
///
/// If the bridge resource exists, sends [`AudioCmd::Shutdown`], waits for the
/// thread to exit, and removes the resource from the world.
pub fn shutdown_audio(world: &mut World) {
    if let Some(bridge) = world.remove_resource::<AudioBridge>() {
        let _ = bridge.tx_cmd.send(AudioCmd::Shutdown);
        let _ = bridge.handle.join();
    }
}
