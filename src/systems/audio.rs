//! Audio systems backed by a dedicated synthesis thread.
//!
//! - [`audio_thread`] runs on its own OS thread, renders requested effects
//!   with [`crate::synth`] and hands the buffers to an
//!   [`AudioSink`](crate::resources::audio::AudioSink), replying with
//!   [`AudioMessage`] notifications.
//! - [`forward_audio_cmds`] moves ECS [`AudioCmd`] messages onto the channel.
//! - [`poll_audio_messages`] drains the thread's replies into the ECS mailbox.
//! - [`play_fx`] is the host-side entry point and applies the hoof debounce.
//!
//! Synthesis never runs on the frame thread.

use crate::events::audio::{AudioCmd, AudioMessage};
use crate::resources::audio::{AudioBridge, AudioSink, HoofGate};
use crate::resources::worldtime::WorldTime;
use crate::synth::SoundFx;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use fastrand::Rng;
use log::{debug, info};

/// Drain any pending messages from the audio thread into the ECS
/// [`Messages<AudioMessage>`] mailbox. Non-blocking.
pub fn poll_audio_messages(bridge: Res<AudioBridge>, mut writer: MessageWriter<AudioMessage>) {
    writer.write_batch(bridge.rx_msg.try_iter());
}

/// Advance the ECS message queue for [`AudioMessage`].
pub fn update_bevy_audio_messages(mut msgs: ResMut<Messages<AudioMessage>>) {
    msgs.update();
}

/// Forward ECS AudioCmd messages to the audio thread via the AudioBridge sender.
pub fn forward_audio_cmds(bridge: Res<AudioBridge>, mut reader: MessageReader<AudioCmd>) {
    for cmd in reader.read() {
        // ignore send error on shutdown
        let _ = bridge.tx_cmd.send(cmd.clone());
    }
}

/// Advance the ECS message queue for AudioCmd so same-frame readers can observe writes.
pub fn update_bevy_audio_cmds(mut msgs: ResMut<Messages<AudioCmd>>) {
    msgs.update();
}

/// Queue an effect for playback.
///
/// Hoof sounds closer together than the configured cooldown (measured on
/// [`WorldTime::elapsed`]) are dropped and reported as
/// [`AudioMessage::FxDropped`]. Returns whether the effect was queued.
pub fn play_fx(world: &mut World, fx: SoundFx) -> bool {
    if matches!(fx, SoundFx::Hoof { .. }) {
        let now = world
            .get_resource::<WorldTime>()
            .map(|t| t.elapsed)
            .unwrap_or_default();
        let accepted = world
            .get_resource_mut::<HoofGate>()
            .map(|mut gate| gate.0.try_accept(now))
            .unwrap_or(true);
        if !accepted {
            if let Some(mut msgs) = world.get_resource_mut::<Messages<AudioMessage>>() {
                msgs.write(AudioMessage::FxDropped { name: fx.name() });
            }
            return false;
        }
    }
    match world.get_resource_mut::<Messages<AudioCmd>>() {
        Some(mut msgs) => {
            msgs.write(AudioCmd::PlayFx { fx });
            true
        }
        None => false,
    }
}

/// Entry point of the dedicated audio thread.
///
/// Blocks on the command channel, renders each [`AudioCmd::PlayFx`] at
/// `sample_rate`, submits the buffer to `sink` and reports
/// [`AudioMessage::FxRendered`]. Exits on [`AudioCmd::Shutdown`] or when the
/// sender side is dropped.
pub fn audio_thread(
    rx_cmd: Receiver<AudioCmd>,
    tx_msg: Sender<AudioMessage>,
    sample_rate: u32,
    mut sink: impl AudioSink,
) {
    info!(
        "[audio] thread starting (id={:?})",
        std::thread::current().id()
    );
    let mut rng = Rng::new();

    for cmd in rx_cmd.iter() {
        match cmd {
            AudioCmd::PlayFx { fx } => {
                let buffer = fx.render(sample_rate, &mut rng);
                debug!(
                    "[audio] rendered fx='{}' frames={} peak={:.3}",
                    fx.name(),
                    buffer.samples.len(),
                    buffer.peak()
                );
                sink.submit(&fx, &buffer);
                let _ = tx_msg.send(AudioMessage::FxRendered {
                    name: fx.name(),
                    frames: buffer.samples.len(),
                    peak: buffer.peak(),
                });
            }
            AudioCmd::Shutdown => {
                info!("[audio] shutdown requested");
                break;
            }
        }
    }

    info!(
        "[audio] thread exiting (id={:?})",
        std::thread::current().id()
    );
}
