use bevy_ecs::message::Message;

use crate::synth::SoundFx;

/// Commands sent *to* the audio thread
#[derive(Message, Debug, Clone)]
pub enum AudioCmd {
    PlayFx { fx: SoundFx },
    Shutdown,
}

/// Messages sent *back* from the audio thread, or raised on the main thread
/// when a request is debounced.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum AudioMessage {
    FxRendered {
        name: &'static str,
        frames: usize,
        peak: f32,
    },
    FxDropped {
        name: &'static str,
    },
}
