//! Lane-count change event and observer.
//!
//! Triggering a [`TrackResizedEvent`] clamps the requested lane count, stores
//! it in [`TrackLayout`], rebuilds every lane-dependent scene group and
//! regenerates the crowd for the new width. A failed regeneration keeps the
//! previous crowd live.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{error, info};

use crate::resources::track::TrackLayout;
use crate::systems::crowd::generate_crowd;
use crate::systems::track::rebuild_track_scene;

/// Request a track with `lanes` lanes.
#[derive(Event, Debug, Clone, Copy)]
pub struct TrackResizedEvent {
    pub lanes: u32,
}

/// Observer that applies a [`TrackResizedEvent`].
///
/// The rebuild needs exclusive world access, so it is queued as a command and
/// runs when the trigger's commands are flushed.
pub fn track_resized_observer(trigger: On<TrackResizedEvent>, mut commands: Commands) {
    let requested = trigger.event().lanes;
    commands.queue(move |world: &mut World| {
        let lanes = world
            .get_resource_or_insert_with(TrackLayout::default)
            .set_lanes(requested);
        info!("track resized: requested {} lanes, using {}", requested, lanes);

        rebuild_track_scene(world);
        if let Err(err) = generate_crowd(world) {
            error!("crowd regeneration failed, keeping previous crowd: {}", err);
        }
    });
}
