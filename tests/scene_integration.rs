//! Scene integration tests: track builders, clouds and the host frame loop
//! pieces working together in one `World`.

use bevy_ecs::prelude::*;

use trackside::components::cloud::Cloud;
use trackside::components::group::{
    BILLBOARD_GROUP, CLOUD_GROUP, FINISH_LINE_GROUP, GROUND_GROUP, Group, SPECTATOR_GROUP,
    START_LINE_GROUP, TRACK_GROUP,
};
use trackside::components::mapposition::MapPosition;
use trackside::components::sceneobject::Label;
use trackside::resources::crowd::{CrowdConfig, CrowdRegistry, CrowdRng};
use trackside::resources::track::{SkyGradient, TrackLayout};
use trackside::resources::worldtime::WorldTime;
use trackside::systems::clouds::{CLOUD_COUNT, CLOUD_WRAP_X, cloud_drift, spawn_clouds};
use trackside::systems::crowd::{generate_crowd, update_crowd};
use trackside::systems::time::update_world_time;
use trackside::systems::track::{
    move_finish_line, rebuild_track_scene, spawn_ground, spawn_sky,
};

fn group_count(world: &mut World, group: Group) -> usize {
    world
        .query::<&Group>()
        .iter(world)
        .filter(|g| **g == group)
        .count()
}

fn full_scene(lanes: u32) -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(TrackLayout::with_lanes(lanes));
    world.insert_resource(CrowdConfig::default());
    world.insert_resource(CrowdRng::with_seed(99));
    spawn_sky(&mut world);
    spawn_ground(&mut world);
    rebuild_track_scene(&mut world);
    spawn_clouds(&mut world);
    generate_crowd(&mut world).unwrap();
    world
}

#[test]
fn full_scene_has_every_group() {
    let mut world = full_scene(8);
    assert_eq!(group_count(&mut world, GROUND_GROUP), 1);
    assert_eq!(group_count(&mut world, START_LINE_GROUP), 1);
    assert_eq!(group_count(&mut world, FINISH_LINE_GROUP), 5);
    assert_eq!(group_count(&mut world, BILLBOARD_GROUP), 5);
    assert_eq!(group_count(&mut world, CLOUD_GROUP), CLOUD_COUNT);
    assert!(group_count(&mut world, TRACK_GROUP) > 100);
    let crowd = world.resource::<CrowdRegistry>().len();
    assert_eq!(group_count(&mut world, SPECTATOR_GROUP), crowd);
    assert_eq!(world.resource::<SkyGradient>().stops.len(), 4);
}

#[test]
fn rebuilding_does_not_duplicate_groups() {
    let mut world = full_scene(8);
    let track = group_count(&mut world, TRACK_GROUP);
    rebuild_track_scene(&mut world);
    assert_eq!(group_count(&mut world, TRACK_GROUP), track);
    assert_eq!(group_count(&mut world, FINISH_LINE_GROUP), 5);
}

#[test]
fn distance_markers_run_every_five_hundred_metres() {
    let mut world = full_scene(8);
    let mut labels: Vec<String> = world
        .query::<(&Label, &Group)>()
        .iter(&world)
        .filter(|(_, g)| **g == TRACK_GROUP)
        .map(|(l, _)| l.text.clone())
        .collect();
    labels.sort();
    labels.dedup();
    assert_eq!(
        labels,
        vec!["1000m", "1500m", "2000m", "2500m", "3000m", "3500m", "500m"]
    );
}

#[test]
fn reversed_finish_line_moves_the_gate() {
    let mut world = full_scene(8);
    move_finish_line(&mut world, 0.0);
    let zs: Vec<f32> = world
        .query::<(&MapPosition, &Group)>()
        .iter(&world)
        .filter(|(_, g)| **g == FINISH_LINE_GROUP)
        .map(|(p, _)| p.pos.z)
        .collect();
    assert_eq!(zs.len(), 5);
    assert!(zs.iter().all(|z| *z == 0.0 || *z == 1.0));
    assert!(world.resource::<TrackLayout>().is_reversed());
}

#[test]
fn frame_loop_drifts_clouds_and_animates_crowd() {
    let mut world = full_scene(10);
    let mut update = Schedule::default();
    update.add_systems(cloud_drift);

    let before: Vec<f32> = world
        .query::<(&MapPosition, &Cloud)>()
        .iter(&world)
        .map(|(p, _)| p.pos.x)
        .collect();

    let mut frame = 0;
    for _ in 0..20 {
        frame = update_world_time(&mut world, 1.0 / 60.0);
        update.run(&mut world);
        update_crowd(&mut world, true, frame - 1);
    }
    assert_eq!(frame, 20);

    let after: Vec<f32> = world
        .query::<(&MapPosition, &Cloud)>()
        .iter(&world)
        .map(|(p, _)| p.pos.x)
        .collect();
    for (x0, x1) in before.iter().zip(&after) {
        assert!(*x1 > *x0 || *x1 <= -CLOUD_WRAP_X + 6.0);
    }
    assert!((world.resource::<WorldTime>().elapsed - 20.0 / 60.0).abs() < 1e-4);
}
