//! Static scene builders for the track and its furniture.
//!
//! Each builder owns one [`Group`] and despawns it before spawning again, so
//! calling a builder twice never leaves duplicates behind. Dimensions are read
//! from the [`TrackLayout`] resource at call time.
//!
//! The builders only describe the scene ([`SceneMesh`], [`Label`],
//! [`Checkerboard`]); turning that into draw calls is up to the renderer.

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, info};

use crate::components::group::{
    BILLBOARD_GROUP, FINISH_LINE_GROUP, GROUND_GROUP, Group, START_LINE_GROUP, TRACK_GROUP,
};
use crate::components::mapposition::MapPosition;
use crate::components::rotation::Rotation;
use crate::components::sceneobject::{Checkerboard, Label, Material, MeshShape, SceneMesh};
use crate::resources::track::{
    AD_BOARD_OFFSET, LANE_WIDTH, ORIGINAL_FINISH_Z, SkyGradient, TrackLayout,
};

const TRACK_LENGTH: f32 = 10_000.0;
const TRACK_CENTRE_Z: f32 = -2_000.0;
const MARKINGS_Y: f32 = 0.5;

const AD_BOARD_HEIGHT: f32 = 25.0;
const AD_BOARD_LENGTH: f32 = 100.0;
const AD_BOARD_GAP: f32 = 10.0;
const AD_BOARD_THICKNESS: f32 = 2.0;
const AD_BOARD_RUN: f32 = 4_500.0;

const MARKER_STEP: u32 = 500;
const MARKER_LAST: u32 = 3_500;

/// Despawn every entity tagged with `group`. Returns how many were removed.
pub fn despawn_group(world: &mut World, group: Group) -> usize {
    let doomed: Vec<Entity> = world
        .query::<(Entity, &Group)>()
        .iter(world)
        .filter(|(_, g)| **g == group)
        .map(|(e, _)| e)
        .collect();
    for entity in &doomed {
        world.despawn(*entity);
    }
    if !doomed.is_empty() {
        debug!("despawned {} '{}' entities", doomed.len(), group.0);
    }
    doomed.len()
}

fn spawn_mesh(world: &mut World, group: Group, pos: Vec3, rotation: Rotation, mesh: SceneMesh) -> Entity {
    world
        .spawn((group, MapPosition { pos }, rotation, mesh))
        .id()
}

fn current_layout(world: &mut World) -> TrackLayout {
    *world.get_resource_or_insert_with(TrackLayout::default)
}

/// Track surface, lane lines, borders, ad boards and distance markers.
pub fn spawn_track(world: &mut World) -> usize {
    despawn_group(world, TRACK_GROUP);
    let layout = current_layout(world);
    let width = layout.width();
    let half = layout.half_width();
    let mut spawned = 0;

    spawn_mesh(
        world,
        TRACK_GROUP,
        Vec3::new(0.0, 0.0, TRACK_CENTRE_Z),
        Rotation::flat(),
        SceneMesh::new(
            MeshShape::Plane {
                width,
                height: TRACK_LENGTH,
            },
            Material::lit(0xc2956e),
        )
        .receiving_shadow(),
    );
    spawned += 1;

    for lane in 1..layout.lanes() {
        spawn_mesh(
            world,
            TRACK_GROUP,
            Vec3::new(-half + lane as f32 * LANE_WIDTH, MARKINGS_Y, TRACK_CENTRE_Z),
            Rotation::flat(),
            SceneMesh::new(
                MeshShape::Plane {
                    width: 2.0,
                    height: TRACK_LENGTH,
                },
                Material::flat(0xffffff),
            ),
        );
        spawned += 1;
    }

    for x in [-half, half] {
        spawn_mesh(
            world,
            TRACK_GROUP,
            Vec3::new(x, MARKINGS_Y, TRACK_CENTRE_Z),
            Rotation::flat(),
            SceneMesh::new(
                MeshShape::Plane {
                    width: 5.0,
                    height: TRACK_LENGTH,
                },
                Material::flat(0xff0000),
            ),
        );
        spawned += 1;
    }

    // ad boards: one continuous frame per side, white screens with gaps
    let board_y = AD_BOARD_HEIGHT / 2.0;
    for sign in [-1.0_f32, 1.0] {
        let frame_x = sign * (half + AD_BOARD_OFFSET);
        spawn_mesh(
            world,
            TRACK_GROUP,
            Vec3::new(frame_x, board_y, -AD_BOARD_RUN / 2.0),
            Rotation::default(),
            SceneMesh::new(
                MeshShape::Box {
                    width: AD_BOARD_THICKNESS + 2.0,
                    height: AD_BOARD_HEIGHT + 4.0,
                    depth: AD_BOARD_RUN,
                },
                Material::lit(0x333333),
            ),
        );
        spawned += 1;

        let screen_x = frame_x - sign * 3.0;
        let mut z = 0.0;
        while z > -AD_BOARD_RUN {
            spawn_mesh(
                world,
                TRACK_GROUP,
                Vec3::new(screen_x, board_y, z - AD_BOARD_LENGTH / 2.0),
                Rotation::default(),
                SceneMesh::new(
                    MeshShape::Box {
                        width: AD_BOARD_THICKNESS,
                        height: AD_BOARD_HEIGHT,
                        depth: AD_BOARD_LENGTH,
                    },
                    Material::glowing(0xffffff, 0.1),
                ),
            );
            spawned += 1;
            z -= AD_BOARD_LENGTH + AD_BOARD_GAP;
        }
    }

    for dist in (MARKER_STEP..=MARKER_LAST).step_by(MARKER_STEP as usize) {
        for sign in [-1.0_f32, 1.0] {
            let entity = spawn_mesh(
                world,
                TRACK_GROUP,
                Vec3::new(sign * (half + 50.0), 30.0, -(dist as f32)),
                Rotation::yaw(-sign * 45.0),
                SceneMesh::new(
                    MeshShape::Plane {
                        width: 20.0,
                        height: 10.0,
                    },
                    Material::flat(0xffffff),
                ),
            );
            world.entity_mut(entity).insert(Label {
                text: format!("{}m", dist),
                foreground: 0x000000,
                background: 0xffffff,
            });
            spawned += 1;
        }
    }

    info!("track built: {} lanes, width {}, {} objects", layout.lanes(), width, spawned);
    spawned
}

/// Checkered start line at `z = 0`.
pub fn spawn_start_line(world: &mut World) -> Entity {
    despawn_group(world, START_LINE_GROUP);
    let width = current_layout(world).width();
    let entity = spawn_mesh(
        world,
        START_LINE_GROUP,
        Vec3::new(0.0, 1.0, 0.0),
        Rotation::flat(),
        SceneMesh::new(
            MeshShape::Plane {
                width: width + 20.0,
                height: 10.0,
            },
            Material::flat(0xffffff),
        ),
    );
    world.entity_mut(entity).insert(Checkerboard {
        columns: 8,
        rows: 2,
        repeat_x: width / LANE_WIDTH,
    });
    entity
}

/// Finish gate at the current finish line.
///
/// Red with a "FINISH" sign at its original spot; green with "REVERSE!" once
/// it has been moved by [`move_finish_line`].
pub fn spawn_finish_line(world: &mut World) -> usize {
    despawn_group(world, FINISH_LINE_GROUP);
    let layout = current_layout(world);
    let width = layout.width();
    let half = layout.half_width();
    let z = layout.finish_line_z();

    let (bar, gate, sign_text, sign_fg) = if layout.is_reversed() {
        (0x00ff00, Material::lit(0x00ff00), "REVERSE!", 0x000000)
    } else {
        (0xff0000, Material::lit(0xffffff), "FINISH", 0xffffff)
    };

    spawn_mesh(
        world,
        FINISH_LINE_GROUP,
        Vec3::new(0.0, 5.0, z),
        Rotation::default(),
        SceneMesh::new(
            MeshShape::Box {
                width: width + 20.0,
                height: 10.0,
                depth: 15.0,
            },
            Material::flat(bar),
        ),
    );
    for x in [-half - 15.0, half + 15.0] {
        spawn_mesh(
            world,
            FINISH_LINE_GROUP,
            Vec3::new(x, 40.0, z),
            Rotation::default(),
            SceneMesh::new(
                MeshShape::Box {
                    width: 10.0,
                    height: 80.0,
                    depth: 10.0,
                },
                gate,
            )
            .casting_shadow(),
        );
    }
    spawn_mesh(
        world,
        FINISH_LINE_GROUP,
        Vec3::new(0.0, 85.0, z),
        Rotation::default(),
        SceneMesh::new(
            MeshShape::Box {
                width: width + 50.0,
                height: 15.0,
                depth: 15.0,
            },
            gate,
        ),
    );
    let sign = spawn_mesh(
        world,
        FINISH_LINE_GROUP,
        Vec3::new(0.0, 110.0, z + 1.0),
        Rotation::default(),
        SceneMesh::new(
            MeshShape::Plane {
                width: 100.0,
                height: 25.0,
            },
            Material::flat(bar),
        ),
    );
    world.entity_mut(sign).insert(Label {
        text: sign_text.to_string(),
        foreground: sign_fg,
        background: bar,
    });
    5
}

/// Move the finish line to `z` and rebuild the gate there.
pub fn move_finish_line(world: &mut World, z: f32) -> usize {
    world
        .get_resource_or_insert_with(TrackLayout::default)
        .set_finish_line_z(z);
    info!("finish line moved to z={}", z);
    spawn_finish_line(world)
}

/// Sponsor billboard on two posts beside the left stand, halfway down the
/// original course. The screen is readable from both sides.
pub fn spawn_billboard(world: &mut World) -> usize {
    despawn_group(world, BILLBOARD_GROUP);
    let x = -(current_layout(world).half_width() + 80.0);
    let z = ORIGINAL_FINISH_Z / 2.0;

    for post_z in [z - 90.0, z + 90.0] {
        spawn_mesh(
            world,
            BILLBOARD_GROUP,
            Vec3::new(x, 90.0, post_z),
            Rotation::default(),
            SceneMesh::new(
                MeshShape::Box {
                    width: 12.0,
                    height: 180.0,
                    depth: 12.0,
                },
                Material::lit(0x444444),
            )
            .casting_shadow(),
        );
    }
    spawn_mesh(
        world,
        BILLBOARD_GROUP,
        Vec3::new(x, 150.0, z),
        Rotation::default(),
        SceneMesh::new(
            MeshShape::Box {
                width: 8.0,
                height: 105.0,
                depth: 210.0,
            },
            Material::lit(0x222222),
        ),
    );
    for (offset, yaw) in [(5.0, 90.0), (-5.0, -90.0)] {
        let screen = spawn_mesh(
            world,
            BILLBOARD_GROUP,
            Vec3::new(x + offset, 150.0, z),
            Rotation::yaw(yaw),
            SceneMesh::new(
                MeshShape::Plane {
                    width: 195.0,
                    height: 90.0,
                },
                Material::flat(0x111111),
            ),
        );
        world.entity_mut(screen).insert(Label {
            text: "Play Mcp".to_string(),
            foreground: 0x00ff88,
            background: 0x111111,
        });
    }
    5
}

/// Grass plane under everything.
pub fn spawn_ground(world: &mut World) -> Entity {
    despawn_group(world, GROUND_GROUP);
    spawn_mesh(
        world,
        GROUND_GROUP,
        Vec3::new(0.0, -0.5, TRACK_CENTRE_Z),
        Rotation::flat(),
        SceneMesh::new(
            MeshShape::Plane {
                width: 2_000.0,
                height: TRACK_LENGTH,
            },
            Material::lit(0x228b22),
        )
        .receiving_shadow(),
    )
}

/// Install the vertical sky gradient used as the scene background.
pub fn spawn_sky(world: &mut World) {
    world.insert_resource(SkyGradient::default());
}

/// Rebuild everything that depends on the lane count.
pub fn rebuild_track_scene(world: &mut World) {
    spawn_track(world);
    spawn_start_line(world);
    spawn_finish_line(world);
    spawn_billboard(world);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(world: &mut World, group: Group) -> usize {
        world
            .query::<&Group>()
            .iter(world)
            .filter(|g| **g == group)
            .count()
    }

    #[test]
    fn track_object_count_follows_lanes() {
        let mut world = World::new();
        world.insert_resource(TrackLayout::with_lanes(8));
        // surface + 7 lines + 2 borders + 2 frames + 2 * 41 screens + 14 markers
        assert_eq!(spawn_track(&mut world), 1 + 7 + 2 + 2 + 82 + 14);

        world.resource_mut::<TrackLayout>().set_lanes(10);
        let rebuilt = spawn_track(&mut world);
        assert_eq!(rebuilt, 1 + 9 + 2 + 2 + 82 + 14);
        assert_eq!(count(&mut world, TRACK_GROUP), rebuilt);
    }

    #[test]
    fn finish_line_turns_green_when_moved() {
        let mut world = World::new();
        world.insert_resource(TrackLayout::default());
        spawn_finish_line(&mut world);
        move_finish_line(&mut world, 0.0);
        assert_eq!(count(&mut world, FINISH_LINE_GROUP), 5);

        let labels: Vec<String> = world
            .query::<&Label>()
            .iter(&world)
            .map(|l| l.text.clone())
            .collect();
        assert_eq!(labels, vec!["REVERSE!".to_string()]);
    }

    #[test]
    fn start_line_checker_repeats_per_lane() {
        let mut world = World::new();
        world.insert_resource(TrackLayout::with_lanes(12));
        let entity = spawn_start_line(&mut world);
        let checker = world.get::<Checkerboard>(entity).unwrap();
        assert_eq!(checker.repeat_x, 12.0);
        match world.get::<SceneMesh>(entity).unwrap().shape {
            MeshShape::Plane { width, .. } => assert_eq!(width, 380.0),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn despawn_group_leaves_other_groups() {
        let mut world = World::new();
        world.insert_resource(TrackLayout::default());
        spawn_ground(&mut world);
        spawn_billboard(&mut world);
        assert_eq!(despawn_group(&mut world, BILLBOARD_GROUP), 5);
        assert_eq!(count(&mut world, GROUND_GROUP), 1);
    }
}
