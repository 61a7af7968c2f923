use bevy_ecs::prelude::Component;

/// Scene group tag. Everything spawned by one builder shares a group so the
/// whole set can be torn down before it is rebuilt.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Group(pub &'static str);

pub const SPECTATOR_GROUP: Group = Group("spectator");
pub const TRACK_GROUP: Group = Group("track");
pub const START_LINE_GROUP: Group = Group("start_line");
pub const FINISH_LINE_GROUP: Group = Group("finish_line");
pub const BILLBOARD_GROUP: Group = Group("billboard");
pub const GROUND_GROUP: Group = Group("ground");
pub const CLOUD_GROUP: Group = Group("cloud");
