//! Trackside library.
//!
//! Procedural trackside scenery for a racing game: the track and its
//! furniture, drifting clouds, synthesized sound effects and, at its heart, a
//! crowd of sprite spectators animated under a fixed per-frame budget. Exposes
//! the ECS components, resources, systems and events for the host binary and
//! for integration tests.

pub mod canvas;
pub mod components;
pub mod events;
pub mod resources;
pub mod synth;
pub mod systems;
