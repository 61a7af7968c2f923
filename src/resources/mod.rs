//! ECS resources made available to systems.
//!
//! Long-lived data injected into the world and shared by the scene builders,
//! the crowd and the audio bridge.
//!
//! Overview
//! - `audio` – bridge and channels for the background audio thread
//! - `crowd` – crowd configuration, actor registry, random source and tick
//! - `gameconfig` – INI-backed settings for the whole run
//! - `spectatortextures` – the 200 pre-rendered spectator variants
//! - `track` – lane count, width, finish line and sky
//! - `worldtime` – simulation time and delta
pub mod audio;
pub mod crowd;
pub mod gameconfig;
pub mod spectatortextures;
pub mod track;
pub mod worldtime;
