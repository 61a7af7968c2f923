//! ECS components for entities.
//!
//! Submodules overview:
//! - [`cloud`] – drifting sky clouds
//! - [`group`] – scene group tags used for teardown
//! - [`mapposition`] – world-space position of an entity
//! - [`rotation`] – pitch/yaw in degrees
//! - [`sceneobject`] – renderer-independent meshes, labels and patterns
//! - [`spectator`] – crowd actors and their texture variant keys
//! - [`sprite`] – textured billboard planes

pub mod cloud;
pub mod group;
pub mod mapposition;
pub mod rotation;
pub mod sceneobject;
pub mod spectator;
pub mod sprite;
