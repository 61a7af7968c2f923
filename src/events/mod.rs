//! Event types and observers.
//!
//! Submodules:
//! - [`audio`] – commands and messages for the background audio thread
//! - [`track`] – lane-count changes that rebuild the scene and the crowd
pub mod audio;
pub mod track;
