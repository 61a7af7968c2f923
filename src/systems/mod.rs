//! Scene systems and host-side operations.
//!
//! Submodules overview
//! - [`audio`] – bridge with the audio thread (forward commands, poll replies)
//! - [`clouds`] – scatter and drift the cloud layer
//! - [`crowd`] – plan, generate and animate the spectator crowd
//! - [`time`] – update simulation time and the frame counter
//! - [`track`] – build the track, start/finish lines, billboard and ground

pub mod audio;
pub mod clouds;
pub mod crowd;
pub mod time;
pub mod track;
