//! Playback engine.
//!
//! A dedicated thread owns the `rodio` output stream and the current sink.
//! Commands arrive over a channel, events leave over another, and the
//! readable properties (volume, position, duration) sit behind a mutex.

mod engine;
mod sink;
mod thread;
mod types;

pub use engine::AudioEngine;
pub use types::*;
