//! Engine commands, events, properties and the `PlaybackEngine` seam.
//!
//! The playback core only ever talks to an engine through `PlaybackEngine`
//! and the `EngineEvent` channel; `AudioEngine` is the rodio-backed
//! implementation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

#[derive(Debug)]
pub enum EngineCmd {
    /// Load the resource at the given URI and start playing it, replacing
    /// whatever is loaded.
    LoadAndPlay(String),
    /// Stop and unload the current resource.
    Stop,
    /// Pause (`true`) or resume (`false`).
    SetPaused(bool),
    /// Set the output volume in percent.
    SetVolume(i64),
    /// Stop playback and end the engine thread.
    Quit,
}

/// Sequence number of a load. Loads are numbered from 1 in the order
/// `load_and_play` is called.
pub type LoadId = u64;

/// Events emitted by the engine, in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// The given load started playing.
    StartFile(LoadId),
    /// The given load ended, was stopped, or failed to load.
    EndFile(LoadId),
    /// Position, volume or pause state changed.
    PropertyChange,
    /// Sent by the owning process on quit; consumers stop reading.
    Shutdown,
}

/// Readable engine properties.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Property {
    Volume,
    TimePos,
    Duration,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Int(i64),
    Double(f64),
}

impl PropertyValue {
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(v),
            Self::Double(v) if v.is_finite() => Some(v.round() as i64),
            Self::Double(_) => None,
        }
    }

    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(v as f64),
            Self::Double(v) => Some(v),
        }
    }
}

/// Command/query surface of a playback engine.
///
/// Commands are fire-and-forget; their effects show up later on the event
/// channel, tagged with the `LoadId` of the load they concern. `get_property`
/// returns `None` when a value is unavailable, e.g. the position while
/// nothing is loaded.
pub trait PlaybackEngine: Send + Sync {
    fn load_and_play(&self, uri: &str);
    fn stop(&self);
    fn set_paused(&self, paused: bool);
    fn set_volume(&self, percent: i64);
    fn get_property(&self, property: Property) -> Option<PropertyValue>;
}

/// Engine state readable from other threads.
#[derive(Debug, Clone)]
pub struct EngineProps {
    /// Output volume in percent.
    pub volume: i64,
    /// Whether a resource is loaded.
    pub loaded: bool,
    /// Playback position of the loaded resource.
    pub position: Option<Duration>,
    /// Total length of the loaded resource, when the decoder knows it.
    pub duration: Option<Duration>,
}

impl Default for EngineProps {
    fn default() -> Self {
        Self {
            volume: 100,
            loaded: false,
            position: None,
            duration: None,
        }
    }
}

impl EngineProps {
    pub fn read(&self, property: Property) -> Option<PropertyValue> {
        match property {
            Property::Volume => Some(PropertyValue::Int(self.volume)),
            Property::TimePos if self.loaded => self
                .position
                .map(|p| PropertyValue::Double(p.as_secs_f64())),
            Property::Duration if self.loaded => self
                .duration
                .map(|d| PropertyValue::Double(d.as_secs_f64())),
            Property::TimePos | Property::Duration => None,
        }
    }

    pub(super) fn unload(&mut self) {
        self.loaded = false;
        self.position = None;
        self.duration = None;
    }
}

pub type PropsHandle = Arc<Mutex<EngineProps>>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),

    #[error("failed to fetch stream: {0}")]
    Fetch(#[from] ureq::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("audio engine thread exited during startup")]
    ThreadExited,
}
