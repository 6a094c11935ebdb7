//! Shared playback types and the push interface used to reach the UI.

use super::queue::QueueItem;
use super::status::format_status;

/// Transport state of the playback engine, as tracked by the controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Display-ready view of the engine, rebuilt after every engine event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaybackSnapshot {
    pub volume_percent: i64,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub transport: TransportState,
}

impl PlaybackSnapshot {
    /// Render the snapshot as the fixed-format status line.
    pub fn status_line(&self) -> String {
        format_status(
            self.volume_percent,
            self.position_seconds,
            self.duration_seconds,
        )
    }
}

/// One row of the queue as the UI shows it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueEntry {
    pub title: String,
    pub artist: String,
}

impl From<&QueueItem> for QueueEntry {
    fn from(item: &QueueItem) -> Self {
        Self {
            title: item.title.clone(),
            artist: item.artist.clone(),
        }
    }
}

/// Push calls the playback core makes whenever observable state changes.
///
/// The rendering layer never reads core state directly; everything it shows
/// arrives through these calls.
pub trait Renderer: Send + Sync {
    fn update_queue_display(&self, entries: Vec<QueueEntry>);
    fn update_status_line(&self, line: String);
    fn update_transport_label(&self, transport: TransportState, current_title: Option<&str>);
    fn request_redraw(&self);
}
