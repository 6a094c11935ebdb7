//! The shared view: everything the playback core pushes for display.
//!
//! `SharedView` implements `Renderer`. The reconciler thread and the input
//! thread both write into it; the draw loop reads a copy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::player::{QueueEntry, Renderer, TransportState, format_status};

pub const UNAVAILABLE_LABEL: &str = "stmp: playback unavailable";

/// Transport label text for the title row.
pub fn transport_label(transport: TransportState, current_title: Option<&str>) -> String {
    match transport {
        TransportState::Stopped => "stmp: stopped".to_string(),
        TransportState::Playing => match current_title {
            Some(title) => format!("stmp: playing {title}"),
            None => "stmp: playing".to_string(),
        },
        TransportState::Paused => "stmp: paused".to_string(),
    }
}

/// Queue row text, `<title> - <artist>`.
pub fn queue_row(entry: &QueueEntry) -> String {
    format!("{} - {}", entry.title, entry.artist)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub queue: Vec<QueueEntry>,
    pub status_line: String,
    pub transport: TransportState,
    pub transport_label: String,
    /// Last error worth showing, e.g. a failed directory lookup.
    pub notice: Option<String>,
    pub playback_available: bool,
}

impl ViewModel {
    fn new(initial_volume: i64) -> Self {
        Self {
            queue: Vec::new(),
            status_line: format_status(initial_volume, 0.0, 0.0),
            transport: TransportState::Stopped,
            transport_label: transport_label(TransportState::Stopped, None),
            notice: None,
            playback_available: true,
        }
    }
}

#[derive(Clone)]
pub struct SharedView {
    model: Arc<Mutex<ViewModel>>,
    redraw: Arc<AtomicBool>,
}

impl SharedView {
    pub fn new(initial_volume: i64) -> Self {
        Self {
            model: Arc::new(Mutex::new(ViewModel::new(initial_volume))),
            redraw: Arc::new(AtomicBool::new(true)),
        }
    }

    fn model(&self) -> MutexGuard<'_, ViewModel> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current view for drawing.
    pub fn snapshot(&self) -> ViewModel {
        self.model().clone()
    }

    pub fn queue_len(&self) -> usize {
        self.model().queue.len()
    }

    /// Whether a redraw was requested since the last call.
    pub fn take_redraw(&self) -> bool {
        self.redraw.swap(false, Ordering::AcqRel)
    }

    pub fn set_notice(&self, notice: Option<String>) {
        self.model().notice = notice;
        self.request_redraw();
    }

    /// Mark playback as disabled for the rest of the session.
    pub fn set_playback_unavailable(&self) {
        let mut model = self.model();
        model.playback_available = false;
        model.transport_label = UNAVAILABLE_LABEL.to_string();
        drop(model);
        self.request_redraw();
    }
}

impl Renderer for SharedView {
    fn update_queue_display(&self, entries: Vec<QueueEntry>) {
        self.model().queue = entries;
        self.request_redraw();
    }

    fn update_status_line(&self, line: String) {
        self.model().status_line = line;
    }

    fn update_transport_label(&self, transport: TransportState, current_title: Option<&str>) {
        let mut model = self.model();
        model.transport = transport;
        model.transport_label = transport_label(transport, current_title);
        drop(model);
        self.request_redraw();
    }

    fn request_redraw(&self) {
        self.redraw.store(true, Ordering::Release);
    }
}
