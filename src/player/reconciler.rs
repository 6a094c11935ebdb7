//! Consumer loop for the engine's event stream.

use std::io;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::audio::{EngineEvent, PlaybackEngine, Property};

use super::controller::PlaybackController;
use super::types::{PlaybackSnapshot, Renderer, TransportState};

/// Drains engine events and folds them into controller state.
pub struct EventReconciler {
    controller: Arc<Mutex<PlaybackController>>,
    engine: Arc<dyn PlaybackEngine>,
    renderer: Arc<dyn Renderer>,
}

impl EventReconciler {
    pub fn new(
        controller: Arc<Mutex<PlaybackController>>,
        engine: Arc<dyn PlaybackEngine>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            controller,
            engine,
            renderer,
        }
    }

    /// Run the loop on its own thread until the shutdown sentinel arrives.
    pub fn spawn(self, events: Receiver<EngineEvent>) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("stmp-reconciler".into())
            .spawn(move || self.run(events))
    }

    /// Block on `events` until `EngineEvent::Shutdown` or until every
    /// sender is gone.
    pub fn run(&self, events: Receiver<EngineEvent>) {
        while let Ok(event) = events.recv() {
            if self.handle_event(event).is_none() {
                break;
            }
        }
        tracing::debug!("event reconciler stopped");
    }

    /// Apply one event. Returns the refreshed snapshot, or `None` for the
    /// shutdown sentinel.
    pub fn handle_event(&self, event: EngineEvent) -> Option<PlaybackSnapshot> {
        let transport = {
            let mut controller = self
                .controller
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            match event {
                EngineEvent::Shutdown => return None,
                EngineEvent::StartFile(load) => controller.on_start_file(load),
                EngineEvent::EndFile(load) => controller.on_end_file(load),
                EngineEvent::PropertyChange => {}
            }
            controller.transport()
        };

        let snapshot = self.snapshot(transport);
        self.renderer.update_status_line(snapshot.status_line());
        self.renderer.request_redraw();
        Some(snapshot)
    }

    fn snapshot(&self, transport: TransportState) -> PlaybackSnapshot {
        let volume_percent = self
            .engine
            .get_property(Property::Volume)
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        let position_seconds = self
            .engine
            .get_property(Property::TimePos)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let duration_seconds = self
            .engine
            .get_property(Property::Duration)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);

        PlaybackSnapshot {
            volume_percent,
            position_seconds,
            duration_seconds,
            transport,
        }
    }
}
