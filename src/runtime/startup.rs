use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::app::SharedView;
use crate::audio::{AudioEngine, EngineEvent};
use crate::config;
use crate::player::{EventReconciler, PlaybackController, Renderer};

/// Running playback: the engine thread, the reconciler thread and the
/// controller both of them share.
pub struct Playback {
    pub controller: Arc<Mutex<PlaybackController>>,
    engine: Arc<AudioEngine>,
    events: Sender<EngineEvent>,
    reconciler: Option<JoinHandle<()>>,
}

/// Start the engine and the reconciler.
///
/// Returns `None` when the engine cannot start; browsing still works and the
/// view shows that playback is unavailable.
pub fn start_playback(settings: &config::Settings, view: &SharedView) -> Option<Playback> {
    let (events_tx, events_rx) = mpsc::channel::<EngineEvent>();

    let engine = match AudioEngine::spawn(settings.audio.clone(), events_tx.clone()) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            tracing::error!(error = %e, "playback engine unavailable, continuing without playback");
            view.set_playback_unavailable();
            return None;
        }
    };

    let renderer: Arc<dyn Renderer> = Arc::new(view.clone());
    let controller = Arc::new(Mutex::new(PlaybackController::new(
        engine.clone(),
        renderer.clone(),
        settings.playback.initial_volume,
    )));

    let reconciler = EventReconciler::new(controller.clone(), engine.clone(), renderer);
    let handle = match reconciler.spawn(events_rx) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "failed to start the event reconciler");
            engine.quit();
            view.set_playback_unavailable();
            return None;
        }
    };

    tracing::info!(
        volume = settings.playback.initial_volume,
        "playback engine started"
    );

    Some(Playback {
        controller,
        engine,
        events: events_tx,
        reconciler: Some(handle),
    })
}

impl Playback {
    /// Stop the reconciler with the shutdown sentinel, then the engine.
    pub fn shutdown(mut self) {
        if self.events.send(EngineEvent::Shutdown).is_err() {
            tracing::warn!("event reconciler already gone before shutdown");
        }
        if let Some(handle) = self.reconciler.take() {
            if handle.join().is_err() {
                tracing::warn!("event reconciler panicked");
            }
        }
        self.engine.quit();
        tracing::info!("playback stopped");
    }
}
