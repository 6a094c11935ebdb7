use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use crate::config::AudioSettings;

use super::thread::spawn_engine_thread;
use super::types::{
    EngineCmd, EngineError, EngineEvent, EngineProps, PlaybackEngine, Property, PropertyValue,
    PropsHandle,
};

/// Handle to the audio thread.
pub struct AudioEngine {
    tx: Sender<EngineCmd>,
    props: PropsHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioEngine {
    /// Start the audio thread and wait until it has opened the output device.
    ///
    /// Events are delivered on `events` in the order they happen.
    pub fn spawn(
        audio_settings: AudioSettings,
        events: Sender<EngineEvent>,
    ) -> Result<Self, EngineError> {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let props: PropsHandle = Arc::new(Mutex::new(EngineProps::default()));

        let handle = spawn_engine_thread(rx, events, props.clone(), audio_settings, ready_tx)?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(_) => return Err(EngineError::ThreadExited),
        }

        Ok(Self {
            tx,
            props,
            join: Mutex::new(Some(handle)),
        })
    }

    fn send(&self, cmd: EngineCmd) {
        if let Err(e) = self.tx.send(cmd) {
            tracing::warn!(cmd = ?e.0, "audio thread is gone, dropping command");
        }
    }

    /// Stop playback and wait for the audio thread to finish.
    pub fn quit(&self) {
        self.send(EngineCmd::Quit);

        let handle = self
            .join
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(h) = handle {
            if h.join().is_err() {
                tracing::warn!("audio thread panicked");
            }
        }
    }
}

impl PlaybackEngine for AudioEngine {
    fn load_and_play(&self, uri: &str) {
        self.send(EngineCmd::LoadAndPlay(uri.to_string()));
    }

    fn stop(&self) {
        self.send(EngineCmd::Stop);
    }

    fn set_paused(&self, paused: bool) {
        self.send(EngineCmd::SetPaused(paused));
    }

    fn set_volume(&self, percent: i64) {
        if let Ok(mut p) = self.props.lock() {
            p.volume = percent.clamp(0, 100);
        }
        self.send(EngineCmd::SetVolume(percent));
    }

    fn get_property(&self, property: Property) -> Option<PropertyValue> {
        self.props.lock().ok().and_then(|p| p.read(property))
    }
}
