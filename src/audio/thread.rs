use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};

use crate::config::AudioSettings;

use super::sink::{create_sink, http_agent};
use super::types::{EngineCmd, EngineError, EngineEvent, LoadId, PropsHandle};

pub(super) fn spawn_engine_thread(
    rx: Receiver<EngineCmd>,
    events: Sender<EngineEvent>,
    props: PropsHandle,
    audio_settings: AudioSettings,
    ready: SyncSender<Result<(), EngineError>>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new().name("stmp-audio".into()).spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready.send(Err(EngineError::NoOutputDevice(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let agent = http_agent(&audio_settings);
        let tick = Duration::from_millis(audio_settings.tick_ms);

        let mut sink: Option<Sink> = None;
        let mut paused = false;
        let mut volume = props.lock().map(|p| p.volume).unwrap_or(100);
        // Counts every load command, failed ones included.
        let mut load: LoadId = 0;

        // The receiver goes away once the reconciler shut down; nothing to do then.
        let emit = |event: EngineEvent| {
            let _ = events.send(event);
        };

        let unload = |props: &PropsHandle| {
            if let Ok(mut p) = props.lock() {
                p.unload();
            }
        };

        loop {
            match rx.recv_timeout(tick) {
                Ok(cmd) => match cmd {
                    EngineCmd::LoadAndPlay(uri) => {
                        load += 1;
                        // Replacing a loaded track is not an end-of-file.
                        if let Some(old) = sink.take() {
                            old.stop();
                        }

                        match create_sink(&stream, &agent, &uri, &audio_settings) {
                            Ok(loaded) => {
                                loaded.sink.set_volume(volume as f32 / 100.0);
                                loaded.sink.play();
                                paused = false;
                                if let Ok(mut p) = props.lock() {
                                    p.loaded = true;
                                    p.position = Some(Duration::ZERO);
                                    p.duration = loaded.duration;
                                }
                                sink = Some(loaded.sink);
                                tracing::debug!(%uri, load, "track loaded");
                                emit(EngineEvent::StartFile(load));
                            }
                            Err(e) => {
                                tracing::warn!(%uri, load, "failed to load track: {e}");
                                unload(&props);
                                emit(EngineEvent::EndFile(load));
                            }
                        }
                    }

                    EngineCmd::Stop => {
                        if let Some(s) = sink.take() {
                            s.stop();
                            paused = false;
                            unload(&props);
                            emit(EngineEvent::EndFile(load));
                        }
                    }

                    EngineCmd::SetPaused(pause) => {
                        if let Some(ref s) = sink {
                            if pause {
                                s.pause();
                            } else {
                                s.play();
                            }
                            paused = pause;
                            emit(EngineEvent::PropertyChange);
                        }
                    }

                    EngineCmd::SetVolume(percent) => {
                        volume = percent.clamp(0, 100);
                        if let Some(ref s) = sink {
                            s.set_volume(volume as f32 / 100.0);
                        }
                        if let Ok(mut p) = props.lock() {
                            p.volume = volume;
                        }
                        emit(EngineEvent::PropertyChange);
                    }

                    EngineCmd::Quit => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        unload(&props);
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    // Periodic position refresh and end-of-track detection.
                    let finished = match sink {
                        Some(ref s) if !paused => s.empty(),
                        _ => continue,
                    };
                    if finished {
                        sink = None;
                        unload(&props);
                        emit(EngineEvent::EndFile(load));
                    } else if let Some(ref s) = sink {
                        if let Ok(mut p) = props.lock() {
                            p.position = Some(s.get_pos());
                        }
                        emit(EngineEvent::PropertyChange);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
