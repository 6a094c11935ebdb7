//! Turning a URI into a paused `rodio` sink.
//!
//! Remote URIs are fetched whole over HTTP before decoding; anything without
//! a scheme (or with `file://`) is read from disk.

use std::io::Cursor;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::config::AudioSettings;

use super::types::EngineError;

pub(super) struct LoadedTrack {
    pub sink: Sink,
    pub duration: Option<Duration>,
}

pub(super) fn http_agent(settings: &AudioSettings) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .user_agent(concat!("stmp/", env!("CARGO_PKG_VERSION")))
        .timeout_connect(Some(Duration::from_millis(settings.connect_timeout_ms)))
        .build();
    ureq::Agent::new_with_config(config)
}

pub(super) fn is_remote(uri: &str) -> bool {
    let lower = uri.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn fetch(agent: &ureq::Agent, uri: &str, max_bytes: u64) -> Result<Vec<u8>, EngineError> {
    if is_remote(uri) {
        let mut resp = agent.get(uri).call()?;
        let bytes = resp.body_mut().with_config().limit(max_bytes).read_to_vec()?;
        Ok(bytes)
    } else {
        let path = uri.strip_prefix("file://").unwrap_or(uri);
        Ok(std::fs::read(path)?)
    }
}

/// Fetch and decode `uri` into a paused sink attached to `stream`.
pub(super) fn create_sink(
    stream: &OutputStream,
    agent: &ureq::Agent,
    uri: &str,
    settings: &AudioSettings,
) -> Result<LoadedTrack, EngineError> {
    let bytes = fetch(agent, uri, settings.max_track_bytes)?;
    let source =
        Decoder::new(Cursor::new(bytes)).map_err(|e| EngineError::Decode(e.to_string()))?;
    let duration = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(LoadedTrack { sink, duration })
}
