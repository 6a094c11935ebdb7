use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/stmp/config.toml` or `~/.config/stmp/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `STMP__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub playback: PlaybackSettings,
    pub audio: AudioSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the Subsonic server, e.g. `https://music.example.org`.
    pub host: String,
    /// Overall timeout for catalog requests (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Volume (percent) pushed to the engine at startup.
    pub initial_volume: i64,
    /// Percent added or removed per volume key press.
    pub volume_step: i64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            initial_volume: 100,
            volume_step: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// How often the engine refreshes the position and checks for the end
    /// of a track (milliseconds).
    pub tick_ms: u64,
    /// Connect timeout when fetching a stream (milliseconds).
    pub connect_timeout_ms: u64,
    /// Largest stream the engine will buffer, in bytes.
    pub max_track_bytes: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            tick_ms: 500,
            connect_timeout_ms: 5_000,
            max_track_bytes: 512 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Directory for the log file. Defaults to the XDG state directory.
    pub directory: Option<PathBuf>,
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    pub filter: Option<String>,
}
