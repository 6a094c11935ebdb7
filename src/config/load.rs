use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `STMP__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("STMP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(0..=100).contains(&self.playback.initial_volume) {
            return Err("playback.initial_volume must be between 0 and 100".to_string());
        }
        if self.playback.volume_step < 1 {
            return Err("playback.volume_step must be >= 1".to_string());
        }
        if self.audio.tick_ms < 50 {
            return Err("audio.tick_ms must be >= 50".to_string());
        }
        Ok(())
    }

    /// The server host, or an error explaining how to set it.
    pub fn require_host(&self) -> Result<&str, String> {
        let host = self.server.host.trim();
        if host.is_empty() {
            let path = resolve_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "config.toml".to_string());
            return Err(format!(
                "no server configured: set server.host in {path} or STMP__SERVER__HOST"
            ));
        }
        Ok(host)
    }
}

/// Resolve the config path from `STMP_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("STMP_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/stmp/config.toml`
/// or `~/.config/stmp/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("stmp").join("config.toml"))
}

/// Compute the default log directory under `$XDG_STATE_HOME/stmp`
/// or `~/.local/state/stmp`, falling back to the temp dir.
pub fn default_log_dir() -> PathBuf {
    if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("stmp");
    }
    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".local").join("state").join("stmp");
    }
    env::temp_dir().join("stmp")
}
