//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_ASSISTANT_REVEAL_MS, DEFAULT_AUTO_SAVE_INTERVAL_MS, DEFAULT_ZOOM_PERCENT,
    MAX_ZOOM_PERCENT, MIN_ZOOM_PERCENT,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for Quill.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    /// Idle delay before a dirty document is saved; `0` disables autosave.
    pub auto_save_interval: u64,
    pub default_zoom: f64,
    pub assistant_reveal_ms: u64,
    /// Explicit Chrome/Chromium binary used for PDF export.
    pub chrome_path: Option<String>,
    pub export_trace: bool,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    if let (Ok(drive), Ok(path)) = (env::var("HOMEDRIVE"), env::var("HOMEPATH")) {
        if !drive.trim().is_empty() && !path.trim().is_empty() {
            return Some(PathBuf::from(format!("{}{}", drive, path)));
        }
    }

    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn parse_zoom(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().trim_end_matches('%').parse().ok()?;
    if value.is_finite() {
        Some(value.clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT))
    } else {
        None
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or unparsable.
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("QUILL_DB_PATH")
                .map(expand_tilde)
                .unwrap_or_else(|_| {
                    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                    let cache_dir = home.join(".cache").join("quill");
                    cache_dir.join("db").to_string_lossy().to_string()
                }),
            auto_save_interval: env::var("QUILL_AUTOSAVE_INTERVAL")
                .ok()
                .and_then(|i| i.trim().parse().ok())
                .unwrap_or(DEFAULT_AUTO_SAVE_INTERVAL_MS),
            default_zoom: env::var("QUILL_DEFAULT_ZOOM")
                .ok()
                .and_then(|raw| parse_zoom(&raw))
                .unwrap_or(DEFAULT_ZOOM_PERCENT),
            assistant_reveal_ms: env::var("QUILL_ASSISTANT_REVEAL_MS")
                .ok()
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(DEFAULT_ASSISTANT_REVEAL_MS),
            chrome_path: env::var("QUILL_CHROME_PATH")
                .ok()
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
                .map(expand_tilde),
            export_trace: env_flag_enabled("QUILL_EXPORT_TRACE"),
        }
    }

    /// Whether autosave should run at all.
    pub fn autosave_enabled(&self) -> bool {
        self.auto_save_interval > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[allow(unused_unsafe)]
    fn put_var(name: &str, value: Option<&str>) {
        // SAFETY: every caller holds ENV_LOCK, so no other test thread touches the environment.
        unsafe {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
    }

    /// Build a config from `vars` (`None` unsets), restoring the environment afterwards.
    fn config_with(vars: &[(&str, Option<&str>)]) -> Config {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let saved: Vec<_> = vars
            .iter()
            .map(|(name, _)| (*name, env::var(name).ok()))
            .collect();
        for (name, value) in vars {
            put_var(name, *value);
        }
        let config = Config::from_env();
        for (name, previous) in &saved {
            put_var(name, previous.as_deref());
        }
        config
    }

    #[test]
    fn parse_env_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_accepts_falsy_values() {
        for value in ["", "0", "false", "FALSE", " no ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_rejects_unknown_values() {
        assert_eq!(parse_env_flag("maybe"), None);
        assert_eq!(parse_env_flag("enabled"), None);
    }

    #[test]
    fn from_env_applies_overrides_and_clamps_zoom() {
        let config = config_with(&[
            ("QUILL_DB_PATH", Some("/tmp/quill-config-test")),
            ("QUILL_AUTOSAVE_INTERVAL", Some("0")),
            ("QUILL_DEFAULT_ZOOM", Some("400%")),
            ("QUILL_CHROME_PATH", Some("   ")),
            ("QUILL_EXPORT_TRACE", Some("yes")),
        ]);
        assert_eq!(config.db_path, "/tmp/quill-config-test");
        assert_eq!(config.auto_save_interval, 0);
        assert!(!config.autosave_enabled());
        assert_eq!(config.default_zoom, MAX_ZOOM_PERCENT);
        assert_eq!(config.chrome_path, None);
        assert!(config.export_trace);
    }

    #[test]
    fn from_env_falls_back_on_garbage_values() {
        let config = config_with(&[
            ("QUILL_AUTOSAVE_INTERVAL", Some("soon")),
            ("QUILL_DEFAULT_ZOOM", Some("wide")),
            ("QUILL_ASSISTANT_REVEAL_MS", None),
        ]);
        assert_eq!(config.auto_save_interval, DEFAULT_AUTO_SAVE_INTERVAL_MS);
        assert_eq!(config.default_zoom, DEFAULT_ZOOM_PERCENT);
        assert_eq!(config.assistant_reveal_ms, DEFAULT_ASSISTANT_REVEAL_MS);
    }
}
