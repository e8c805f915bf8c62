//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for Formatki clients.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server_url: String,
    pub timeout_secs: u64,
    pub state_dir: PathBuf,
    pub remember_email: bool,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String, home: Option<PathBuf>) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn resolve_home_dir(lookup: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(home) = non_blank("HOME") {
        return Some(PathBuf::from(home));
    }

    // Windows USERPROFILE (standard)
    if let Some(profile) = non_blank("USERPROFILE") {
        return Some(PathBuf::from(profile));
    }

    // Windows legacy HOMEDRIVE + HOMEPATH
    if let (Some(drive), Some(path)) = (non_blank("HOMEDRIVE"), non_blank("HOMEPATH")) {
        return Some(PathBuf::from(format!("{}{}", drive, path)));
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

impl Config {
    /// Load configuration from process environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map-backed closure instead of
    /// mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let server_url = lookup("FORMATKI_SERVER")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let timeout_secs = lookup("FORMATKI_TIMEOUT_SECS")
            .and_then(|value| value.trim().parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let home = resolve_home_dir(&lookup);
        let state_dir = match lookup("FORMATKI_STATE_DIR") {
            Some(dir) if !dir.trim().is_empty() => expand_tilde(dir, home),
            _ => home
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cache")
                .join("formatki"),
        };
        let remember_email = lookup("FORMATKI_REMEMBER_EMAIL")
            .and_then(|value| parse_env_flag(&value))
            .unwrap_or(true);

        Self {
            server_url,
            timeout_secs,
            state_dir,
            remember_email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_env_flag, Config};
    use crate::constants::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
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
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[("HOME", "/home/anna")]);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.state_dir, PathBuf::from("/home/anna/.cache/formatki"));
        assert!(config.remember_email);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            ("HOME", "/home/anna"),
            ("FORMATKI_SERVER", " http://10.0.0.5:8080 "),
            ("FORMATKI_TIMEOUT_SECS", "5"),
            ("FORMATKI_STATE_DIR", "~/state"),
            ("FORMATKI_REMEMBER_EMAIL", "off"),
        ]);
        assert_eq!(config.server_url, "http://10.0.0.5:8080");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.state_dir, PathBuf::from("/home/anna/state"));
        assert!(!config.remember_email);
    }

    #[test]
    fn unusable_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("HOME", "/home/anna"),
            ("FORMATKI_SERVER", "   "),
            ("FORMATKI_TIMEOUT_SECS", "0"),
            ("FORMATKI_REMEMBER_EMAIL", "maybe"),
        ]);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.remember_email);
    }

    #[test]
    fn windows_profile_is_used_without_home() {
        let config = config_from(&[("USERPROFILE", "C:\\Users\\anna")]);
        assert_eq!(
            config.state_dir,
            PathBuf::from("C:\\Users\\anna").join(".cache").join("formatki")
        );
    }
}
