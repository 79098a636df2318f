//! Application-level configuration loading: listening port and admin secret from
//! the environment, prank tuning and tick cadence from an optional JSON file.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use serde_with::{DurationMilliSeconds, DurationSeconds, serde_as};
use tracing::{info, warn};

use crate::state::state_machine::{ManualPrankMode, PrankRules};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SAW_TIMER_CONFIG_PATH";
/// Port used when neither `PORT` nor `SERVER_PORT` is set.
pub const DEFAULT_PORT: u16 = 3000;
/// Admin secret used when `ADMIN_KEY` is unset.
pub const DEFAULT_ADMIN_KEY: &str = "changeme";
/// Period of the tick engine.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// TCP port the HTTP server listens on.
    pub port: u16,
    /// Shared secret every controller command must carry.
    pub admin_key: String,
    /// Cadence of the tick engine.
    pub tick_interval: Duration,
    /// Prank sub-machine tuning.
    pub rules: PrankRules,
}

impl AppConfig {
    /// Load configuration from the environment and the optional config file,
    /// falling back to built-in defaults for anything missing or invalid.
    pub fn load() -> Self {
        let port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let admin_key = env::var("ADMIN_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| {
                warn!("ADMIN_KEY not set; using the built-in default key");
                DEFAULT_ADMIN_KEY.to_string()
            });

        let raw = read_raw_config(&resolve_config_path());
        Self::from_raw(port, admin_key, raw)
    }

    /// Merge a parsed config file over the defaults.
    fn from_raw(port: u16, admin_key: String, raw: RawConfig) -> Self {
        let defaults = PrankRules::default();
        let prank = raw.prank;
        let rules = PrankRules {
            threshold_seconds: prank.threshold_seconds.unwrap_or(defaults.threshold_seconds),
            freeze_display_seconds: prank
                .freeze_display_seconds
                .unwrap_or(defaults.freeze_display_seconds),
            freeze_window: prank.freeze_window.unwrap_or(defaults.freeze_window),
            jump_back_seconds: prank
                .jump_back_seconds
                .filter(|seconds| *seconds > 0)
                .unwrap_or(defaults.jump_back_seconds),
            manual_mode: prank.manual_mode.unwrap_or(defaults.manual_mode),
            manual_jump_seconds: prank
                .manual_jump_seconds
                .filter(|seconds| *seconds > 0)
                .unwrap_or(defaults.manual_jump_seconds),
        };

        let tick_interval = match raw.tick_interval {
            Some(interval) if interval.is_zero() => {
                warn!("tick interval must be positive; using default");
                DEFAULT_TICK_INTERVAL
            }
            Some(interval) => interval,
            None => DEFAULT_TICK_INTERVAL,
        };

        Self {
            port,
            admin_key,
            tick_interval,
            rules,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_raw(DEFAULT_PORT, DEFAULT_ADMIN_KEY.to_string(), RawConfig::default())
    }
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(rename = "tick_interval_ms")]
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    tick_interval: Option<Duration>,
    prank: RawPrankConfig,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// Prank tuning section of the configuration file.
struct RawPrankConfig {
    threshold_seconds: Option<u32>,
    freeze_display_seconds: Option<u32>,
    #[serde(rename = "freeze_window_seconds")]
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    freeze_window: Option<Duration>,
    jump_back_seconds: Option<u32>,
    manual_mode: Option<ManualPrankMode>,
    manual_jump_seconds: Option<u32>,
}

/// Read and parse the config file, logging and defaulting on any failure.
fn read_raw_config(path: &Path) -> RawConfig {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
            Ok(raw) => {
                info!(path = %path.display(), "loaded timer settings from config");
                raw
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse config; falling back to defaults"
                );
                RawConfig::default()
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                path = %path.display(),
                "config file not found; using built-in defaults"
            );
            RawConfig::default()
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "failed to read config; falling back to defaults"
            );
            RawConfig::default()
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AppConfig {
        let raw = serde_json::from_str::<RawConfig>(json).unwrap();
        AppConfig::from_raw(8080, "key".into(), raw)
    }

    #[test]
    fn empty_file_keeps_defaults() {
        let config = parse("{}");
        assert_eq!(config.port, 8080);
        assert_eq!(config.admin_key, "key");
        assert_eq!(config.tick_interval, DEFAULT_TICK_INTERVAL);
        assert_eq!(config.rules, PrankRules::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = parse(
            r#"{
                "tick_interval_ms": 500,
                "prank": {
                    "threshold_seconds": 120,
                    "freeze_display_seconds": 120,
                    "freeze_window_seconds": 30,
                    "jump_back_seconds": 300,
                    "manual_mode": "freeze"
                }
            }"#,
        );
        assert_eq!(config.tick_interval, Duration::from_millis(500));
        assert_eq!(config.rules.threshold_seconds, 120);
        assert_eq!(config.rules.freeze_display_seconds, 120);
        assert_eq!(config.rules.freeze_window, Duration::from_secs(30));
        assert_eq!(config.rules.jump_back_seconds, 300);
        assert_eq!(config.rules.manual_mode, ManualPrankMode::Freeze);
    }

    #[test]
    fn manual_prank_can_restart_the_countdown() {
        let config = parse(r#"{ "prank": { "manual_mode": "jump_to", "manual_jump_seconds": 90 } }"#);
        assert_eq!(config.rules.manual_mode, ManualPrankMode::JumpTo);
        assert_eq!(config.rules.manual_jump_seconds, 90);

        let config = parse(r#"{ "prank": { "manual_mode": "jump_to", "manual_jump_seconds": 0 } }"#);
        assert_eq!(config.rules.manual_jump_seconds, 60);
    }

    #[test]
    fn degenerate_values_fall_back() {
        let config = parse(r#"{ "tick_interval_ms": 0, "prank": { "jump_back_seconds": 0 } }"#);
        assert_eq!(config.tick_interval, DEFAULT_TICK_INTERVAL);
        assert_eq!(config.rules.jump_back_seconds, 240);
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.admin_key, "changeme");
        assert_eq!(config.tick_interval, Duration::from_millis(200));
    }
}
