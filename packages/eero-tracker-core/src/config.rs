//! Tracker configuration.
//!
//! Loaded with priority: environment variable (API URL only), then
//! `~/.config/eero-tracker/config.toml`, then defaults. A missing config
//! file is fine; every field has a default.

use crate::api::DEFAULT_API_URL;
use crate::error::ConfigError;
use crate::tracker::ScanFilters;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Floor for the scan interval. Anything faster is a courtesy problem for
/// eero's servers and is clamped, not rejected.
pub const MINIMUM_SCAN_INTERVAL_SECS: u64 = 25;

/// Default session file name inside the config directory.
const DEFAULT_SESSION_FILE: &str = "eero.session";

/// Environment variable overriding the API base URL.
const ENV_API_URL: &str = "EERO_TRACKER_API_URL";

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    tracker: Option<TrackerSection>,
    api: Option<ApiSection>,
}

#[derive(Debug, Deserialize, Default)]
struct TrackerSection {
    /// Seconds between polls; clamped to the minimum.
    scan_interval: Option<u64>,
    /// Comma-separated MAC allow-list, case-insensitive.
    only_macs: Option<String>,
    /// Network-ID allow-list.
    only_networks: Option<Vec<u64>>,
    /// Track only wireless devices (default true).
    only_wireless: Option<bool>,
    /// Session token file path.
    session_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiSection {
    base_url: Option<String>,
}

/// Where the API base URL came from, for the `config` command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigSource {
    Default,
    Environment,
    ConfigFile,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::ConfigFile => write!(f, "config file"),
        }
    }
}

/// Effective tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub scan_interval: Duration,
    pub only_macs: String,
    pub only_networks: Vec<u64>,
    pub only_wireless: bool,
    pub session_file: PathBuf,
    pub api_url: String,
    pub api_source: ConfigSource,
}

impl TrackerConfig {
    pub fn filters(&self) -> ScanFilters {
        ScanFilters::new(&self.only_macs, &self.only_networks, self.only_wireless)
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|p| p.join("eero-tracker"))
}

/// Path of the configuration file.
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

pub fn config_file_path_string() -> String {
    config_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "~/.config/eero-tracker/config.toml".to_string())
}

/// Load the effective configuration.
///
/// Unreadable or unparsable config files are reported as errors; a missing
/// file is not.
pub fn load_config() -> Result<TrackerConfig, ConfigError> {
    let file = match config_file_path() {
        Some(path) if path.exists() => {
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let parsed = toml::from_str(&content)
                .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
            tracing::debug!("Loaded config from {:?}", path);
            parsed
        }
        _ => ConfigFile::default(),
    };

    let env_api_url = std::env::var(ENV_API_URL)
        .ok()
        .map(|u| u.trim().trim_end_matches('/').to_string())
        .filter(|u| !u.is_empty());

    Ok(resolve(file, env_api_url))
}

/// Merge the parsed file with the environment override and defaults.
fn resolve(file: ConfigFile, env_api_url: Option<String>) -> TrackerConfig {
    let tracker = file.tracker.unwrap_or_default();
    let api = file.api.unwrap_or_default();

    let requested = tracker.scan_interval.unwrap_or(MINIMUM_SCAN_INTERVAL_SECS);
    let scan_interval_secs = if requested < MINIMUM_SCAN_INTERVAL_SECS {
        tracing::warn!(
            "Scan interval {}s MUST be >= {}s to prevent hammering eero's servers; limiting to {}s",
            requested,
            MINIMUM_SCAN_INTERVAL_SECS,
            MINIMUM_SCAN_INTERVAL_SECS
        );
        MINIMUM_SCAN_INTERVAL_SECS
    } else {
        requested
    };

    let session_file = tracker.session_file.unwrap_or_else(|| {
        config_dir()
            .map(|p| p.join(DEFAULT_SESSION_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE))
    });

    let (api_url, api_source) = match (env_api_url, api.base_url) {
        (Some(url), _) => {
            tracing::info!("Using API URL from environment variable: {}", url);
            (url, ConfigSource::Environment)
        }
        (None, Some(url)) => {
            let url = url.trim().trim_end_matches('/').to_string();
            if url.is_empty() {
                (DEFAULT_API_URL.to_string(), ConfigSource::Default)
            } else {
                tracing::info!("Using API URL from config file: {}", url);
                (url, ConfigSource::ConfigFile)
            }
        }
        (None, None) => (DEFAULT_API_URL.to_string(), ConfigSource::Default),
    };

    TrackerConfig {
        scan_interval: Duration::from_secs(scan_interval_secs),
        only_macs: tracker.only_macs.unwrap_or_default(),
        only_networks: tracker.only_networks.unwrap_or_default(),
        only_wireless: tracker.only_wireless.unwrap_or(true),
        session_file,
        api_url,
        api_source,
    }
}

/// Example config file content, printed by the `config` command.
pub fn generate_example_config() -> String {
    r#"# eero tracker configuration
# Place this file at: ~/.config/eero-tracker/config.toml

[tracker]
# Seconds between polls. Values below 25 are clamped to 25.
# scan_interval = 30

# Comma-separated MAC allow-list (case-insensitive). Empty = track everything.
# only_macs = "AA:BB:CC:DD:EE:FF, 11:22:33:44:55:66"

# Network-ID allow-list. Empty = all networks on the account.
# only_networks = [1234]

# Track only wireless devices (default true).
# only_wireless = true

# Session token file (default: ~/.config/eero-tracker/eero.session).
# session_file = "/var/lib/eero-tracker/eero.session"

[api]
# API endpoint override, e.g. for a local stub.
# base_url = "https://api-user.e2ro.com/2.2"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ConfigFile {
        toml::from_str(content).expect("test config should parse")
    }

    #[test]
    fn test_defaults() {
        let config = resolve(ConfigFile::default(), None);
        assert_eq!(config.scan_interval, Duration::from_secs(MINIMUM_SCAN_INTERVAL_SECS));
        assert_eq!(config.only_macs, "");
        assert!(config.only_networks.is_empty());
        assert!(config.only_wireless);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.api_source, ConfigSource::Default);
    }

    #[test]
    fn test_interval_clamped_to_minimum() {
        let file = parse("[tracker]\nscan_interval = 5\n");
        let config = resolve(file, None);
        assert_eq!(config.scan_interval, Duration::from_secs(MINIMUM_SCAN_INTERVAL_SECS));

        let file = parse("[tracker]\nscan_interval = 60\n");
        let config = resolve(file, None);
        assert_eq!(config.scan_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_tracker_section_parsed() {
        let file = parse(
            r#"
            [tracker]
            scan_interval = 30
            only_macs = "AA:BB:CC:DD:EE:FF"
            only_networks = [1234, 5678]
            only_wireless = false
            session_file = "/tmp/eero.session"
            "#,
        );
        let config = resolve(file, None);
        assert_eq!(config.scan_interval, Duration::from_secs(30));
        assert_eq!(config.only_macs, "AA:BB:CC:DD:EE:FF");
        assert_eq!(config.only_networks, vec![1234, 5678]);
        assert!(!config.only_wireless);
        assert_eq!(config.session_file, PathBuf::from("/tmp/eero.session"));
    }

    #[test]
    fn test_env_overrides_config_file() {
        let file = parse("[api]\nbase_url = \"https://stub.local/2.2\"\n");
        let config = resolve(file, Some("https://env.local/2.2".to_string()));
        assert_eq!(config.api_url, "https://env.local/2.2");
        assert_eq!(config.api_source, ConfigSource::Environment);
    }

    #[test]
    fn test_config_file_api_url() {
        let file = parse("[api]\nbase_url = \"https://stub.local/2.2/\"\n");
        let config = resolve(file, None);
        assert_eq!(config.api_url, "https://stub.local/2.2");
        assert_eq!(config.api_source, ConfigSource::ConfigFile);
    }

    #[test]
    fn test_example_config_is_valid_toml() {
        let _: ConfigFile = toml::from_str(&generate_example_config()).expect("example parses");
    }
}
