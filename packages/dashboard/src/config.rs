//! Dashboard configuration.
//!
//! Settings are layered, later layers winning:
//!
//! 1. `config/default.toml`, embedded at compile time
//! 2. an optional TOML file named by `--config` or `GREEN_COVER_CONFIG`,
//!    which only needs the keys it overrides
//! 3. `BIND_ADDR`, `PORT`, `BACKEND_URL` and `MAPBOX_TOKEN`
//! 4. command line flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use green_cover_analytics_models::{InvalidThresholdsError, ZoneThresholds};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an override file.
pub const CONFIG_PATH_VAR: &str = "GREEN_COVER_CONFIG";

const DEFAULT_TOML: &str = include_str!("../config/default.toml");

/// Errors that can occur while building the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The override file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A layer is not valid TOML or does not match the settings shape.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting has an unusable value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// Setting name.
        key: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// The zone thresholds are inconsistent.
    #[error(transparent)]
    Thresholds(#[from] InvalidThresholdsError),
}

/// Map widget settings passed to the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    /// Map provider access token.
    #[serde(default)]
    pub token: Option<String>,
    /// Style URL.
    pub style: String,
    /// Initial `[lng, lat]`.
    pub center: [f64; 2],
    /// Initial zoom level.
    pub zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSettings {
    pub critical_below: f64,
    pub good_from: f64,
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Base URL of the green cover backend.
    pub backend_url: String,
    /// Per-request timeout for backend calls.
    pub request_timeout_secs: u64,
    pub map: MapSettings,
    pub thresholds: ThresholdSettings,
}

/// Command line overrides.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// TOML file with settings to override
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long)]
    pub bind_addr: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Base URL of the green cover backend
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Map provider access token
    #[arg(long)]
    pub mapbox_token: Option<String>,
}

impl DashboardConfig {
    /// The embedded defaults.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (this is a compile-time
    /// guarantee since the file is embedded).
    #[must_use]
    pub fn defaults() -> Self {
        toml::from_str(DEFAULT_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded default config: {e}"))
    }

    /// Builds the configuration from every layer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the override file cannot be read or
    /// parsed, or if the result fails validation.
    pub fn load(args: &ConfigArgs) -> Result<Self, ConfigError> {
        let file = args
            .config
            .clone()
            .or_else(|| std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from));

        let mut config = match file {
            Some(path) => Self::with_file(&path)?,
            None => Self::defaults(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_args(args);
        config.validate()?;

        log::debug!("Loaded configuration: {config:?}");
        Ok(config)
    }

    /// Defaults overlaid with the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn with_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Reading config overrides from {}", path.display());
        Self::with_overrides(&text)
    }

    /// Defaults overlaid with a partial TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `overrides` is not valid TOML or
    /// the merged document has the wrong shape.
    pub fn with_overrides(overrides: &str) -> Result<Self, ConfigError> {
        let mut base: toml::Table = toml::from_str(DEFAULT_TOML)?;
        let overrides: toml::Table = toml::from_str(overrides)?;
        merge_tables(&mut base, overrides);
        Ok(toml::Value::Table(base).try_into()?)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `PORT` is not a port number.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(bind_addr) = lookup("BIND_ADDR") {
            self.bind_addr = bind_addr;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "PORT",
                message: format!("{port:?}: {e}"),
            })?;
        }
        if let Some(backend_url) = lookup("BACKEND_URL") {
            self.backend_url = backend_url;
        }
        if let Some(token) = lookup("MAPBOX_TOKEN") {
            self.map.token = Some(token);
        }
        Ok(())
    }

    pub fn apply_args(&mut self, args: &ConfigArgs) {
        if let Some(bind_addr) = &args.bind_addr {
            self.bind_addr.clone_from(bind_addr);
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(backend_url) = &args.backend_url {
            self.backend_url.clone_from(backend_url);
        }
        if let Some(token) = &args.mapbox_token {
            self.map.token = Some(token.clone());
        }
    }

    /// Zone thresholds for the analytics panels.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Thresholds`] if they are out of order or
    /// outside `0..=100`.
    pub fn zone_thresholds(&self) -> Result<ZoneThresholds, ConfigError> {
        Ok(ZoneThresholds::new(
            self.thresholds.critical_below,
            self.thresholds.good_from,
        )?)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns the first problem found as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.zone_thresholds()?;

        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "backend_url",
                message: format!("{:?} is not an http(s) URL", self.backend_url),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                message: "must be positive".to_string(),
            });
        }
        let [lng, lat] = self.map.center;
        if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
            return Err(ConfigError::InvalidValue {
                key: "map.center",
                message: format!("[{lng}, {lat}] is not a longitude/latitude pair"),
            });
        }
        if !(0.0..=24.0).contains(&self.map.zoom) {
            return Err(ConfigError::InvalidValue {
                key: "map.zoom",
                message: format!("{} is outside 0..=24", self.map.zoom),
            });
        }
        if self.map.token.as_deref().is_none_or(str::is_empty) {
            log::warn!("No map token configured; the map will not load");
        }

        Ok(())
    }
}

/// Recursively overlays `overrides` onto `base`. Nested tables merge key by
/// key; any other value replaces the base value.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_tables(existing, nested);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn embedded_defaults_are_valid() {
        let config = DashboardConfig::defaults();
        config.validate().unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.map.center, [76.7794, 30.7333]);
        assert!((config.map.zoom - 11.0).abs() < f64::EPSILON);
        assert_eq!(config.zone_thresholds().unwrap(), ZoneThresholds::default());
    }

    #[test]
    fn partial_file_overrides_only_its_keys() {
        let config = DashboardConfig::with_overrides(
            r#"
            port = 9000

            [thresholds]
            critical_below = 30.0
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert!((config.thresholds.critical_below - 30.0).abs() < f64::EPSILON);
        assert!((config.thresholds.good_from - 52.0).abs() < f64::EPSILON);
        assert_eq!(config.map.style, "mapbox://styles/mapbox/satellite-v9");
    }

    #[test]
    fn wrong_type_in_file_is_a_parse_error() {
        assert!(matches!(
            DashboardConfig::with_overrides("port = \"eighty\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides_defaults() {
        let vars: BTreeMap<&str, &str> = [
            ("PORT", "4100"),
            ("BACKEND_URL", "http://backend:8080"),
            ("MAPBOX_TOKEN", "pk.test"),
        ]
        .into_iter()
        .collect();
        let mut config = DashboardConfig::defaults();

        config
            .apply_env(|key| vars.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.port, 4100);
        assert_eq!(config.backend_url, "http://backend:8080");
        assert_eq!(config.map.token.as_deref(), Some("pk.test"));
        assert_eq!(config.bind_addr, "127.0.0.1");
    }

    #[test]
    fn bad_port_env_is_rejected() {
        let mut config = DashboardConfig::defaults();
        let err = config
            .apply_env(|key| (key == "PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
    }

    #[test]
    fn args_win_over_env() {
        let mut config = DashboardConfig::defaults();
        config
            .apply_env(|key| (key == "PORT").then(|| "4100".to_string()))
            .unwrap();

        config.apply_args(&ConfigArgs {
            port: Some(5100),
            ..ConfigArgs::default()
        });

        assert_eq!(config.port, 5100);
    }

    #[test]
    fn inverted_thresholds_fail_validation() {
        let config = DashboardConfig::with_overrides(
            "[thresholds]\ncritical_below = 60.0\ngood_from = 40.0\n",
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Thresholds(_))));
    }

    #[test]
    fn non_http_backend_fails_validation() {
        let mut config = DashboardConfig::defaults();
        config.backend_url = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                key: "backend_url",
                ..
            })
        ));
    }
}
