use crate::error::ExporterError;
use figment::{
    Figment,
    providers::{Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_OUTPUT_DIR: &str = "NODE_EXPORTER_DIR";
pub const ENV_SPEEDTEST_COMMAND: &str = "SPEEDTEST_COMMAND";
pub const ENV_WEATHER_API_URL: &str = "WEATHER_API_URL";
pub const ENV_WEATHER_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_WEATHER_LOCATION: &str = "WEATHER_LOCATION";

/// Process-wide exporter configuration, resolved once at start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExporterConfig {
    /// Directory scraped by the node exporter textfile collector.
    #[serde(default = "default_output_dir")]
    pub node_exporter_dir: PathBuf,
    #[serde(default = "default_speedtest_command")]
    pub speedtest_command: String,
    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,
    #[serde(default)]
    pub weather_api_key: Option<String>,
    #[serde(default)]
    pub weather_location: Option<String>,
}

/// Credentials required by the weather source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherCredentials {
    pub api_key: String,
    pub location: String,
}

/// Environment overrides, kept as raw strings.
///
/// figment's `Env` provider parses values, which turns a location such as
/// `02134` into the integer `2134`.
#[derive(Debug, Default, Serialize)]
struct EnvOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    node_exporter_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speedtest_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weather_api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weather_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weather_location: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            node_exporter_dir: var(ENV_OUTPUT_DIR),
            speedtest_command: var(ENV_SPEEDTEST_COMMAND),
            weather_api_url: var(ENV_WEATHER_API_URL),
            weather_api_key: var(ENV_WEATHER_API_KEY),
            weather_location: var(ENV_WEATHER_LOCATION),
        }
    }
}

// ── Defaults ──────────────────────────────────────────────────

fn default_output_dir() -> PathBuf { PathBuf::from("/var/lib/prometheus/node-exporter") }
fn default_speedtest_command() -> String { "speedtest".into() }
fn default_weather_api_url() -> String { "https://api.weatherapi.com/v1/current.json".into() }

// ── Impls ─────────────────────────────────────────────────────

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            node_exporter_dir: default_output_dir(),
            speedtest_command: default_speedtest_command(),
            weather_api_url: default_weather_api_url(),
            weather_api_key: None,
            weather_location: None,
        }
    }
}

impl ExporterConfig {
    /// Load defaults, then an optional YAML file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ExporterError> {
        let mut figment = Figment::from(Serialized::defaults(ExporterConfig::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(ExporterError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            tracing::debug!(path = %path.display(), "Loading config file");
            figment = figment.merge(Yaml::file(path));
        }
        let figment = figment.merge(Serialized::defaults(EnvOverrides::from_env()));
        Self::from_figment(&figment)
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, ExporterError> {
        Ok(figment.extract()?)
    }

    /// Override the output directory (e.g. from the command line).
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.node_exporter_dir = dir.into();
        self
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.node_exporter_dir.join(file_name)
    }

    /// Both weather variables, checked key first.
    pub fn require_weather(&self) -> Result<WeatherCredentials, ExporterError> {
        let api_key = self
            .weather_api_key
            .clone()
            .ok_or(ExporterError::MissingEnv(ENV_WEATHER_API_KEY))?;
        let location = self
            .weather_location
            .clone()
            .ok_or(ExporterError::MissingEnv(ENV_WEATHER_LOCATION))?;
        Ok(WeatherCredentials { api_key, location })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    // ── Default values ────────────────────────────────────────────

    #[test]
    fn default_config_has_expected_values() {
        let cfg = ExporterConfig::default();
        assert_eq!(
            cfg.node_exporter_dir,
            PathBuf::from("/var/lib/prometheus/node-exporter")
        );
        assert_eq!(cfg.speedtest_command, "speedtest");
        assert_eq!(cfg.weather_api_url, "https://api.weatherapi.com/v1/current.json");
        assert!(cfg.weather_api_key.is_none());
        assert!(cfg.weather_location.is_none());
    }

    #[test]
    fn output_path_joins_dir_and_file() {
        let cfg = ExporterConfig::default().with_output_dir("/tmp/prom");
        assert_eq!(
            cfg.output_path("speedtest.prom"),
            PathBuf::from("/tmp/prom/speedtest.prom")
        );
    }

    // ── require_weather() ─────────────────────────────────────────

    #[test]
    fn require_weather_reports_missing_key_first() {
        let cfg = ExporterConfig::default();
        let err = cfg.require_weather().unwrap_err();
        assert_eq!(err.to_string(), "Need to specify WEATHER_API_KEY");
    }

    #[test]
    fn require_weather_reports_missing_location() {
        let cfg = ExporterConfig {
            weather_api_key: Some("k".into()),
            ..ExporterConfig::default()
        };
        let err = cfg.require_weather().unwrap_err();
        assert!(matches!(err, ExporterError::MissingEnv(ENV_WEATHER_LOCATION)));
    }

    #[test]
    fn require_weather_returns_both_values() {
        let cfg = ExporterConfig {
            weather_api_key: Some("k".into()),
            weather_location: Some("London".into()),
            ..ExporterConfig::default()
        };
        let creds = cfg.require_weather().unwrap();
        assert_eq!(creds.api_key, "k");
        assert_eq!(creds.location, "London");
    }

    // ── load() ────────────────────────────────────────────────────

    #[test]
    fn load_without_file_or_env_uses_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = ExporterConfig::load(None).unwrap();
            assert_eq!(cfg, ExporterConfig::default());
            Ok(())
        });
    }

    #[test]
    fn load_reads_environment() {
        Jail::expect_with(|jail| {
            jail.set_env(ENV_OUTPUT_DIR, "/srv/textfiles");
            jail.set_env(ENV_WEATHER_API_KEY, "secret");
            jail.set_env(ENV_WEATHER_LOCATION, "02134");
            let cfg = ExporterConfig::load(None).unwrap();
            assert_eq!(cfg.node_exporter_dir, PathBuf::from("/srv/textfiles"));
            assert_eq!(cfg.weather_api_key.as_deref(), Some("secret"));
            assert_eq!(cfg.weather_location.as_deref(), Some("02134"));
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "promfile.yaml",
                "node_exporter_dir: /from/file\nspeedtest_command: /opt/speedtest\n",
            )?;
            jail.set_env(ENV_OUTPUT_DIR, "/from/env");
            let cfg = ExporterConfig::load(Some(Path::new("promfile.yaml"))).unwrap();
            assert_eq!(cfg.node_exporter_dir, PathBuf::from("/from/env"));
            assert_eq!(cfg.speedtest_command, "/opt/speedtest");
            Ok(())
        });
    }

    #[test]
    fn load_missing_config_file_is_config_error() {
        Jail::expect_with(|_jail| {
            let err = ExporterConfig::load(Some(Path::new("/nonexistent/promfile.yaml")))
                .unwrap_err();
            assert!(matches!(err, ExporterError::Config(_)));
            Ok(())
        });
    }
}
