//! Configuration loading and constants.
//!
//! Loads application configuration from an optional TOML file and defines
//! constants for HTTP cache headers, logging, and default paths. Every setting
//! has a default, so the service runs without any file at all.

use const_format::formatcp;
use serde::Deserialize;
use std::path::Path;

use crate::probes::{ProbeOptions, DEFAULT_MAX_DELAY_SECONDS, DEFAULT_MIN_DELAY_SECONDS};

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Static assets - short cache, the lab image is rebuilt often
pub const HTTP_CACHE_STATIC_MAX_AGE: u32 = 300;

/// Probe and info responses must never be served from a cache
pub const CACHE_CONTROL_PROBE: &str = "no-store";

pub const CACHE_CONTROL_STATIC: &str = formatcp!("public, max-age={}", HTTP_CACHE_STATIC_MAX_AGE);

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default HTTP listen address
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default HTTP port, overridden by `PORT`
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Environment variable overriding the HTTP port
pub const PORT_ENV: &str = "PORT";

/// Environment variable holding the reported application version
pub const APP_VERSION_ENV: &str = "APP_VERSION";

/// Version reported when `APP_VERSION` is not set
pub const DEFAULT_APP_VERSION: &str = "dev";

/// Default application name reported by `/info`
pub const DEFAULT_APP_NAME: &str = "kube-lab-image";

/// Directory for static files, relative to the working directory
pub const STATIC_DIR: &str = "public";

/// Service account namespace file mounted into Kubernetes pods
pub const NAMESPACE_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "kube_probe_lab=info,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Probe delay bounds
    #[serde(default)]
    pub probes: ProbeConfig,
    #[serde(default)]
    pub static_files: StaticFilesConfig,
    #[serde(default)]
    pub app: AppInfoConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }
}

/// Probe delay bounds in seconds. Out-of-range values are clamped, not rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "ProbeConfig::default_min_delay")]
    pub min_delay_seconds: i64,
    #[serde(default = "ProbeConfig::default_max_delay")]
    pub max_delay_seconds: i64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            min_delay_seconds: Self::default_min_delay(),
            max_delay_seconds: Self::default_max_delay(),
        }
    }
}

impl ProbeConfig {
    fn default_min_delay() -> i64 {
        DEFAULT_MIN_DELAY_SECONDS
    }

    fn default_max_delay() -> i64 {
        DEFAULT_MAX_DELAY_SECONDS
    }

    pub fn options(&self) -> ProbeOptions {
        ProbeOptions {
            min_delay_seconds: Some(self.min_delay_seconds),
            max_delay_seconds: Some(self.max_delay_seconds),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// Directory served at `/`, with `index.html` for directories
    #[serde(default = "StaticFilesConfig::default_dir")]
    pub dir: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
        }
    }
}

impl StaticFilesConfig {
    fn default_dir() -> String {
        STATIC_DIR.to_string()
    }
}

/// Identity reported by `/info`
#[derive(Debug, Clone, Deserialize)]
pub struct AppInfoConfig {
    #[serde(default = "AppInfoConfig::default_name")]
    pub name: String,
    /// Populated from `APP_VERSION` at load time
    #[serde(skip_deserializing, default = "AppInfoConfig::default_version")]
    pub version: String,
    /// Path of the service account namespace file
    #[serde(default = "AppInfoConfig::default_namespace_path")]
    pub namespace_path: String,
}

impl Default for AppInfoConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            version: Self::default_version(),
            namespace_path: Self::default_namespace_path(),
        }
    }
}

impl AppInfoConfig {
    fn default_name() -> String {
        DEFAULT_APP_NAME.to_string()
    }

    fn default_version() -> String {
        DEFAULT_APP_VERSION.to_string()
    }

    fn default_namespace_path() -> String {
        NAMESPACE_PATH.to_string()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from `path` (or defaults when `None`), then apply
    /// `PORT` and `APP_VERSION` from the process environment.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Like [`AppConfig::load`] with an explicit environment lookup.
    pub fn load_with_env<P, F>(path: Option<P>, env: F) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                toml::from_str(&contents)?
            }
            None => AppConfig::default(),
        };

        if let Some(port) = env(PORT_ENV).filter(|p| !p.is_empty()) {
            config.http.port = port.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("{PORT_ENV} must be a port number, got {port:?}"))
            })?;
        }

        if let Some(version) = env(APP_VERSION_ENV).filter(|v| !v.is_empty()) {
            config.app.version = version;
        }

        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load_with_env(None::<&str>, env_from(&[])).unwrap();
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.probes.min_delay_seconds, 15);
        assert_eq!(config.probes.max_delay_seconds, 60);
        assert_eq!(config.static_files.dir, "public");
        assert_eq!(config.app.name, "kube-lab-image");
        assert_eq!(config.app.version, "dev");
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_env_overrides() {
        let env = env_from(&[("PORT", "9090"), ("APP_VERSION", "1.2.3")]);
        let config = AppConfig::load_with_env(None::<&str>, env).unwrap();
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.app.version, "1.2.3");
    }

    #[test]
    fn test_invalid_port_env() {
        let env = env_from(&[("PORT", "eighty")]);
        let err = AppConfig::load_with_env(None::<&str>, env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[probes]\nmin_delay_seconds = -3\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = AppConfig::load_with_env(Some(file.path()), env_from(&[])).unwrap();
        assert_eq!(config.probes.min_delay_seconds, -3);
        assert_eq!(config.probes.max_delay_seconds, 60);
        assert_eq!(config.http.port, 8080);
        assert!(config.logging.is_json());

        let options = config.probes.options();
        assert_eq!(options.min_delay_seconds, Some(-3));
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::load_with_env(Some("/nonexistent/probe-lab.toml"), env_from(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = \"not a number\"").unwrap();
        let err = AppConfig::load_with_env(Some(file.path()), env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
