//! Service configuration loaded from `engine_support.toml`.
//!
//! Only ambient settings live here (listen address, logging). Threshold
//! values are certification data and stay compiled in; see
//! `types::thresholds`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::validation::{validate_unknown_keys, ValidationWarning};

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "ENGINE_SUPPORT_CONFIG";
/// Env var overriding `server.addr`.
pub const SERVER_ADDR_ENV: &str = "ENGINE_SUPPORT_SERVER_ADDR";
/// File looked for in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "engine_support.toml";

/// Top-level configuration.
///
/// Search order:
/// 1. `--config <path>` (errors are fatal)
/// 2. `$ENGINE_SUPPORT_CONFIG`
/// 3. `./engine_support.toml`
/// 4. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address for `serve`.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Largest accepted request body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_addr() -> String {
    "127.0.0.1:8080".to_string()
}

const fn default_max_body_bytes() -> usize {
    16 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

// ============================================================================
// Logging
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` wins when set.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// When set, audit events are also appended here as JSON lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_file: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            audit_file: None,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Env(PathBuf),
    Local(PathBuf),
    Defaults,
}

/// What happened while loading. Config is read before the subscriber exists,
/// so everything worth logging is kept here and emitted by [`LoadReport::log`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub source: ConfigSource,
    pub warnings: Vec<ValidationWarning>,
    /// Config files that were found but skipped, with the reason.
    pub skipped: Vec<String>,
}

impl LoadReport {
    const fn new(source: ConfigSource) -> Self {
        Self {
            source,
            warnings: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn log(&self) {
        for skipped in &self.skipped {
            warn!("{skipped}");
        }
        for w in &self.warnings {
            warn!(field = %w.field, "{w}");
        }
        match &self.source {
            ConfigSource::Explicit(p) => info!(path = %p.display(), "Loaded config from --config"),
            ConfigSource::Env(p) => info!(path = %p.display(), "Loaded config from {CONFIG_ENV}"),
            ConfigSource::Local(p) => info!(path = %p.display(), "Loaded config from working directory"),
            ConfigSource::Defaults => info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults"),
        }
    }
}

impl AppConfig {
    /// Load using the standard search order, then apply env overrides.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, LoadReport), ConfigError> {
        let env_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let (mut config, report) =
            Self::search(explicit, env_path.as_deref(), Path::new(LOCAL_CONFIG_FILE))?;

        if let Ok(addr) = std::env::var(SERVER_ADDR_ENV) {
            config.server.addr = addr;
            config.validate()?;
        }
        Ok((config, report))
    }

    /// Search order with every location passed in.
    ///
    /// An explicit path must load. The env and local candidates fall back to
    /// the next step on failure.
    pub fn search(
        explicit: Option<&Path>,
        env_path: Option<&Path>,
        local: &Path,
    ) -> Result<(Self, LoadReport), ConfigError> {
        if let Some(path) = explicit {
            let (config, warnings) = Self::load_from_file(path)?;
            let mut report = LoadReport::new(ConfigSource::Explicit(path.to_path_buf()));
            report.warnings = warnings;
            return Ok((config, report));
        }

        let mut skipped = Vec::new();

        if let Some(path) = env_path {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok((config, warnings)) => {
                        let mut report = LoadReport::new(ConfigSource::Env(path.to_path_buf()));
                        report.warnings = warnings;
                        return Ok((config, report));
                    }
                    Err(e) => skipped.push(format!("{e}; falling back")),
                }
            } else {
                skipped.push(format!(
                    "{CONFIG_ENV} points to non-existent file {}; falling back",
                    path.display()
                ));
            }
        }

        if local.exists() {
            match Self::load_from_file(local) {
                Ok((config, warnings)) => {
                    let mut report = LoadReport::new(ConfigSource::Local(local.to_path_buf()));
                    report.warnings = warnings;
                    report.skipped = skipped;
                    return Ok((config, report));
                }
                Err(e) => skipped.push(format!("{e}; using defaults")),
            }
        }

        let mut report = LoadReport::new(ConfigSource::Defaults);
        report.skipped = skipped;
        Ok((Self::default(), report))
    }

    /// Load and validate one TOML file. Unknown keys are returned as warnings.
    pub fn load_from_file(path: &Path) -> Result<(Self, Vec<ValidationWarning>), ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        let warnings = validate_unknown_keys(&contents);
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok((config, warnings))
    }

    /// Check every setting, collecting all problems.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.addr '{}' is not a valid socket address (expected host:port)",
                self.server.addr
            ));
        }
        if self.server.max_body_bytes == 0 {
            errors.push("server.max_body_bytes must be greater than zero".to_string());
        }
        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.logging.level) {
            errors.push(format!(
                "logging.level '{}' is not a valid filter: {e}",
                self.logging.level
            ));
        }
        if self
            .logging
            .audit_file
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            errors.push("logging.audit_file must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Parsed listen address. Only valid after [`AppConfig::validate`].
    pub fn server_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.addr.parse().map_err(|_| {
            ConfigError::Validation(vec![format!(
                "server.addr '{}' is not a valid socket address",
                self.server.addr
            )])
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Config I/O error ({}): {e}", path.display()),
            Self::Parse(path, e) => write!(f, "Config parse error ({}): {e}", path.display()),
            Self::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_defaults_validate() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:8080");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.audit_file.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let f = write_toml("[logging]\nformat = \"json\"\n");
        let (config, warnings) = AppConfig::load_from_file(f.path()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_typo_is_warning_not_error() {
        let f = write_toml("[server]\nadr = \"0.0.0.0:1\"\n");
        let (config, warnings) = AppConfig::load_from_file(f.path()).unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:8080");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].suggestion.as_deref(), Some("server.addr"));
    }

    #[test]
    fn test_bad_addr_rejected() {
        let f = write_toml("[server]\naddr = \"localhost\"\n");
        let err = AppConfig::load_from_file(f.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e[0].contains("server.addr")));
    }

    #[test]
    fn test_unknown_format_is_parse_error() {
        let f = write_toml("[logging]\nformat = \"xml\"\n");
        let err = AppConfig::load_from_file(f.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(..)));
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = AppConfig::default();
        config.server.addr = "nope".into();
        config.server.max_body_bytes = 0;
        match config.validate().unwrap_err() {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_explicit_path_errors_are_fatal() {
        let missing = Path::new("/definitely/not/here/engine_support.toml");
        let err = AppConfig::search(Some(missing), None, Path::new("unused.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn test_env_path_wins_over_local() {
        let env = write_toml("[server]\naddr = \"0.0.0.0:9001\"\n");
        let local = write_toml("[server]\naddr = \"0.0.0.0:9002\"\n");
        let (config, report) = AppConfig::search(None, Some(env.path()), local.path()).unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:9001");
        assert_eq!(report.source, ConfigSource::Env(env.path().to_path_buf()));
    }

    #[test]
    fn test_broken_env_file_falls_back_to_local() {
        let env = write_toml("[server\n");
        let local = write_toml("[server]\naddr = \"0.0.0.0:9002\"\n");
        let (config, report) = AppConfig::search(None, Some(env.path()), local.path()).unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:9002");
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.source, ConfigSource::Local(_)));
    }

    #[test]
    fn test_nothing_found_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, report) =
            AppConfig::search(None, None, &dir.path().join("engine_support.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(report.source, ConfigSource::Defaults);
        assert!(report.skipped.is_empty());
    }
}
