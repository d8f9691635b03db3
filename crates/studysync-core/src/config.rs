//! Configuration module for studysync.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, defaults, and a builder pattern for
//! programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::GenerationTag;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for the studysync offline layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub router: RouterConfig,
    pub backend: BackendConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Durable store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file. `None` uses the platform default
    /// under the user data directory.
    pub db_file: Option<PathBuf>,
}

/// Request router settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Origin the application shell is served from.
    pub app_origin: String,
    /// Current cache-generation tag; bump on every deployment.
    pub generation: String,
    /// Ordered path prefixes making up the static-asset allow-list.
    pub static_assets: Vec<String>,
    /// API endpoint prefixes (paths or absolute URLs) served network-first.
    pub api_prefixes: Vec<String>,
    /// File extensions treated as cacheable assets.
    pub asset_extensions: Vec<String>,
    /// Path of the offline fallback document within the app origin.
    pub offline_document: String,
}

/// Hosted backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the hosted backend.
    pub base_url: String,
    /// API key sent with every backend request. `None` for anonymous access.
    pub api_key: Option<String>,
}

/// Reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between scheduled reconciliation runs when the platform has
    /// no background-sync facility. `0` disables the fallback timer.
    pub poll_interval: u64,
    /// Seconds between connectivity probes.
    pub probe_interval: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for StorageConfig {
    fn default() -> Self {
        Self { db_file: None }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            app_origin: "http://localhost:8080".to_string(),
            generation: "v1".to_string(),
            static_assets: vec![
                "/".to_string(),
                "/dashboard".to_string(),
                "/upload".to_string(),
                "/library".to_string(),
                "/profile".to_string(),
                "/offline.html".to_string(),
                "/manifest.json".to_string(),
            ],
            api_prefixes: vec!["/api/".to_string()],
            asset_extensions: vec![
                "js", "css", "png", "jpg", "jpeg", "gif", "svg", "woff", "woff2",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            offline_document: "/offline.html".to_string(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: None,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: 300,
            probe_interval: 15,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/studysync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("studysync")
            .join("config.yaml")
    }

    /// Platform-appropriate default path for the database file.
    pub fn default_db_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studysync")
            .join("studysync.db")
    }

    /// The database path to use: the configured one or the default.
    pub fn db_path(&self) -> PathBuf {
        self.storage
            .db_file
            .clone()
            .unwrap_or_else(Self::default_db_path)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"router.generation"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- router ---
        if Url::parse(&self.router.app_origin).is_err() {
            errors.push(ValidationError {
                field: "router.app_origin".into(),
                message: format!("not a valid URL: {}", self.router.app_origin),
            });
        }
        if GenerationTag::new(self.router.generation.clone()).is_err() {
            errors.push(ValidationError {
                field: "router.generation".into(),
                message: format!("invalid generation tag '{}'", self.router.generation),
            });
        }
        if self.router.static_assets.is_empty() {
            errors.push(ValidationError {
                field: "router.static_assets".into(),
                message: "must list at least one app-shell path".into(),
            });
        }
        for path in &self.router.static_assets {
            if !path.starts_with('/') {
                errors.push(ValidationError {
                    field: "router.static_assets".into(),
                    message: format!("path '{path}' must start with '/'"),
                });
            }
        }
        if !self.router.offline_document.starts_with('/') {
            errors.push(ValidationError {
                field: "router.offline_document".into(),
                message: "must be an absolute path within the app origin".into(),
            });
        }
        for prefix in &self.router.api_prefixes {
            let is_path = prefix.starts_with('/');
            let is_url = Url::parse(prefix).is_ok();
            if !is_path && !is_url {
                errors.push(ValidationError {
                    field: "router.api_prefixes".into(),
                    message: format!("'{prefix}' must be a path prefix or absolute URL"),
                });
            }
        }

        // --- backend ---
        if Url::parse(&self.backend.base_url).is_err() {
            errors.push(ValidationError {
                field: "backend.base_url".into(),
                message: format!("not a valid URL: {}", self.backend.base_url),
            });
        }

        // --- sync ---
        if self.sync.probe_interval == 0 {
            errors.push(ValidationError {
                field: "sync.probe_interval".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use studysync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .backend_base_url("https://project.example.co")
///     .router_generation("v2")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- storage ---

    pub fn storage_db_file(mut self, path: PathBuf) -> Self {
        self.config.storage.db_file = Some(path);
        self
    }

    // --- router ---

    pub fn router_app_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.router.app_origin = origin.into();
        self
    }

    pub fn router_generation(mut self, generation: impl Into<String>) -> Self {
        self.config.router.generation = generation.into();
        self
    }

    pub fn router_static_assets(mut self, assets: Vec<String>) -> Self {
        self.config.router.static_assets = assets;
        self
    }

    pub fn router_api_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.config.router.api_prefixes = prefixes;
        self
    }

    pub fn router_offline_document(mut self, path: impl Into<String>) -> Self {
        self.config.router.offline_document = path.into();
        self
    }

    // --- backend ---

    pub fn backend_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.backend.base_url = url.into();
        self
    }

    pub fn backend_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.backend.api_key = Some(key.into());
        self
    }

    // --- sync ---

    pub fn sync_poll_interval(mut self, seconds: u64) -> Self {
        self.config.sync.poll_interval = seconds;
        self
    }

    pub fn sync_probe_interval(mut self, seconds: u64) -> Self {
        self.config.sync.probe_interval = seconds;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert_eq!(cfg.router.generation, "v1");
        assert!(cfg.router.static_assets.contains(&"/dashboard".to_string()));
        assert!(cfg
            .router
            .static_assets
            .contains(&"/offline.html".to_string()));
        assert_eq!(cfg.router.offline_document, "/offline.html");
        assert!(cfg.router.asset_extensions.contains(&"woff2".to_string()));
        assert_eq!(cfg.router.api_prefixes, vec!["/api/".to_string()]);
        assert_eq!(cfg.sync.poll_interval, 300);
        assert_eq!(cfg.sync.probe_interval, 15);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.storage.db_file.is_none());
        assert!(cfg.backend.api_key.is_none());
    }

    #[test]
    fn default_config_passes_validation() {
        let cfg = Config::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "unexpected validation errors: {errors:?}");
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
storage:
  db_file: /tmp/studysync-test.db
router:
  app_origin: https://study.example.com
  generation: v7
  static_assets: ["/", "/dashboard", "/offline.html"]
  api_prefixes: ["/api/", "https://project.example.co/rest/v1/"]
  asset_extensions: ["js", "css", "png"]
  offline_document: /offline.html
backend:
  base_url: https://project.example.co
  api_key: "anon-key-123"
sync:
  poll_interval: 120
  probe_interval: 10
logging:
  level: debug
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(
            cfg.storage.db_file,
            Some(PathBuf::from("/tmp/studysync-test.db"))
        );
        assert_eq!(cfg.router.app_origin, "https://study.example.com");
        assert_eq!(cfg.router.generation, "v7");
        assert_eq!(cfg.router.api_prefixes.len(), 2);
        assert_eq!(cfg.backend.api_key, Some("anon-key-123".to_string()));
        assert_eq!(cfg.sync.poll_interval, 120);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn load_or_default_returns_default_on_missing_file() {
        let cfg = Config::load_or_default(Path::new("/nonexistent/config.yaml"));
        assert_eq!(cfg.sync.probe_interval, 15);
    }

    #[test]
    fn load_returns_error_on_invalid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(b"not: [valid: yaml: {{{").unwrap();
        tmp.flush().unwrap();

        let result = Config::load(tmp.path());
        assert!(result.is_err());
    }

    // -- Validation --

    #[test]
    fn validate_catches_bad_generation() {
        let mut cfg = Config::default();
        cfg.router.generation = "has spaces".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "router.generation"));
    }

    #[test]
    fn validate_catches_empty_allow_list() {
        let mut cfg = Config::default();
        cfg.router.static_assets.clear();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "router.static_assets"));
    }

    #[test]
    fn validate_catches_relative_asset_path() {
        let mut cfg = Config::default();
        cfg.router.static_assets.push("dashboard".to_string());
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "router.static_assets" && e.message.contains("dashboard")));
    }

    #[test]
    fn validate_catches_bad_api_prefix() {
        let mut cfg = Config::default();
        cfg.router.api_prefixes.push("not a url".to_string());
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "router.api_prefixes"));
    }

    #[test]
    fn validate_catches_invalid_urls() {
        let mut cfg = Config::default();
        cfg.router.app_origin = "nonsense".to_string();
        cfg.backend.base_url = "also nonsense".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "router.app_origin"));
        assert!(errors.iter().any(|e| e.field == "backend.base_url"));
    }

    #[test]
    fn validate_catches_zero_probe_interval() {
        let mut cfg = Config::default();
        cfg.sync.probe_interval = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "sync.probe_interval"));
    }

    #[test]
    fn validate_allows_zero_poll_interval() {
        // 0 disables the scheduled-reconciliation fallback; that is valid.
        let mut cfg = Config::default();
        cfg.sync.poll_interval = 0;
        let errors = cfg.validate();
        assert!(!errors.iter().any(|e| e.field == "sync.poll_interval"));
    }

    #[test]
    fn validate_catches_invalid_log_level() {
        let mut cfg = Config::default();
        cfg.logging.level = "verbose".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "logging.level"));
    }

    #[test]
    fn validate_accepts_all_valid_log_levels() {
        for level in VALID_LOG_LEVELS {
            let mut cfg = Config::default();
            cfg.logging.level = level.to_string();
            let errors = cfg.validate();
            assert!(
                !errors.iter().any(|e| e.field == "logging.level"),
                "level '{level}' should be valid"
            );
        }
    }

    // -- Builder --

    #[test]
    fn builder_starts_from_defaults() {
        let cfg = ConfigBuilder::new().build();
        assert_eq!(cfg.router.generation, "v1");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = ConfigBuilder::new()
            .storage_db_file(PathBuf::from("/custom/db.sqlite"))
            .router_app_origin("https://study.example.com")
            .router_generation("v9")
            .router_static_assets(vec!["/".into(), "/offline.html".into()])
            .router_api_prefixes(vec!["/api/".into()])
            .router_offline_document("/offline.html")
            .backend_base_url("https://project.example.co")
            .backend_api_key("key")
            .sync_poll_interval(60)
            .sync_probe_interval(5)
            .logging_level("trace")
            .build();

        assert_eq!(cfg.storage.db_file, Some(PathBuf::from("/custom/db.sqlite")));
        assert_eq!(cfg.router.app_origin, "https://study.example.com");
        assert_eq!(cfg.router.generation, "v9");
        assert_eq!(cfg.router.static_assets.len(), 2);
        assert_eq!(cfg.backend.base_url, "https://project.example.co");
        assert_eq!(cfg.backend.api_key, Some("key".to_string()));
        assert_eq!(cfg.sync.poll_interval, 60);
        assert_eq!(cfg.sync.probe_interval, 5);
        assert_eq!(cfg.logging.level, "trace");
    }

    #[test]
    fn builder_build_validated_fails_for_invalid_config() {
        let result = ConfigBuilder::new()
            .router_generation("bad tag!")
            .logging_level("nope")
            .build_validated();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.len() >= 2);
    }

    // -- default paths --

    #[test]
    fn default_path_ends_with_config_yaml() {
        let p = Config::default_path();
        assert!(p.ends_with("studysync/config.yaml"));
    }

    #[test]
    fn db_path_prefers_configured_file() {
        let mut cfg = Config::default();
        assert!(cfg.db_path().ends_with("studysync/studysync.db"));
        cfg.storage.db_file = Some(PathBuf::from("/tmp/x.db"));
        assert_eq!(cfg.db_path(), PathBuf::from("/tmp/x.db"));
    }
}
