//! Configuration module for foldersync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.
//! Command-line flags are layered on top by the daemon.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{errors::DomainError, roots::MirrorRoots};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for foldersync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Mirroring settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Directory tree to mirror from. Required, usually given on the command line.
    pub source: Option<PathBuf>,
    /// Directory tree to mirror into. Required, created on the first pass if absent.
    pub replica: Option<PathBuf>,
    /// Minimum number of seconds between the starts of two passes.
    pub interval_secs: u64,
    /// What to do with a replica entry whose source counterpart cannot be inspected.
    pub inaccessible_source: InaccessibleSourcePolicy,
}

/// Policy for replica entries whose source counterpart exists but cannot be inspected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InaccessibleSourcePolicy {
    /// Keep the replica entry and log an error.
    #[default]
    PreserveReplica,
    /// Treat the source as deleted and remove the replica entry.
    TreatAsAbsent,
}

impl std::fmt::Display for InaccessibleSourcePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InaccessibleSourcePolicy::PreserveReplica => "preserve_replica",
            InaccessibleSourcePolicy::TreatAsAbsent => "treat_as_absent",
        };
        write!(f, "{}", s)
    }
}

/// Logging / tracing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Path to the log file. Records are appended; console output is kept as well.
    pub file: PathBuf,
}

// ---------------------------------------------------------------------------
// Config::load()
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
    /// Typically `$XDG_CONFIG_HOME/foldersync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("foldersync")
            .join("config.yaml")
    }

    /// Resolve relative roots and log file against `base` (usually the working directory).
    pub fn absolutize(&mut self, base: &Path) {
        fn resolve(path: &Path, base: &Path) -> PathBuf {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        }

        if let Some(source) = self.sync.source.as_deref() {
            self.sync.source = Some(resolve(source, base));
        }
        if let Some(replica) = self.sync.replica.as_deref() {
            self.sync.replica = Some(resolve(replica, base));
        }
        self.logging.file = resolve(&self.logging.file, base);
    }

    /// Build the validated root pair from `sync.source` and `sync.replica`.
    pub fn roots(&self) -> Result<MirrorRoots, DomainError> {
        let source = self
            .sync
            .source
            .clone()
            .ok_or_else(|| DomainError::ValidationFailed("sync.source is not set".into()))?;
        let replica = self
            .sync
            .replica
            .clone()
            .ok_or_else(|| DomainError::ValidationFailed("sync.replica is not set".into()))?;
        MirrorRoots::new(source, replica)
    }

    /// The pass interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.sync.interval_secs)
    }
}

// ---------------------------------------------------------------------------
// Config::default()
// ---------------------------------------------------------------------------

// Config derives Default because all its fields implement Default.
// (clippy::derivable_impls)

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: None,
            replica: None,
            interval_secs: 60,
            inaccessible_source: InaccessibleSourcePolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("foldersync");
        Self {
            level: "info".to_string(),
            file: data_dir.join("foldersync.log"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.interval_secs"`.
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
    /// Checks are lexical only; filesystem preconditions (existence and
    /// permissions of the roots) are verified at daemon startup.
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        for (field, value) in [
            ("sync.source", &self.sync.source),
            ("sync.replica", &self.sync.replica),
        ] {
            match value {
                None => errors.push(ValidationError {
                    field: field.into(),
                    message: "is required".into(),
                }),
                Some(path) if !path.is_absolute() => errors.push(ValidationError {
                    field: field.into(),
                    message: format!("must be an absolute path: {}", path.display()),
                }),
                Some(_) => {}
            }
        }

        if let (Some(source), Some(replica)) = (&self.sync.source, &self.sync.replica) {
            if source.is_absolute() && replica.is_absolute() {
                if let Err(e) = MirrorRoots::new(source.clone(), replica.clone()) {
                    errors.push(ValidationError {
                        field: "sync.replica".into(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if self.sync.interval_secs == 0 {
            errors.push(ValidationError {
                field: "sync.interval_secs".into(),
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
        if self.logging.file.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "logging.file".into(),
                message: "must not be empty".into(),
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
/// use foldersync_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .sync_source(PathBuf::from("/srv/data"))
///     .sync_replica(PathBuf::from("/mnt/backup/data"))
///     .sync_interval_secs(30)
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

    /// Start from an existing configuration, e.g. one loaded from disk.
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    // --- sync ---

    pub fn sync_source(mut self, source: PathBuf) -> Self {
        self.config.sync.source = Some(source);
        self
    }

    pub fn sync_replica(mut self, replica: PathBuf) -> Self {
        self.config.sync.replica = Some(replica);
        self
    }

    pub fn sync_interval_secs(mut self, seconds: u64) -> Self {
        self.config.sync.interval_secs = seconds;
        self
    }

    pub fn sync_inaccessible_source(mut self, policy: InaccessibleSourcePolicy) -> Self {
        self.config.sync.inaccessible_source = policy;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_file(mut self, file: PathBuf) -> Self {
        self.config.logging.file = file;
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
