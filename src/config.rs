//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults (`~/Duplifiles/...`)
//! 2. TOML config file (platform config dir, or `--config`)
//! 3. Environment variables prefixed `DUPLICHECK_` (e.g. `DUPLICHECK_CACHE_FILE`)
//! 4. Command-line flags, applied by the caller
//!
//! The resolved [`Config`] is turned into a [`RunConfig`] for one scan root
//! and passed explicitly through the pipeline.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPLICHECK_";

/// Directory (under the home directory) holding the cache and the log.
pub const DATA_DIR_NAME: &str = "Duplifiles";

/// File name of the signature cache.
pub const CACHE_FILE_NAME: &str = ".file_hash_cache.json";

/// File name of the CSV action log.
pub const LOG_FILE_NAME: &str = "duplicate_cleanup_log.csv";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the JSON signature cache.
    pub cache_file: PathBuf,
    /// Location of the append-only CSV log.
    pub log_file: PathBuf,
    /// Number of hashing threads (1 = sequential).
    pub hash_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            cache_file: data_dir.join(CACHE_FILE_NAME),
            log_file: data_dir.join(LOG_FILE_NAME),
            hash_threads: 1,
        }
    }
}

/// `~/Duplifiles`, or `./Duplifiles` when no home directory is known.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    BaseDirs::new().map_or_else(
        || PathBuf::from(DATA_DIR_NAME),
        |dirs| dirs.home_dir().join(DATA_DIR_NAME),
    )
}

impl Config {
    /// Build the layered figment: defaults, TOML file, environment.
    ///
    /// `config_file` overrides the platform default location. A missing
    /// file contributes nothing.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = config_file
            .map(Path::to_path_buf)
            .or_else(|| Self::config_path().ok());
        if let Some(file) = file {
            log::debug!("Reading configuration from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the configuration from all layers.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file or an environment override is
    /// malformed.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(config_file)
            .extract()
            .context("Invalid configuration")?;
        Ok(config.normalized())
    }

    /// Get the default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform directories cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "duplicheck", "duplicheck")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Render as TOML, e.g. to seed a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    fn normalized(mut self) -> Self {
        self.hash_threads = self.hash_threads.max(1);
        self
    }

    /// Bind this configuration to a scan root.
    #[must_use]
    pub fn for_root(self, root: PathBuf) -> RunConfig {
        RunConfig {
            root,
            cache_file: self.cache_file,
            log_file: self.log_file,
            hash_threads: self.hash_threads.max(1),
            dry_run: false,
            quiet: false,
        }
    }
}

/// Everything one pipeline run needs, passed explicitly to each stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Directory to scan
    pub root: PathBuf,
    /// Signature cache location
    pub cache_file: PathBuf,
    /// Action log location
    pub log_file: PathBuf,
    /// Hashing threads
    pub hash_threads: usize,
    /// Report instead of deleting; the log is not touched
    pub dry_run: bool,
    /// Suppress console output other than errors
    pub quiet: bool,
}

impl RunConfig {
    /// Create a run configuration with explicit storage locations.
    #[must_use]
    pub fn new(root: &Path, cache_file: &Path, log_file: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            cache_file: cache_file.to_path_buf(),
            log_file: log_file.to_path_buf(),
            hash_threads: 1,
            dry_run: false,
            quiet: false,
        }
    }

    /// Set the number of hashing threads (minimum 1).
    #[must_use]
    pub fn with_hash_threads(mut self, threads: usize) -> Self {
        self.hash_threads = threads.max(1);
        self
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable or disable quiet console output.
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}
