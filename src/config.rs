//! Server configuration.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! environment variables, then command-line flags (applied by the caller).

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::leaderboard::DEFAULT_SCAN_LIMIT;

/// Environment variable naming the database file.
pub const DB_PATH_ENV: &str = "TICTACTOE_DB_PATH";

/// Older name for [`DB_PATH_ENV`], still honored.
pub const LEGACY_DB_PATH_ENV: &str = "DB_PATH";

/// Environment variable naming the bind host.
pub const HOST_ENV: &str = "TICTACTOE_HOST";

/// Environment variable naming the bind port.
pub const PORT_ENV: &str = "TICTACTOE_PORT";

/// Configuration for the HTTP server and its store.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,

    /// SQLite database file.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// How long a connection waits for the write lock, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    busy_timeout_ms: u64,

    /// Upper bound on finished games scanned per leaderboard request.
    #[serde(default = "default_leaderboard_scan_limit")]
    leaderboard_scan_limit: i64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "./data/tictactoe.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_leaderboard_scan_limit() -> i64 {
    DEFAULT_SCAN_LIMIT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            leaderboard_scan_limit: default_leaderboard_scan_limit(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or holds
    /// invalid values.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(db_path = %config.db_path, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the optional file, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file or an environment value is invalid.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// `TICTACTOE_DB_PATH` wins over the legacy `DB_PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `TICTACTOE_PORT` is not a port number.
    #[instrument(skip(self, lookup))]
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = lookup(DB_PATH_ENV).or_else(|| lookup(LEGACY_DB_PATH_ENV)) {
            debug!(db_path = %path, "Database path from environment");
            self.db_path = path;
        }
        if let Some(host) = lookup(HOST_ENV) {
            self.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port.parse().map_err(|_| {
                warn!(value = %port, "Invalid port in environment");
                ConfigError::new(format!("{} must be a port number, got '{}'", PORT_ENV, port))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an override is invalid, such as an empty
    /// database path.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        db_path: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(db_path) = db_path {
            self.db_path = db_path;
        }
        self.validate()?;
        Ok(self)
    }

    /// Returns the busy timeout as a [`Duration`].
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.trim().is_empty() {
            return Err(ConfigError::new("db_path must not be empty".to_string()));
        }
        if self.leaderboard_scan_limit <= 0 {
            return Err(ConfigError::new(
                "leaderboard_scan_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
