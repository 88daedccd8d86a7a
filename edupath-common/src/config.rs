//! Bootstrap configuration
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (each flag can also come from an environment variable)
//! 2. TOML config file (`--config`, else `~/.config/edupath/edupath.toml`)
//! 3. Compiled defaults
//!
//! A missing default config file is not an error: the service warns and
//! starts on defaults. An explicitly named file that cannot be read is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Minimum HS256 secret length accepted for session tokens
pub const MIN_SESSION_SECRET_LEN: usize = 32;

pub const DEFAULT_PORT: u16 = 5780;

pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

pub const DEFAULT_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Optional JSON file of reference data loaded at startup
    #[serde(default)]
    pub seed_file: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub prediction: PredictionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Session token signing
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub secret: String,

    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,
}

/// External identity provider (ID token verification)
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub project_id: String,

    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,

    #[serde(default = "default_issuer_prefix")]
    pub issuer_prefix: String,

    /// How long fetched signing keys are reused
    #[serde(default = "default_key_cache_seconds")]
    pub key_cache_seconds: u64,
}

/// Hosted prediction endpoints and local recommendation assets
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    #[serde(default)]
    pub numeric_url: String,

    #[serde(default)]
    pub embedding_url: String,

    /// Bearer token sent to both endpoints
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// WordPiece vocabulary, one token per line
    #[serde(default = "default_tokenizer_vocab")]
    pub tokenizer_vocab: PathBuf,

    #[serde(default = "default_max_len")]
    pub max_len: usize,

    /// Lower-case and strip accents before WordPiece (uncased models)
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,

    /// JSON `{labels, features}` reference matrix for text recommendations
    #[serde(default = "default_reference_matrix")]
    pub reference_matrix: PathBuf,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_text_top_k")]
    pub text_top_k: usize,
}

fn default_database_path() -> PathBuf {
    default_data_dir().join("edupath.db")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ttl_minutes() -> i64 {
    60 * 24 * 8
}

fn default_jwks_url() -> String {
    DEFAULT_JWKS_URL.to_string()
}

fn default_issuer_prefix() -> String {
    DEFAULT_ISSUER_PREFIX.to_string()
}

fn default_key_cache_seconds() -> u64 {
    3600
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_tokenizer_vocab() -> PathBuf {
    default_data_dir().join("vocab.txt")
}

fn default_max_len() -> usize {
    128
}

fn default_lowercase() -> bool {
    true
}

fn default_reference_matrix() -> PathBuf {
    default_data_dir().join("reference_matrix.json")
}

fn default_top_k() -> usize {
    10
}

fn default_text_top_k() -> usize {
    5
}

/// OS-dependent data directory (`~/.local/share/edupath` on Linux)
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("edupath"))
        .unwrap_or_else(|| PathBuf::from("./edupath_data"))
}

/// Per-user config file location (`~/.config/edupath/edupath.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("edupath").join("edupath.toml"))
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_minutes: default_ttl_minutes(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            jwks_url: default_jwks_url(),
            issuer_prefix: default_issuer_prefix(),
            key_cache_seconds: default_key_cache_seconds(),
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            numeric_url: String::new(),
            embedding_url: String::new(),
            access_token: None,
            timeout_seconds: default_timeout_seconds(),
            tokenizer_vocab: default_tokenizer_vocab(),
            max_len: default_max_len(),
            lowercase: default_lowercase(),
            reference_matrix: default_reference_matrix(),
            top_k: default_top_k(),
            text_top_k: default_text_top_k(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            host: default_host(),
            port: default_port(),
            seed_file: None,
            logging: LoggingConfig::default(),
            session: SessionConfig::default(),
            identity: IdentityConfig::default(),
            prediction: PredictionConfig::default(),
        }
    }
}

/// Command-line (or environment) values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub session_secret: Option<String>,
    pub seed_file: Option<PathBuf>,
    pub prediction_access_token: Option<String>,
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration
    ///
    /// With an explicit path the file must exist and parse. Without one the
    /// default location is tried and compiled defaults are used if it is absent.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
            })?;
            let config = Self::from_toml_str(&content)?;
            info!("Loaded configuration from {}", path.display());
            return Ok(config);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                let config = Self::from_toml_str(&content)?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Some(path) => {
                warn!("Config file not found at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply command-line/environment overrides
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(path) = overrides.database_path {
            self.database_path = path;
        }
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(secret) = overrides.session_secret {
            self.session.secret = secret;
        }
        if let Some(seed) = overrides.seed_file {
            self.seed_file = Some(seed);
        }
        if let Some(token) = overrides.prediction_access_token {
            self.prediction.access_token = Some(token);
        }
        self
    }

    /// Reject configurations the service cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.session.secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(Error::Config(format!(
                "session.secret must be at least {} characters",
                MIN_SESSION_SECRET_LEN
            )));
        }
        if self.session.ttl_minutes <= 0 {
            return Err(Error::Config("session.ttl_minutes must be positive".to_string()));
        }
        if self.identity.project_id.is_empty() {
            return Err(Error::Config(
                "identity.project_id is required to verify ID tokens".to_string(),
            ));
        }
        if self.prediction.numeric_url.is_empty() || self.prediction.embedding_url.is_empty() {
            return Err(Error::Config(
                "prediction.numeric_url and prediction.embedding_url are required".to_string(),
            ));
        }
        if self.prediction.top_k == 0 || self.prediction.text_top_k == 0 {
            return Err(Error::Config("prediction top_k values must be positive".to_string()));
        }
        Ok(())
    }
}
