//! Application configuration management.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The server and the player read separate settings; both honour `.env`.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Global server configuration instance.
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Default upload body limit (64 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding the shared song library.
    pub songs_folder: PathBuf,
    /// The single album art image served by `/api/art`.
    pub album_art: PathBuf,
    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json or pretty).
    pub log_format: LogFormat,
    /// Allowed CORS origins (comma-separated, or * for all).
    pub cors_origins: Vec<String>,
}

/// Player (client) configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the song server.
    pub server_url: String,
    /// Local directory the library is mirrored into.
    pub cache_folder: PathBuf,
    /// Where fetched album art is saved.
    pub art_file: PathBuf,
    /// Per-request timeout for remote calls.
    pub request_timeout: Duration,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json or pretty).
    pub log_format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable colored output.
    Pretty,
    /// JSON structured logging for production.
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if a numeric variable is set but invalid.
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port = env_or("PORT", "8080")
            .parse::<u16>()
            .expect("PORT must be a valid u16");

        let songs_folder = PathBuf::from(env_or("SONGS_FOLDER", "./songs"));
        let album_art = PathBuf::from(env_or("ALBUM_ART", "./album_art.png"));

        let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
            .map(|v| {
                v.parse::<usize>()
                    .expect("MAX_UPLOAD_BYTES must be a valid integer")
            })
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let log_level = env_or("LOG_LEVEL", "info");
        let log_format = LogFormat::from_env();

        let cors_origins = env_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host,
            port,
            songs_folder,
            album_art,
            max_upload_bytes,
            log_level,
            log_format,
            cors_origins,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns an error if the songs folder is missing or not a directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.songs_folder.exists() {
            return Err(ConfigError::SongsFolderNotFound(
                self.songs_folder.display().to_string(),
            ));
        }

        if !self.songs_folder.is_dir() {
            return Err(ConfigError::SongsFolderNotDirectory(
                self.songs_folder.display().to_string(),
            ));
        }

        if !self.album_art.is_file() {
            tracing::warn!(
                path = %self.album_art.display(),
                "Album art not found; /api/art will return 404"
            );
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidUploadLimit);
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ClientConfig {
    /// Load player configuration from environment variables.
    ///
    /// # Panics
    /// Panics if `REQUEST_TIMEOUT_SECS` is set but not an integer.
    pub fn from_env() -> Self {
        let server_url = env_or("SERVER_URL", "http://localhost:8080");
        let cache_folder = PathBuf::from(env_or("CACHE_FOLDER", "./cache"));
        let art_file = PathBuf::from(env_or("ART_FILE", "./album_art.img"));

        let timeout_secs = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .expect("REQUEST_TIMEOUT_SECS must be a valid integer");

        Self {
            server_url,
            cache_folder,
            art_file,
            request_timeout: Duration::from_secs(timeout_secs),
            log_level: env_or("LOG_LEVEL", "info"),
            log_format: LogFormat::from_env(),
        }
    }

    /// Validate the configuration, creating the cache folder if needed.
    ///
    /// # Errors
    /// Returns an error if the cache folder cannot be created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }

        if !self.cache_folder.exists() {
            std::fs::create_dir_all(&self.cache_folder).map_err(|e| {
                ConfigError::CacheFolderCreationFailed(self.cache_folder.display().to_string(), e)
            })?;
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Songs folder not found: {0}")]
    SongsFolderNotFound(String),

    #[error("Songs folder is not a directory: {0}")]
    SongsFolderNotDirectory(String),

    #[error("MAX_UPLOAD_BYTES must be greater than zero")]
    InvalidUploadLimit,

    #[error("REQUEST_TIMEOUT_SECS must be greater than zero")]
    InvalidTimeout,

    #[error("Failed to create cache folder '{0}': {1}")]
    CacheFolderCreationFailed(String, std::io::Error),
}

/// Initialize the global server configuration.
///
/// Should be called once at application startup.
pub fn init() -> &'static Config {
    CONFIG.get_or_init(|| {
        dotenvy::dotenv().ok();
        Config::from_env()
    })
}

/// Load the player configuration, reading `.env` first.
pub fn load_client() -> ClientConfig {
    dotenvy::dotenv().ok();
    ClientConfig::from_env()
}
