//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Filesystem path of the SQLite database.
    /// Env: `DATABASE_PATH`
    /// Default: platform data directory (e.g. `~/.local/share/vink/vink.db`).
    pub database_path: Option<PathBuf>,

    /// Filesystem path where uploaded blobs are stored.
    /// Env: `BLOB_STORAGE_PATH`
    /// Default: `./blobs`
    pub blob_storage_path: PathBuf,

    /// Base URL clients can reach this server on; used to mint blob URLs.
    /// Env: `PUBLIC_BASE_URL`
    /// Default: `http://localhost:8080`
    pub public_base_url: String,

    /// Maximum upload size in bytes (50 MiB).
    /// Env: `MAX_UPLOAD_SIZE`
    pub max_upload_size: usize,

    /// How often the background reaper purges expired records.
    /// Env: `REAPER_INTERVAL_SECS`
    /// Default: `86400` (daily)
    pub reaper_interval: Duration,

    /// Comma-separated list of allowed CORS origins.
    /// Env: `ALLOWED_ORIGINS`
    /// Default: empty (any origin allowed).
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            database_path: None,
            blob_storage_path: PathBuf::from("./blobs"),
            public_base_url: "http://localhost:8080".to_string(),
            max_upload_size: 50 * 1024 * 1024, // 50 MiB
            reaper_interval: Duration::from_secs(24 * 60 * 60),
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(
                    value = %addr,
                    "Invalid HTTP_ADDR, using default"
                );
            }
        }

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("BLOB_STORAGE_PATH") {
            config.blob_storage_path = PathBuf::from(path);
        }

        if let Ok(url) = std::env::var("PUBLIC_BASE_URL") {
            config.public_base_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(val) = std::env::var("MAX_UPLOAD_SIZE") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_upload_size = n;
            } else {
                tracing::warn!(
                    value = %val,
                    "Invalid MAX_UPLOAD_SIZE, using default"
                );
            }
        }

        if let Ok(val) = std::env::var("REAPER_INTERVAL_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                config.reaper_interval = Duration::from_secs(secs);
            } else {
                tracing::warn!(
                    value = %val,
                    "Invalid REAPER_INTERVAL_SECS, using default"
                );
            }
        }

        if let Ok(val) = std::env::var("ALLOWED_ORIGINS") {
            config.allowed_origins = parse_origins(&val);
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

/// Split a comma-separated origin list, dropping empty entries.
fn parse_origins(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.max_upload_size, 50 * 1024 * 1024);
        assert_eq!(config.reaper_interval, Duration::from_secs(86400));
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins("http://localhost:3000, https://vanish.example.com,");
        assert_eq!(
            origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://vanish.example.com".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(parse_origins("").is_empty());
    }
}
