//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Which backend holds persisted sessions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// One JSON record per session on disk, survives restarts
    File,
    /// Process memory only, lost on restart
    Memory,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Simulated seconds per wall-clock second
    pub time_acceleration: u32,

    /// Session persistence backend
    pub store_backend: StoreBackend,
    /// Directory holding session records for the file backend
    pub session_dir: PathBuf,

    /// Allowed client origins for CORS, any origin when empty
    pub client_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let time_acceleration = match env::var("TIME_ACCELERATION") {
            Ok(raw) => parse_time_acceleration(&raw)?,
            Err(_) => 1,
        };

        let store_backend = match env::var("SESSION_STORE") {
            Ok(raw) => parse_store_backend(&raw)?,
            Err(_) => StoreBackend::File,
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            time_acceleration,

            store_backend,
            session_dir: env::var("SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./sessions")),

            client_origins: env::var("CLIENT_ORIGIN")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_level: "info".to_string(),
            time_acceleration: 1,
            store_backend: StoreBackend::File,
            session_dir: PathBuf::from("./sessions"),
            client_origins: Vec::new(),
        }
    }
}

fn parse_time_acceleration(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(factor) if factor >= 1 => Ok(factor),
        _ => Err(ConfigError::Invalid {
            name: "TIME_ACCELERATION",
            value: raw.to_string(),
        }),
    }
}

fn parse_store_backend(raw: &str) -> Result<StoreBackend, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "file" => Ok(StoreBackend::File),
        "memory" => Ok(StoreBackend::Memory),
        _ => Err(ConfigError::Invalid {
            name: "SESSION_STORE",
            value: raw.to_string(),
        }),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("Invalid server address format")]
    InvalidAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_acceleration_must_be_positive() {
        assert_eq!(parse_time_acceleration("4").unwrap(), 4);
        assert!(parse_time_acceleration("0").is_err());
        assert!(parse_time_acceleration("fast").is_err());
    }

    #[test]
    fn store_backend_is_case_insensitive() {
        assert_eq!(parse_store_backend("Memory").unwrap(), StoreBackend::Memory);
        assert_eq!(parse_store_backend(" file ").unwrap(), StoreBackend::File);
        assert!(parse_store_backend("sqlite").is_err());
    }

    #[test]
    fn origins_skip_blanks() {
        assert_eq!(
            parse_origins("http://a.test, ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
