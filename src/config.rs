//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::path::PathBuf;

/// Default request body cap for uploads (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Storage configuration
    pub storage: StorageConfig,
    /// Upload limits
    pub upload: UploadConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding uploaded images
    pub upload_dir: PathBuf,
    /// Directory holding the static web UI
    pub public_dir: PathBuf,
}

/// Upload configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 3000,
                host: "0.0.0.0".to_string(),
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                public_dir: PathBuf::from("public"),
            },
            upload: UploadConfig {
                max_body_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.server.port),
                host: env::var("HOST").unwrap_or(defaults.server.host),
            },
            storage: StorageConfig {
                upload_dir: env::var_os("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.upload_dir),
                public_dir: env::var_os("PUBLIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.public_dir),
            },
            upload: UploadConfig {
                max_body_bytes: env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|b| b.parse().ok())
                    .unwrap_or(defaults.upload.max_body_bytes),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = ["PORT", "HOST", "UPLOAD_DIR", "PUBLIC_DIR", "MAX_UPLOAD_BYTES"];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.storage.public_dir, PathBuf::from("public"));
        assert_eq!(config.upload.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var("PORT", "8081");
        env::set_var("HOST", "127.0.0.1");
        env::set_var("UPLOAD_DIR", "/var/lib/captures");
        env::set_var("MAX_UPLOAD_BYTES", "1024");

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.server_addr(), "127.0.0.1:8081");
        assert_eq!(
            config.storage.upload_dir,
            PathBuf::from("/var/lib/captures")
        );
        assert_eq!(config.storage.public_dir, PathBuf::from("public"));
        assert_eq!(config.upload.max_body_bytes, 1024);
    }

    #[test]
    #[serial]
    fn test_invalid_port_falls_back_to_default() {
        clear_env();
        env::set_var("PORT", "not-a-port");

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.server.port, 3000);
    }
}
