//! Configuration management for the archive upload server

use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::archive::DEFAULT_MAX_MULTIPART_MEMORY;

/// Errors raised while reading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory that receives `<name>.zip` archives
    pub upload_dir: PathBuf,
    /// Directory served as static assets at `/`
    pub public_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Bytes of file content held in memory per request before spilling to disk
    pub max_multipart_memory: usize,
    /// Request body cap; `None` disables the limit
    pub max_body_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                public_dir: PathBuf::from("public"),
            },
            upload: UploadConfig {
                max_multipart_memory: DEFAULT_MAX_MULTIPART_MEMORY,
                max_body_size: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("SERVER_PORT")?.unwrap_or(8080),
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("uploads")),
                public_dir: env::var("PUBLIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("public")),
            },
            upload: UploadConfig {
                max_multipart_memory: parse_var("MAX_MULTIPART_MEMORY")?
                    .unwrap_or(DEFAULT_MAX_MULTIPART_MEMORY),
                max_body_size: parse_var("MAX_BODY_SIZE")?,
            },
        })
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Read an optional numeric variable; unset or empty means `None`
fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        _ => Ok(None),
    }
}
