use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::catalogue::DEFAULT_IMAGE_PREFIX;

#[derive(Debug, Default, Parser)]
#[command(
    name = "filmoteca-rs",
    version,
    about = "Film catalogue with admin editing and role-based accounts"
)]
pub struct Cli {
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,

    #[arg(long, visible_alias = "public-dir", value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub database: DatabaseConfig,
    pub auto_migrate: bool,
    pub static_dir: Option<PathBuf>,
    pub image_prefix: String,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst_size: u32,
}

/// The governor replenishes at millisecond granularity.
pub const MAX_REQUESTS_PER_SECOND: u64 = 1000;

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 20,
            burst_size: 50,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid duration for {key}: {value}")]
    InvalidDuration { key: String, value: String },
    #[error("rate_limit.per_second must be between 1 and {max}, got {value}")]
    InvalidRateLimit { value: u64, max: u64 },
    #[error("invalid boolean value for env var {key}: {value}")]
    InvalidEnvBool { key: String, value: String },
    #[error("invalid value for env var {key}: not unicode")]
    InvalidEnvString { key: String },
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind: Option<SocketAddr>,
    auto_migrate: Option<bool>,
    #[serde(alias = "public_dir")]
    static_dir: Option<PathBuf>,
    image_prefix: Option<String>,
    #[serde(default)]
    database: FileDatabaseConfig,
    #[serde(default)]
    rate_limit: FileRateLimitConfig,
}

#[derive(Debug, Default, Deserialize)]
struct FileDatabaseConfig {
    url: Option<String>,
    max_connections: Option<u32>,
    acquire_timeout: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileRateLimitConfig {
    per_second: Option<u64>,
    burst_size: Option<u32>,
}

/// Values taken from the process environment.
#[derive(Debug, Default)]
struct EnvConfig {
    database_url: Option<String>,
    auto_migrate: Option<bool>,
}

const DEFAULT_DATABASE_URL: &str = "sqlite://filmoteca.db";
const DEFAULT_ACQUIRE_TIMEOUT: &str = "5s";

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let from_file = read_file_config(cli.config.as_deref())?;
        let from_env = read_env_config()?;
        Self::merge(cli, from_file, from_env)
    }

    /// Precedence: CLI, then environment, then file, then defaults.
    fn merge(cli: Cli, file: FileConfig, env: EnvConfig) -> Result<Self, ConfigError> {
        let bind = cli
            .bind
            .or(file.bind)
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
        let url = cli
            .database_url
            .or(env.database_url)
            .or(file.database.url)
            .unwrap_or_else(|| String::from(DEFAULT_DATABASE_URL));
        let raw_timeout = file
            .database
            .acquire_timeout
            .unwrap_or_else(|| String::from(DEFAULT_ACQUIRE_TIMEOUT));
        let acquire_timeout = humantime::parse_duration(&raw_timeout).map_err(|_| {
            ConfigError::InvalidDuration {
                key: String::from("database.acquire_timeout"),
                value: raw_timeout.clone(),
            }
        })?;
        let defaults = RateLimitConfig::default();
        let per_second = file
            .rate_limit
            .per_second
            .unwrap_or(defaults.per_second)
            .max(1);
        if per_second > MAX_REQUESTS_PER_SECOND {
            return Err(ConfigError::InvalidRateLimit {
                value: per_second,
                max: MAX_REQUESTS_PER_SECOND,
            });
        }

        Ok(Self {
            bind,
            database: DatabaseConfig {
                url,
                max_connections: file.database.max_connections.unwrap_or(5).max(1),
                acquire_timeout,
            },
            auto_migrate: env.auto_migrate.or(file.auto_migrate).unwrap_or(true),
            static_dir: cli.static_dir.or(file.static_dir),
            image_prefix: file
                .image_prefix
                .unwrap_or_else(|| String::from(DEFAULT_IMAGE_PREFIX)),
            rate_limit: RateLimitConfig {
                per_second,
                burst_size: file
                    .rate_limit
                    .burst_size
                    .unwrap_or(defaults.burst_size)
                    .max(1),
            },
        })
    }
}

fn read_file_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn read_env_config() -> Result<EnvConfig, ConfigError> {
    Ok(EnvConfig {
        database_url: read_env_string("FILMOTECA_DATABASE_URL")?,
        auto_migrate: read_env_bool("FILMOTECA_AUTO_MIGRATE")?,
    })
}

fn read_env_string(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnvString {
            key: String::from(key),
        }),
    }
}

fn read_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => parse_bool_value(key, &value).map(Some),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnvBool {
            key: String::from(key),
            value: String::from("<non-unicode>"),
        }),
    }
}

fn parse_bool_value(key: &str, raw: &str) -> Result<bool, ConfigError> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvBool {
            key: String::from(key),
            value: String::from(raw),
        }),
    }
}
