//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/bootcamp-service/config.toml`).
//! Every section and field has a default, so a partial file or no file at
//! all yields a runnable configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR: &str = "bootcamp-service";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Default config path: `<config dir>/bootcamp-service/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub security: SecurityConfig,
    pub uploads: UploadsConfig,
    pub geocoder: GeocoderConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&raw)?
        } else {
            AppConfig::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            if !secret.is_empty() {
                self.security.jwt_secret = secret;
            }
        }
    }

    pub fn is_production(&self) -> bool {
        self.server.environment.eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            environment: "development".to_string(),
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://./bootcamps.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub cookie_expire_days: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_hours: 720,
            cookie_expire_days: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    /// Served as static files at `/`
    pub public_dir: PathBuf,
    /// Where bootcamp photos are written
    pub dir: PathBuf,
    /// Bytes
    pub max_file_size: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("./public"),
            dir: PathBuf::from("./public/uploads"),
            max_file_size: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderProvider {
    #[default]
    None,
    Mapquest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub provider: GeocoderProvider,
    pub api_key: String,
    pub base_url: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            provider: GeocoderProvider::None,
            api_key: String::new(),
            base_url: "https://www.mapquestapi.com/geocoding/v1/address".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            name: "Admin".to_string(),
            email: "admin@bootcamps.local".to_string(),
            password: "admin123".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
