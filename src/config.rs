use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 3000;
const CONFIG_DIR: &str = "config";
const DEFAULT_STORAGE_BACKEND: &str = "sqlite";
const DEFAULT_DATABASE_URL: &str = "sqlite://data/academia.db?mode=rwc";
const DEFAULT_AWS_REGION: &str = "us-east-1";
const DEFAULT_DYNAMODB_TABLE: &str = "academia-dashboard";
const DEFAULT_DATA_FILE: &str = "data/academia_data.json";
const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 24 * 60 * 60;
const DEV_DEFAULT_SESSION_SECRET: &str =
    "academia-development-session-secret-do-not-use-outside-development";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Storage backend selection: "sqlite" or "dynamodb"
    #[serde(default = "default_storage_backend")]
    #[validate(custom = "validate_storage_backend")]
    pub storage_backend: String,

    /// Database connection URL (sqlite backend)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// AWS region (dynamodb backend)
    #[serde(default = "default_aws_region")]
    pub aws_region: String,

    /// DynamoDB table name (dynamodb backend)
    #[serde(default = "default_dynamodb_table")]
    pub dynamodb_table: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback outside development
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// Session timeout in seconds
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,

    /// Shared session secret
    #[serde(default = "default_session_secret")]
    #[validate(length(min = 32))]
    pub session_secret: String,

    /// Path of the persisted statistics JSON document
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// Maximum request body size in bytes (also the upload cap, default 10MiB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Whether to run database migrations on startup (sqlite backend)
    #[serde(default = "default_true_bool")]
    pub auto_migrate: bool,

    /// Whether to insert the initial users and product catalog when empty
    #[serde(default = "default_true_bool")]
    pub seed_data: bool,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Returns true if explicit CORS origins are configured
    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_ref()
            .map(|raw| raw.split(',').any(|origin| !origin.trim().is_empty()))
            .unwrap_or(false)
    }

    /// Whether we should fall back to permissive CORS
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.is_development() && self.session_secret.trim() == DEV_DEFAULT_SESSION_SECRET {
            let mut err = ValidationError::new("session_secret_default_dev");
            err.message = Some(
                "The bundled development session secret must not be used outside development. Set APP__SESSION_SECRET to a unique, secure value."
                    .into(),
            );
            errors.add("session_secret", err);
        }

        if !self.should_allow_permissive_cors() && !self.has_cors_allowed_origins() {
            let mut err = ValidationError::new("cors_allowed_origins_required");
            err.message = Some(
                "Set APP__CORS_ALLOWED_ORIGINS for non-development environments or explicitly opt-in via APP__CORS_ALLOW_ANY_ORIGIN=true".into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_backend: default_storage_backend(),
            database_url: default_database_url(),
            aws_region: default_aws_region(),
            dynamodb_table: default_dynamodb_table(),
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            session_timeout_secs: default_session_timeout_secs(),
            session_secret: default_session_secret(),
            data_file: default_data_file(),
            max_body_size: default_max_body_size(),
            auto_migrate: true,
            seed_data: true,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_storage_backend() -> String {
    DEFAULT_STORAGE_BACKEND.to_string()
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_aws_region() -> String {
    DEFAULT_AWS_REGION.to_string()
}

fn default_dynamodb_table() -> String {
    DEFAULT_DYNAMODB_TABLE.to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_session_timeout_secs() -> u64 {
    DEFAULT_SESSION_TIMEOUT_SECS
}

fn default_session_secret() -> String {
    DEV_DEFAULT_SESSION_SECRET.to_string()
}

fn default_data_file() -> String {
    DEFAULT_DATA_FILE.to_string()
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024
}

fn default_true_bool() -> bool {
    true
}

fn validate_storage_backend(value: &str) -> Result<(), ValidationError> {
    match value.to_ascii_lowercase().as_str() {
        "sqlite" | "dynamodb" => Ok(()),
        _ => {
            let mut err = ValidationError::new("storage_backend");
            err.message = Some("Must be one of: sqlite, dynamodb".into());
            Err(err)
        }
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("academia_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("storage_backend", DEFAULT_STORAGE_BACKEND)?
        .set_default("database_url", DEFAULT_DATABASE_URL)?
        .set_default("aws_region", DEFAULT_AWS_REGION)?
        .set_default("dynamodb_table", DEFAULT_DYNAMODB_TABLE)?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("data_file", DEFAULT_DATA_FILE)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration security validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!(
        backend = %app_config.storage_backend,
        "Configuration loaded successfully"
    );
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            environment: "production".into(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn rejects_unknown_storage_backend() {
        let cfg = AppConfig {
            storage_backend: "mongodb".into(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn accepts_both_known_backends() {
        for backend in ["sqlite", "dynamodb"] {
            let cfg = AppConfig {
                storage_backend: backend.into(),
                ..AppConfig::default()
            };
            assert!(cfg.validate().is_ok(), "backend {backend} should validate");
        }
    }

    #[test]
    fn non_dev_rejects_bundled_session_secret() {
        let mut cfg = base_config();
        cfg.cors_allow_any_origin = true;
        assert!(cfg.validate_additional_constraints().is_err());

        cfg.session_secret = "a-sufficiently-long-and-unique-production-secret".into();
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn non_dev_requires_cors_origins() {
        let mut cfg = base_config();
        cfg.session_secret = "a-sufficiently-long-and-unique-production-secret".into();
        cfg.cors_allow_any_origin = false;
        assert!(cfg.validate_additional_constraints().is_err());

        cfg.cors_allowed_origins = Some("https://painel.academia.fit".into());
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn development_allows_defaults() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.validate_additional_constraints().is_ok());
    }
}
