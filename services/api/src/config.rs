//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub text_model: String,
    pub image_model: String,
    pub image_edit_model: String,
    pub identity_api_url: String,
    pub identity_api_key: String,
    pub media_upload_url: String,
    pub media_upload_preset: String,
    pub free_usage_limit: u32,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Provider Settings ---
        let text_model =
            std::env::var("TEXT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let image_model =
            std::env::var("IMAGE_MODEL").unwrap_or_else(|_| "dall-e-3".to_string());
        let image_edit_model =
            std::env::var("IMAGE_EDIT_MODEL").unwrap_or_else(|_| "gpt-image-1".to_string());

        // --- Load Collaborator Endpoints ---
        let identity_api_url = std::env::var("IDENTITY_API_URL")
            .map_err(|_| ConfigError::MissingVar("IDENTITY_API_URL".to_string()))?;
        let identity_api_key = std::env::var("IDENTITY_API_KEY")
            .map_err(|_| ConfigError::MissingVar("IDENTITY_API_KEY".to_string()))?;
        let media_upload_url = std::env::var("MEDIA_UPLOAD_URL")
            .map_err(|_| ConfigError::MissingVar("MEDIA_UPLOAD_URL".to_string()))?;
        let media_upload_preset =
            std::env::var("MEDIA_UPLOAD_PRESET").unwrap_or_else(|_| "creations".to_string());

        // --- Load Quota and Upload Limits ---
        let free_usage_limit = match std::env::var("FREE_USAGE_LIMIT") {
            Ok(raw) => raw.parse::<u32>().map_err(|_| {
                ConfigError::InvalidValue(
                    "FREE_USAGE_LIMIT".to_string(),
                    format!("'{}' is not a valid count", raw),
                )
            })?,
            Err(_) => 10,
        };

        let max_upload_bytes = match std::env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw.parse::<usize>().map_err(|_| {
                ConfigError::InvalidValue(
                    "MAX_UPLOAD_BYTES".to_string(),
                    format!("'{}' is not a valid byte count", raw),
                )
            })?,
            Err(_) => 10 * 1024 * 1024,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            text_model,
            image_model,
            image_edit_model,
            identity_api_url,
            identity_api_key,
            media_upload_url,
            media_upload_preset,
            free_usage_limit,
            max_upload_bytes,
        })
    }
}
