// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the bikes API (no trailing slash)
    pub api_base_url: String,
    /// Firebase web API key (public, but required by every auth call)
    pub firebase_api_key: String,
    /// Identity Toolkit endpoint (password sign-in)
    pub identity_toolkit_url: String,
    /// Secure Token endpoint (refresh-token exchange)
    pub secure_token_url: String,
    /// Timeout applied to every outbound HTTP request
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let http_timeout_secs = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("HTTP_TIMEOUT_SECS", raw))?,
            Err(_) => 10,
        };

        Ok(Self {
            api_base_url: trim_url(
                env::var("BIKERS_API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            ),
            firebase_api_key: env::var("FIREBASE_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?,
            identity_toolkit_url: trim_url(
                env::var("FIREBASE_IDENTITY_TOOLKIT_URL")
                    .unwrap_or_else(|_| DEFAULT_IDENTITY_TOOLKIT_URL.to_string()),
            ),
            secure_token_url: trim_url(
                env::var("FIREBASE_SECURE_TOKEN_URL")
                    .unwrap_or_else(|_| DEFAULT_SECURE_TOKEN_URL.to_string()),
            ),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Config pointing every endpoint at `base_url`, for tests against stub servers.
    pub fn test_default(base_url: &str) -> Self {
        let base_url = trim_url(base_url.to_string());
        Self {
            api_base_url: base_url.clone(),
            firebase_api_key: "test-api-key".to_string(),
            identity_toolkit_url: format!("{}/v1", base_url),
            secure_token_url: format!("{}/v1", base_url),
            http_timeout: Duration::from_secs(5),
        }
    }

    /// Build the shared HTTP client with the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }
}

fn trim_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("FIREBASE_API_KEY", " test_key ");
        env::set_var("BIKERS_API_BASE_URL", "https://bikers.example.com/");
        env::remove_var("HTTP_TIMEOUT_SECS");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.firebase_api_key, "test_key");
        assert_eq!(config.api_base_url, "https://bikers.example.com");
        assert_eq!(config.identity_toolkit_url, DEFAULT_IDENTITY_TOOLKIT_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_default_points_at_stub() {
        let config = Config::test_default("http://127.0.0.1:4000/");
        assert_eq!(config.api_base_url, "http://127.0.0.1:4000");
        assert_eq!(config.secure_token_url, "http://127.0.0.1:4000/v1");
    }
}
