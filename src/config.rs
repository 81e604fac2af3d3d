// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

/// Model used for feedback scoring unless `GEMINI_MODEL` overrides it.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-001";

/// Voice interviews a user without a subscription may complete.
pub const FREE_VOICE_INTERVIEWS: usize = 2;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Generative model name for feedback scoring
    pub gemini_model: String,
    /// Voice interviews allowed without a subscription
    pub free_voice_interviews: usize,

    // --- Secrets ---
    /// Generative Language API key
    pub gemini_api_key: String,
    /// HS256 key that session tokens are signed with (raw bytes)
    pub session_signing_key: Vec<u8>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            free_voice_interviews: FREE_VOICE_INTERVIEWS,
            gemini_api_key: "test_api_key".to_string(),
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first, if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            free_voice_interviews: match env::var("FREE_VOICE_INTERVIEWS") {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("FREE_VOICE_INTERVIEWS"))?,
                Err(_) => FREE_VOICE_INTERVIEWS,
            },

            gemini_api_key: env::var("GEMINI_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GEMINI_API_KEY"))?,
            session_signing_key: env::var("SESSION_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
