// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The Firebase web-app credentials are the same values the mobile client is
//! built with; the server needs the API key (Identity Toolkit), the project
//! ID (Firestore, token audience) and the storage bucket.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Firebase project ---
    /// Web API key used for Identity Toolkit calls
    pub firebase_api_key: String,
    pub firebase_auth_domain: String,
    /// Project ID (Firestore project, ID token audience)
    pub firebase_project_id: String,
    /// Cloud Storage bucket for testimony media
    pub firebase_storage_bucket: String,
    pub firebase_messaging_sender_id: String,
    pub firebase_app_id: String,

    // --- Server ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Serve from in-memory stores instead of Firestore and Cloud Storage
    pub offline_mode: bool,

    // --- Secrets ---
    /// Key for hashing anonymous submitter emails
    pub anon_hash_key: Vec<u8>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            firebase_api_key: "test_api_key".to_string(),
            firebase_auth_domain: "test-project.firebaseapp.com".to_string(),
            firebase_project_id: "test-project".to_string(),
            firebase_storage_bucket: "test-project.appspot.com".to_string(),
            firebase_messaging_sender_id: "000000000000".to_string(),
            firebase_app_id: "1:000000000000:web:test".to_string(),
            frontend_url: "http://localhost:8081".to_string(),
            port: 8080,
            offline_mode: true,
            anon_hash_key: b"test_anon_hash_key_32_bytes_min!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let firebase_project_id = required("FIREBASE_PROJECT_ID")?;
        let firebase_storage_bucket = env::var("FIREBASE_STORAGE_BUCKET")
            .unwrap_or_else(|_| format!("{}.appspot.com", firebase_project_id));
        let firebase_auth_domain = env::var("FIREBASE_AUTH_DOMAIN")
            .unwrap_or_else(|_| format!("{}.firebaseapp.com", firebase_project_id));

        Ok(Self {
            firebase_api_key: required("FIREBASE_API_KEY")?,
            firebase_auth_domain,
            firebase_project_id,
            firebase_storage_bucket,
            firebase_messaging_sender_id: env::var("FIREBASE_MESSAGING_SENDER_ID")
                .unwrap_or_default(),
            firebase_app_id: env::var("FIREBASE_APP_ID").unwrap_or_default(),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            offline_mode: env::var("OFFLINE_MODE")
                .map(|v| matches!(v.trim(), "1" | "true"))
                .unwrap_or(false),
            anon_hash_key: required("ANON_HASH_KEY")?.into_bytes(),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("FIREBASE_API_KEY", "test_key");
        env::set_var("FIREBASE_PROJECT_ID", "the-wall-test");
        env::set_var("ANON_HASH_KEY", "  hash_key  ");
        env::remove_var("FIREBASE_STORAGE_BUCKET");
        env::remove_var("OFFLINE_MODE");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.firebase_api_key, "test_key");
        assert_eq!(config.firebase_project_id, "the-wall-test");
        assert_eq!(config.firebase_storage_bucket, "the-wall-test.appspot.com");
        assert_eq!(config.anon_hash_key, b"hash_key".to_vec());
        assert_eq!(config.port, 8080);
        assert!(!config.offline_mode);
    }
}
