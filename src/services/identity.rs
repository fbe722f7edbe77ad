// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Identity Toolkit client for email/password accounts.
//!
//! Handles:
//! - Account creation and password sign-in
//! - Password reset and email verification mails
//! - Translating service error codes into messages users can act on

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity Toolkit REST client.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    /// Create a client for the production Identity Toolkit endpoint.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against another endpoint (auth emulator, mock server).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Client for the auth emulator at `host` (e.g. `localhost:9099`).
    pub fn for_emulator(api_key: String, host: &str) -> Self {
        Self::with_base_url(
            api_key,
            format!("http://{}/identitytoolkit.googleapis.com/v1", host),
        )
    }

    /// Create an email/password account.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthTokens, AppError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.post_json("accounts:signUp", &body).await
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthTokens, AppError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.post_json("accounts:signInWithPassword", &body).await
    }

    /// Send a password reset email.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        let body = OobCodeRequest {
            request_type: "PASSWORD_RESET",
            email: Some(email),
            id_token: None,
        };
        let _: OobCodeResponse = self.post_json("accounts:sendOobCode", &body).await?;
        tracing::info!("Password reset email requested");
        Ok(())
    }

    /// Send a verification email to the account behind `id_token`.
    pub async fn send_email_verification(&self, id_token: &str) -> Result<(), AppError> {
        let body = OobCodeRequest {
            request_type: "VERIFY_EMAIL",
            email: None,
            id_token: Some(id_token),
        };
        let _: OobCodeResponse = self.post_json("accounts:sendOobCode", &body).await?;
        Ok(())
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url, method);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Identity request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let code =
                parse_error_code(&body).unwrap_or_else(|| format!("HTTP_{}", status.as_u16()));
            tracing::warn!(status = %status, code = %code, method, "Identity request rejected");

            return Err(AppError::Identity {
                message: friendly_auth_message(&code).to_string(),
                code,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Identity JSON parse error: {}", e)))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id_token: Option<&'a str>,
}

#[derive(Deserialize)]
struct OobCodeResponse {}

/// Tokens returned by sign-up and sign-in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub id_token: String,
    pub refresh_token: String,
    /// uid of the account
    pub local_id: String,
    #[serde(default)]
    pub email: String,
    /// Lifetime of `id_token` in seconds (sent as a string)
    #[serde(default)]
    pub expires_in: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extract the error code from an Identity Toolkit error body.
///
/// Messages look like `EMAIL_EXISTS` or `WEAK_PASSWORD : Password should be ...`.
fn parse_error_code(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let code = envelope
        .error
        .message
        .split(" : ")
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    (!code.is_empty()).then_some(code)
}

/// Message shown to the user for an identity service error code.
pub fn friendly_auth_message(code: &str) -> &'static str {
    match code {
        "EMAIL_EXISTS" => "An account with this email already exists.",
        "EMAIL_NOT_FOUND" => "No account found with this email.",
        "INVALID_PASSWORD" => "Incorrect password.",
        "INVALID_LOGIN_CREDENTIALS" => "Invalid email or password.",
        "USER_DISABLED" => "This account has been disabled.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Please try again later.",
        "WEAK_PASSWORD" => "Password should be at least 6 characters.",
        "INVALID_EMAIL" => "Please enter a valid email address.",
        "MISSING_PASSWORD" => "Please enter a password.",
        "OPERATION_NOT_ALLOWED" => "Email sign-in is not enabled.",
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" => "Your session has expired. Please sign in again.",
        _ => "Something went wrong. Please try again.",
    }
}
