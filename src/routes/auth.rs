// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password authentication routes.

use axum::{extract::State, routing::post, Extension, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::middleware::auth::{removal_cookie, session_cookie, IdToken};
use crate::models::validation::trimmed;
use crate::models::{Profile, ProfileUpdate};
use crate::routes::SuccessResponse;
use crate::services::{profiles, AuthTokens, Session};
use crate::AppState;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/auth/reset-password", post(reset_password))
}

pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/verify-email", post(verify_email))
        .route("/auth/signout", post(sign_out))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password should be at least 6 characters"))]
    pub password: String,
    #[validate(length(max = 50))]
    pub first_name: Option<String>,
    #[validate(length(max = 50))]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please enter a password"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
}

/// Tokens and profile returned after sign-up or sign-in.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub uid: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    pub profile: Profile,
}

impl AuthResponse {
    fn new(tokens: AuthTokens, profile: Profile) -> Self {
        Self {
            uid: tokens.local_id,
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            profile,
        }
    }
}

fn secure_cookies(state: &AppState) -> bool {
    state.config.frontend_url.starts_with("https://")
}

/// Create an account, its profile, and send the verification email.
async fn sign_up(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SignUpRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    body.validate()?;
    let email = body.email.trim().to_lowercase();

    let tokens = state.identity.sign_up(&email, &body.password).await?;
    tracing::info!(uid = %tokens.local_id, "Account created");

    let mut profile =
        profiles::ensure_profile(&state.db, &tokens.local_id, Some(&email), false).await?;

    if body.first_name.is_some() || body.last_name.is_some() {
        let names = ProfileUpdate {
            first_name: body.first_name,
            last_name: body.last_name,
            ..Default::default()
        };
        profile = profiles::update_profile(&state.db, &tokens.local_id, names).await?;
    }

    if let Err(e) = state.identity.send_email_verification(&tokens.id_token).await {
        tracing::warn!(uid = %tokens.local_id, error = %e, "Failed to send verification email");
    }

    let jar = jar.add(session_cookie(tokens.id_token.clone(), secure_cookies(&state)));
    Ok((jar, Json(AuthResponse::new(tokens, profile))))
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SignInRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    body.validate()?;
    let email = body.email.trim().to_lowercase();

    let tokens = state.identity.sign_in(&email, &body.password).await?;
    let identity = state.token_verifier.verify(&tokens.id_token).await?;

    let mut profile = profiles::ensure_profile(
        &state.db,
        &identity.uid,
        identity.email.as_deref(),
        identity.email_verified,
    )
    .await?;

    // Verification happens out of band; mirror it onto the profile.
    if identity.email_verified && !profile.email_verified {
        let mut fields = serde_json::Map::new();
        fields.insert("emailVerified".to_string(), true.into());
        state
            .db
            .update_document(crate::db::collections::USERS, &identity.uid, fields)
            .await?;
        profile.email_verified = true;
    }

    tracing::info!(uid = %identity.uid, "Signed in");
    let jar = jar.add(session_cookie(tokens.id_token.clone(), secure_cookies(&state)));
    Ok((jar, Json(AuthResponse::new(tokens, profile))))
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<SuccessResponse>> {
    body.validate()?;
    state
        .identity
        .send_password_reset(body.email.trim())
        .await?;
    Ok(SuccessResponse::ok())
}

async fn verify_email(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(IdToken(token)): Extension<IdToken>,
) -> Result<Json<SuccessResponse>> {
    if session.email_verified {
        return Ok(SuccessResponse::ok());
    }
    state.identity.send_email_verification(&token).await?;
    tracing::info!(uid = %session.uid, "Verification email sent");
    Ok(SuccessResponse::ok())
}

async fn sign_out(
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    session.teardown();
    (jar.remove(removal_cookie()), SuccessResponse::ok())
}
