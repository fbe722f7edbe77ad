// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ID token authentication middleware.

use crate::error::AppError;
use crate::services::Session;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

/// Cookie carrying the ID token for browser clients.
pub const SESSION_COOKIE: &str = "wall_token";

/// Raw ID token of the current request, for calls made on the user's behalf.
#[derive(Debug, Clone)]
pub struct IdToken(pub String);

/// Middleware that requires a valid ID token and injects the [`Session`].
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => return Err(AppError::Unauthorized),
        }
    };

    let identity = state.token_verifier.verify(&token).await?;
    let session = Session::establish(&state.db, identity).await?;
    tracing::debug!(uid = %session.uid, is_admin = session.is_admin, "Request authenticated");

    request.extensions_mut().insert(session);
    request.extensions_mut().insert(IdToken(token));

    Ok(next.run(request).await)
}

/// Session cookie holding an ID token. It lives as long as the browser
/// session; the token inside expires on its own.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie matching the session cookie, for removal.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}
