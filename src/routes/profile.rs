// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes for the signed-in user.

use crate::error::Result;
use crate::models::{Profile, ProfileCompleteness, ProfileUpdate};
use crate::services::{profiles, Session};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/profile/completeness", get(completeness))
}

async fn get_profile(Extension(session): Extension<Session>) -> Result<Json<Profile>> {
    Ok(Json(session.require_profile()?.clone()))
}

/// Merge edits into the profile. Returns the stored result.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<Profile>> {
    session.require_profile()?;
    profiles::update_profile(&state.db, &session.uid, body).await?;

    session.refresh(&state.db).await?;
    Ok(Json(session.require_profile()?.clone()))
}

async fn completeness(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<ProfileCompleteness>> {
    Ok(Json(
        profiles::profile_completeness(&state.db, &session.uid).await?,
    ))
}
