// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Testimony routes for owners, plus the public listing.

use crate::error::{AppError, Result};
use crate::models::{NewTestimony, PublicTestimony, Testimony, TestimonyUpdate};
use crate::routes::SuccessResponse;
use crate::services::testimonies::{self, MediaKind, MAX_MEDIA_BYTES};
use crate::services::{Quota, Session};
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::sync::Arc;

const MAX_PUBLIC_LIMIT: u32 = 200;

/// Request body limit for base64 media uploads.
const MEDIA_BODY_LIMIT: usize = MAX_MEDIA_BYTES / 3 * 4 + 64 * 1024;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/testimonies/public", get(list_public))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/testimonies", get(list_mine).post(create))
        .route("/api/testimonies/quota", get(quota))
        .route("/api/testimonies/{id}", put(update).delete(remove))
        .route("/api/testimonies/{id}/submit", post(submit))
        .route(
            "/api/testimonies/{id}/media",
            post(upload_media).layer(DefaultBodyLimit::max(MEDIA_BODY_LIMIT)),
        )
}

#[derive(Deserialize)]
struct PublicQuery {
    limit: Option<u32>,
}

async fn list_public(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PublicQuery>,
) -> Json<Vec<PublicTestimony>> {
    let limit = params.limit.map(|l| l.clamp(1, MAX_PUBLIC_LIMIT));
    Json(testimonies::list_public_testimonies(&state.db, limit).await)
}

async fn list_mine(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Testimony>>> {
    Ok(Json(
        testimonies::list_my_testimonies(&state.db, &session.uid).await?,
    ))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(body): Json<NewTestimony>,
) -> Result<(StatusCode, Json<Testimony>)> {
    let testimony = testimonies::create_testimony(&state.db, &session, body).await?;
    Ok((StatusCode::CREATED, Json(testimony)))
}

async fn quota(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Quota>> {
    Ok(Json(
        testimonies::testimony_quota(&state.db, &session.uid, session.is_admin).await?,
    ))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(body): Json<TestimonyUpdate>,
) -> Result<Json<Testimony>> {
    Ok(Json(
        testimonies::update_testimony(&state.db, &session, &id, body).await?,
    ))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    testimonies::delete_testimony(&state.db, &state.storage, &session, &id).await?;
    Ok(SuccessResponse::ok())
}

async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<Testimony>> {
    Ok(Json(
        testimonies::submit_testimony(&state.db, &session, &id).await?,
    ))
}

/// Media upload body; `data` is base64.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaUpload {
    kind: MediaKind,
    content_type: String,
    data: String,
}

async fn upload_media(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(body): Json<MediaUpload>,
) -> Result<Json<Testimony>> {
    let bytes = STANDARD
        .decode(body.data.as_bytes())
        .map_err(|_| AppError::BadRequest("Media data must be base64".to_string()))?;

    let testimony = testimonies::attach_media(
        &state.db,
        &state.storage,
        &session,
        &id,
        body.kind,
        bytes,
        &body.content_type,
    )
    .await?;
    Ok(Json(testimony))
}
