// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Soul routes: the user's prayer list and public submissions.

use crate::error::Result;
use crate::models::{AnonymousSoul, NewSoul, PublicSoul, Soul, SoulUpdate};
use crate::routes::SuccessResponse;
use crate::services::{souls, Quota, Session};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

const MAX_PUBLIC_LIMIT: u32 = 500;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/souls/public", get(list_public))
        .route("/api/souls/anonymous", post(add_anonymous))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/souls", get(list_mine).post(add))
        .route("/api/souls/quota", get(quota))
        .route("/api/souls/{id}", put(update).delete(remove))
}

#[derive(Deserialize)]
struct PublicQuery {
    limit: Option<u32>,
}

async fn list_public(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PublicQuery>,
) -> Json<Vec<PublicSoul>> {
    let limit = params.limit.map(|l| l.clamp(1, MAX_PUBLIC_LIMIT));
    Json(souls::list_public_souls(&state.db, limit).await)
}

async fn add_anonymous(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnonymousSoul>,
) -> Result<(StatusCode, Json<Soul>)> {
    let soul = souls::add_anonymous_soul(&state.db, &state.config.anon_hash_key, body).await?;
    Ok((StatusCode::CREATED, Json(soul)))
}

async fn list_mine(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Soul>>> {
    Ok(Json(souls::list_my_souls(&state.db, &session.uid).await?))
}

async fn add(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(body): Json<NewSoul>,
) -> Result<(StatusCode, Json<Soul>)> {
    let soul = souls::add_soul(&state.db, &session, body).await?;
    Ok((StatusCode::CREATED, Json(soul)))
}

async fn quota(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Quota>> {
    Ok(Json(
        souls::soul_quota(&state.db, &session.uid, session.is_admin).await?,
    ))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(body): Json<SoulUpdate>,
) -> Result<Json<Soul>> {
    Ok(Json(souls::update_soul(&state.db, &session, &id, body).await?))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    souls::delete_soul(&state.db, &session, &id).await?;
    Ok(SuccessResponse::ok())
}
