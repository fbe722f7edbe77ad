// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin review routes. Every handler requires an admin session.

use crate::error::Result;
use crate::models::{PublicTestimony, ReviewDecision, Soul, Testimony, TestimonyStatus};
use crate::services::{souls, testimonies, Session};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/submissions", get(list_submissions))
        .route("/api/admin/submissions/{id}/review", post(start_review))
        .route("/api/admin/submissions/{id}/approve", post(approve))
        .route("/api/admin/submissions/{id}/reject", post(reject))
        .route("/api/admin/souls/{id}/link", post(link_soul))
}

#[derive(Deserialize)]
struct SubmissionsQuery {
    status: Option<TestimonyStatus>,
}

async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(params): Query<SubmissionsQuery>,
) -> Result<Json<Vec<Testimony>>> {
    session.require_admin()?;
    Ok(Json(
        testimonies::list_submissions(&state.db, &session, params.status).await?,
    ))
}

async fn start_review(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<Testimony>> {
    session.require_admin()?;
    Ok(Json(testimonies::start_review(&state.db, &session, &id).await?))
}

async fn approve(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(decision): Json<ReviewDecision>,
) -> Result<Json<PublicTestimony>> {
    session.require_admin()?;
    Ok(Json(
        testimonies::approve_submission(&state.db, &session, &id, decision).await?,
    ))
}

async fn reject(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(decision): Json<ReviewDecision>,
) -> Result<Json<Testimony>> {
    session.require_admin()?;
    Ok(Json(
        testimonies::reject_submission(&state.db, &session, &id, decision).await?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkRequest {
    testimony_id: String,
}

async fn link_soul(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(body): Json<LinkRequest>,
) -> Result<Json<Soul>> {
    Ok(Json(
        souls::link_testimony(&state.db, &session, &id, &body.testimony_id).await?,
    ))
}
