// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use crate::error::{AppError, Result};
use crate::links::{resolve_deep_link, Screen};
use crate::AppState;
use axum::{extract::Query, routing::get, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/links/resolve", get(resolve))
}

#[derive(Deserialize)]
struct ResolveQuery {
    path: String,
}

async fn resolve(Query(params): Query<ResolveQuery>) -> Result<Json<Screen>> {
    resolve_deep_link(&params.path)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No screen for link {}", params.path)))
}
