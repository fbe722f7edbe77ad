// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! "More" pages.

use crate::error::Result;
use crate::models::MorePage;
use crate::services::more_pages;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/more", get(list_pages))
        .route("/api/more/{id}", get(get_page))
}

async fn list_pages(State(state): State<Arc<AppState>>) -> Json<Vec<MorePage>> {
    Json(more_pages::list_more_pages(&state.db).await)
}

async fn get_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MorePage>> {
    Ok(Json(more_pages::get_more_page(&state.db, &id).await?))
}
