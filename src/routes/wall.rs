// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wall endpoints. Clients render the returned layout and schedules.

use crate::error::{AppError, Result};
use crate::services::wall::{self, WailingSnapshot};
use crate::wall::wailing::DEFAULT_SPEED;
use crate::wall::{TestimonyWall, Timing, WallLayout};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_WIDTH: f64 = 390.0;
const DEFAULT_HEIGHT: f64 = 844.0;
const MAX_DIMENSION: f64 = 8192.0;
const MAX_SPEED: f64 = 2000.0;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/wall/layout", get(layout))
        .route("/api/wall/wailing", get(wailing))
        .route("/api/wall/testimonies", get(testimonies))
}

#[derive(Debug, Default, Deserialize)]
pub struct WallQuery {
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Pixels per second for the wailing wall.
    pub speed: Option<f64>,
    /// Fixed seed for reproducible walls.
    pub seed: Option<u64>,
}

impl WallQuery {
    fn layout(&self) -> Result<WallLayout> {
        let width = self.width.unwrap_or(DEFAULT_WIDTH);
        let height = self.height.unwrap_or(DEFAULT_HEIGHT);
        for (name, value) in [("width", width), ("height", height)] {
            if !value.is_finite() || value <= 0.0 || value > MAX_DIMENSION {
                return Err(AppError::BadRequest(format!(
                    "{name} must be between 0 and {MAX_DIMENSION}"
                )));
            }
        }
        Ok(WallLayout::for_viewport(width, height))
    }

    fn speed(&self) -> Result<f64> {
        let speed = self.speed.unwrap_or(DEFAULT_SPEED);
        if !speed.is_finite() || speed <= 0.0 || speed > MAX_SPEED {
            return Err(AppError::BadRequest(format!(
                "speed must be between 0 and {MAX_SPEED}"
            )));
        }
        Ok(speed)
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

async fn layout(Query(params): Query<WallQuery>) -> Result<Json<WallLayout>> {
    Ok(Json(params.layout()?))
}

async fn wailing(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WallQuery>,
) -> Result<Json<WailingSnapshot>> {
    let layout = params.layout()?;
    let speed = params.speed()?;
    let mut rng = params.rng();

    let names = wall::fetch_wall_names(&state.db).await;
    let wall = wall::build_wailing_wall(names, layout, speed, &mut rng);
    Ok(Json(WailingSnapshot::of(&wall)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonyWallResponse {
    #[serde(flatten)]
    pub wall: TestimonyWall,
    pub total_duration_ms: f64,
}

async fn testimonies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WallQuery>,
) -> Result<Json<TestimonyWallResponse>> {
    let layout = params.layout()?;
    let mut rng = params.rng();

    let wall = wall::build_testimony_wall(&state.db, layout, Timing::default(), &mut rng).await;
    let total_duration_ms = wall.total_duration_ms();
    Ok(Json(TestimonyWallResponse {
        wall,
        total_duration_ms,
    }))
}
