// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Brick grid layout for a viewport.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Nominal brick width in pixels.
pub const BRICK_WIDTH: f64 = 90.0;
/// Nominal brick height in pixels.
pub const BRICK_HEIGHT: f64 = 40.0;
/// Gap between neighbouring bricks.
pub const BRICK_MARGIN: f64 = 2.0;

/// Grid dimensions that tile a viewport exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WallLayout {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub bricks_per_row: u32,
    pub rows: u32,
    /// Width of one brick slot (brick plus its margin).
    pub brick_width: f64,
    /// Height of one brick slot (brick plus its margin).
    pub brick_height: f64,
    pub margin: f64,
}

impl WallLayout {
    /// Compute the layout with the default brick dimensions.
    pub fn for_viewport(width: f64, height: f64) -> Self {
        Self::compute(width, height, BRICK_WIDTH, BRICK_HEIGHT, BRICK_MARGIN)
    }

    /// Fit as many bricks as needed so that no partial brick trails a row or column.
    ///
    /// The naive fit count is rounded up and the available space divided by it,
    /// which stretches bricks slightly narrower than nominal.
    pub fn compute(
        viewport_width: f64,
        viewport_height: f64,
        brick_width: f64,
        brick_height: f64,
        margin: f64,
    ) -> Self {
        let (bricks_per_row, slot_width) = fit(viewport_width, brick_width + margin);
        let (rows, slot_height) = fit(viewport_height, brick_height + margin);

        Self {
            viewport_width: viewport_width.max(0.0),
            viewport_height: viewport_height.max(0.0),
            bricks_per_row,
            rows,
            brick_width: slot_width,
            brick_height: slot_height,
            margin,
        }
    }

    /// Total number of bricks in the grid.
    pub fn capacity(&self) -> usize {
        self.bricks_per_row as usize * self.rows as usize
    }

    /// Top-left corner of the slot at (`row`, `col`).
    pub fn slot_origin(&self, row: u32, col: u32) -> (f64, f64) {
        (
            f64::from(col) * self.brick_width,
            f64::from(row) * self.brick_height,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.capacity() == 0
    }
}

fn fit(available: f64, nominal: f64) -> (u32, f64) {
    if !available.is_finite() || available <= 0.0 || !nominal.is_finite() || nominal <= 0.0 {
        return (0, 0.0);
    }

    let count = (available / nominal).ceil().max(1.0);
    (count as u32, available / count)
}
