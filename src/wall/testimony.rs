// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Testimony wall timeline.
//!
//! Every brick runs the same four-phase animation:
//!
//! 1. hidden until its start time
//! 2. rising from below the viewport to the center while fading in and scaling up
//! 3. paused at the center
//! 4. settling into its tiled slot while scaling back down
//!
//! Phase boundaries are precomputed once. A frame is produced by sweeping all
//! bricks against one clock value, so no per-brick timers exist.

use crate::wall::brick::Brick;
use crate::wall::layout::WallLayout;
use rand::Rng;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Durations and scale of the brick animation, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub rise_ms: f64,
    pub pause_ms: f64,
    pub settle_ms: f64,
    /// Priority delay for non-edge bricks. Half of it is added to the running
    /// offset for every generated brick.
    pub stagger_ms: f64,
    /// Scale of a brick while it sits at the viewport center.
    pub center_scale: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            rise_ms: 800.0,
            pause_ms: 600.0,
            settle_ms: 900.0,
            stagger_ms: 120.0,
            center_scale: 2.5,
        }
    }
}

impl Timing {
    /// Time from a brick's start until it is settled.
    pub fn brick_duration_ms(&self) -> f64 {
        self.rise_ms + self.pause_ms + self.settle_ms
    }
}

/// Easing curve applied to a brick's rise and settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    EaseOutQuad,
    EaseInOutCubic,
    EaseOutBack,
}

impl Easing {
    const ALL: [Easing; 4] = [
        Easing::EaseOutQuad,
        Easing::EaseInOutCubic,
        Easing::Linear,
        Easing::EaseOutBack,
    ];

    fn for_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Map linear progress in `[0, 1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseOutBack => {
                const C1: f64 = 1.70158;
                const C3: f64 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
        }
    }
}

/// Animation phase of a brick at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Hidden,
    Rising,
    Paused,
    Settling,
    Settled,
}

/// Precomputed schedule of one brick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct BrickSchedule {
    /// Position in generation order.
    pub index: usize,
    pub row: u32,
    pub col: u32,
    /// Edge brick on an even row (started without priority delay).
    pub priority: bool,
    pub start_ms: f64,
    pub rise_end_ms: f64,
    pub pause_end_ms: f64,
    pub settled_ms: f64,
    pub easing: Easing,
    pub final_x: f64,
    pub final_y: f64,
    pub brick: Brick,
}

impl BrickSchedule {
    pub fn phase_at(&self, t_ms: f64) -> Phase {
        if t_ms < self.start_ms {
            Phase::Hidden
        } else if t_ms < self.rise_end_ms {
            Phase::Rising
        } else if t_ms < self.pause_end_ms {
            Phase::Paused
        } else if t_ms < self.settled_ms {
            Phase::Settling
        } else {
            Phase::Settled
        }
    }
}

/// Visual state of one brick in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrickFrame {
    pub index: usize,
    pub phase: Phase,
    pub opacity: f64,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

/// The full testimony wall timeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonyWall {
    pub layout: WallLayout,
    pub timing: Timing,
    pub bricks: Vec<BrickSchedule>,
}

impl TestimonyWall {
    /// Generate the grid and its schedule.
    ///
    /// Rows are generated bottom-to-top and left-to-right within a row.
    /// `labels` are assigned in generation order; bricks past the end are blank.
    pub fn new<R: Rng + ?Sized>(
        layout: WallLayout,
        labels: &[String],
        timing: Timing,
        rng: &mut R,
    ) -> Self {
        let mut bricks = Vec::with_capacity(layout.capacity());
        let mut offset = 0.0;
        let mut previous_start = 0.0_f64;
        let last_col = layout.bricks_per_row.saturating_sub(1);

        for row in (0..layout.rows).rev() {
            for col in 0..layout.bricks_per_row {
                let index = bricks.len();
                let is_edge = col == 0 || col == last_col;
                let priority = is_edge && row % 2 == 0;
                let priority_delay = if priority { 0.0 } else { timing.stagger_ms };

                // A brick never starts before the one generated just before it.
                let start_ms = (offset + priority_delay).max(previous_start);
                previous_start = start_ms;
                offset += timing.stagger_ms / 2.0;

                let name = labels.get(index).map(String::as_str).unwrap_or("");
                let flipped = rng.gen_bool(0.5);
                let brick = Brick::new(name, None, flipped, rng).tinted(rng.gen_bool(0.25));
                let (final_x, final_y) = layout.slot_origin(row, col);

                let rise_end_ms = start_ms + timing.rise_ms;
                let pause_end_ms = rise_end_ms + timing.pause_ms;
                bricks.push(BrickSchedule {
                    index,
                    row,
                    col,
                    priority,
                    start_ms,
                    rise_end_ms,
                    pause_end_ms,
                    settled_ms: pause_end_ms + timing.settle_ms,
                    easing: Easing::for_index(index),
                    final_x,
                    final_y,
                    brick,
                });
            }
        }

        tracing::debug!(
            bricks = bricks.len(),
            rows = layout.rows,
            per_row = layout.bricks_per_row,
            "Generated testimony wall timeline"
        );

        Self {
            layout,
            timing,
            bricks,
        }
    }

    /// Time at which the last brick settles.
    pub fn total_duration_ms(&self) -> f64 {
        self.bricks
            .iter()
            .map(|b| b.settled_ms)
            .fold(0.0, f64::max)
    }

    /// Number of settled bricks at `t_ms`.
    pub fn visible_count(&self, t_ms: f64) -> usize {
        self.bricks
            .iter()
            .filter(|b| b.phase_at(t_ms) == Phase::Settled)
            .count()
    }

    pub fn is_complete(&self, t_ms: f64) -> bool {
        t_ms >= self.total_duration_ms()
    }

    /// Evaluate every brick against one clock value.
    pub fn frame(&self, t_ms: f64) -> Vec<BrickFrame> {
        self.bricks.iter().map(|b| self.brick_frame(b, t_ms)).collect()
    }

    fn center(&self) -> (f64, f64) {
        (
            (self.layout.viewport_width - self.layout.brick_width) / 2.0,
            (self.layout.viewport_height - self.layout.brick_height) / 2.0,
        )
    }

    fn brick_frame(&self, b: &BrickSchedule, t_ms: f64) -> BrickFrame {
        let (cx, cy) = self.center();
        let center_scale = self.timing.center_scale;
        // Rising starts just below the bottom edge, in the brick's own column.
        let (sx, sy) = (b.final_x, self.layout.viewport_height);
        let phase = b.phase_at(t_ms);

        let (opacity, x, y, scale) = match phase {
            Phase::Hidden => (0.0, sx, sy, 1.0),
            Phase::Rising => {
                let p = progress(t_ms, b.start_ms, b.rise_end_ms);
                let e = b.easing.apply(p);
                (p, lerp(sx, cx, e), lerp(sy, cy, e), lerp(1.0, center_scale, e))
            }
            Phase::Paused => (1.0, cx, cy, center_scale),
            Phase::Settling => {
                let e = b
                    .easing
                    .apply(progress(t_ms, b.pause_end_ms, b.settled_ms));
                (
                    1.0,
                    lerp(cx, b.final_x, e),
                    lerp(cy, b.final_y, e),
                    lerp(center_scale, 1.0, e),
                )
            }
            Phase::Settled => (1.0, b.final_x, b.final_y, 1.0),
        };

        BrickFrame {
            index: b.index,
            phase,
            opacity,
            x,
            y,
            scale,
        }
    }
}

fn progress(t: f64, start: f64, end: f64) -> f64 {
    if end <= start {
        return 1.0;
    }
    ((t - start) / (end - start)).clamp(0.0, 1.0)
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
