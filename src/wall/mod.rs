// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Decorative wall visualizations: layout, bricks and animation timelines.

pub mod brick;
pub mod layout;
pub mod testimony;
pub mod wailing;

pub use brick::{format_brick_name, Brick, BrickKind};
pub use layout::WallLayout;
pub use testimony::{Phase, TestimonyWall, Timing};
pub use wailing::{NamePages, Slot, WailingWall};
