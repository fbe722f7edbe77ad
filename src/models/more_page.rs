// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Embedded content pages listed under "More".

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// An admin-curated page that embeds external content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MorePage {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub icon_name: Option<String>,
    pub embed_url: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Sort key for the listing (ascending)
    #[serde(default)]
    pub order: i64,
}
