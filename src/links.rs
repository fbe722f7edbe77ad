// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deep link paths and the screens they open.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Screen a deep link resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum Screen {
    WailingWall,
    Testimonies,
    Resources,
    #[serde(rename_all = "camelCase")]
    MorePage {
        page_id: String,
    },
    Giving,
    Vision,
    Login,
    Signup,
    ForgotPassword,
    VerifyEmail,
}

/// Resolve a deep link path such as `more/abc` or `/auth/login`.
///
/// Accepts an optional scheme/host prefix (`thewall://`), leading or trailing
/// slashes and a query string. Unknown paths resolve to `None`.
pub fn resolve_deep_link(path: &str) -> Option<Screen> {
    let path = path
        .split_once("://")
        .map_or(path, |(_, rest)| rest)
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_matches('/');

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let screen = match segments.as_slice() {
        ["wailing-wall"] => Screen::WailingWall,
        ["testimonies"] => Screen::Testimonies,
        ["resources"] => Screen::Resources,
        ["more", page_id] => Screen::MorePage {
            page_id: urlencoding::decode(page_id).ok()?.into_owned(),
        },
        ["giving"] => Screen::Giving,
        ["vision"] => Screen::Vision,
        ["auth", "login"] => Screen::Login,
        ["auth", "signup"] => Screen::Signup,
        ["auth", "forgot-password"] => Screen::ForgotPassword,
        ["auth", "verify-email"] => Screen::VerifyEmail,
        _ => return None,
    };
    Some(screen)
}
