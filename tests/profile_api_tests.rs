// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile read, merge update and completeness.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_completeness_tracks_missing_fields() {
    let (app, state) = common::create_test_app();
    common::seed_profile(&state, "alice", false).await;

    let body = common::json_body(
        app.clone()
            .oneshot(common::authed("GET", "/api/profile/completeness", "alice", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["isComplete"], false);
    assert_eq!(body["missingFields"], json!(["phoneNumber", "address", "dob"]));

    let response = app
        .clone()
        .oneshot(common::authed(
            "PUT",
            "/api/profile",
            "alice",
            Some(json!({
                "phoneNumber": "(555) 123-4567",
                "address": "1 Main St, Springfield",
                "dob": "1990-04-30"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::json_body(
        app.oneshot(common::authed("GET", "/api/profile/completeness", "alice", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["isComplete"], true);
    assert_eq!(body["missingFields"], json!([]));
}

#[tokio::test]
async fn test_update_rederives_display_name_and_keeps_other_fields() {
    let (app, state) = common::create_test_app();
    common::seed_profile(&state, "alice", false).await;

    let response = app
        .oneshot(common::authed(
            "PUT",
            "/api/profile",
            "alice",
            Some(json!({"firstName": "mary", "lastName": "smith"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let profile = common::json_body(response).await;
    assert_eq!(profile["displayName"], "Mary S.");
    assert_eq!(profile["email"], "alice@example.com");
    assert_eq!(profile["emailVerified"], true);
}

#[tokio::test]
async fn test_admin_flag_not_writable() {
    let (app, state) = common::create_test_app();
    common::seed_profile(&state, "alice", false).await;

    let response = app
        .clone()
        .oneshot(common::authed(
            "PUT",
            "/api/profile",
            "alice",
            Some(json!({"isAdmin": true, "address": "2 Elm St"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = common::json_body(response).await;
    assert_eq!(profile["isAdmin"], false);

    let response = app
        .oneshot(common::authed("GET", "/api/admin/submissions", "alice", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
