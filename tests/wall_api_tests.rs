// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public wall, deep link and "More" page endpoints.

use axum::http::StatusCode;
use serde_json::{json, Value};
use the_wall::db::collections;
use tower::ServiceExt;

mod common;

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(common::anonymous("GET", uri, None))
        .await
        .unwrap();
    let status = response.status();
    (status, common::json_body(response).await)
}

#[tokio::test]
async fn test_layout_tiles_viewport() {
    let (app, _) = common::create_test_app();

    let (status, layout) = get(&app, "/api/wall/layout?width=390&height=844").await;
    assert_eq!(status, StatusCode::OK);
    // 390 / 92 and 844 / 42, rounded up.
    assert_eq!(layout["bricksPerRow"], 5);
    assert_eq!(layout["rows"], 21);
}

#[tokio::test]
async fn test_wailing_wall_shows_public_names() {
    let (app, state) = common::create_test_app();
    for (name, public) in [("john doe", true), ("secret name", false)] {
        let fields = json!({"name": name, "isPublic": public});
        state
            .db
            .add_document(collections::SOULS, fields.as_object().cloned().unwrap())
            .await
            .unwrap();
    }

    let (status, wall) = get(&app, "/api/wall/wailing?width=184&height=42&speed=46&seed=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(wall["speed"], 46.0);
    assert_eq!(wall["cycleMs"], 4000.0);

    let pages = wall["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 1);
    let labels: Vec<&str> = pages[0]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l.as_str().unwrap())
        .collect();
    assert!(labels.contains(&"John D."));
    assert!(!labels.iter().any(|l| l.starts_with("Secret")));
}

#[tokio::test]
async fn test_wailing_wall_seed_is_reproducible() {
    let (app, state) = common::create_test_app();
    for i in 0..40 {
        let fields = json!({"name": format!("person {i}"), "isPublic": true});
        state
            .db
            .add_document(collections::SOULS, fields.as_object().cloned().unwrap())
            .await
            .unwrap();
    }

    let (_, first) = get(&app, "/api/wall/wailing?seed=11").await;
    let (_, second) = get(&app, "/api/wall/wailing?seed=11").await;
    assert_eq!(first["pages"], second["pages"]);
    assert_eq!(first["sections"], second["sections"]);
}

#[tokio::test]
async fn test_empty_testimony_wall() {
    let (app, _) = common::create_test_app();

    let (status, wall) = get(&app, "/api/wall/testimonies?width=184&height=84&seed=1").await;
    assert_eq!(status, StatusCode::OK);
    let bricks = wall["bricks"].as_array().unwrap();
    assert_eq!(bricks.len(), 4);
    assert!(wall["totalDurationMs"].as_f64().unwrap() > 0.0);
    // Bottom row first.
    assert_eq!(bricks[0]["row"], 1);
    assert_eq!(bricks[0]["col"], 0);
}

#[tokio::test]
async fn test_testimony_wall_labels_approved_names() {
    let (app, state) = common::create_test_app();
    for (id, name, approved_at) in [
        ("t1", "Mary S.", "2024-01-01T00:00:00.000Z"),
        ("t2", "John D.", "2024-02-01T00:00:00.000Z"),
    ] {
        let fields = json!({
            "title": "Found hope",
            "testimony": "story",
            "displayName": name,
            "approvedAt": approved_at,
        });
        state
            .db
            .set_document(
                collections::PUBLIC_TESTIMONIES,
                id,
                fields.as_object().cloned().unwrap(),
            )
            .await
            .unwrap();
    }

    let (status, wall) = get(&app, "/api/wall/testimonies?width=184&height=84&seed=1").await;
    assert_eq!(status, StatusCode::OK);
    let labels: Vec<Value> = wall["bricks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["brick"]["label"].clone())
        .collect();
    // Newest approval first, remaining bricks blank.
    assert_eq!(
        labels,
        vec![json!("John D."), json!("Mary S."), Value::Null, Value::Null]
    );
}

#[tokio::test]
async fn test_more_page_without_order_is_listed() {
    let (app, state) = common::create_test_app();
    let fields = json!({
        "title": "Giving",
        "iconName": "gift",
        "embedUrl": "https://example.com/give",
        "description": "Support the ministry",
    });
    state
        .db
        .set_document(collections::MORE_PAGES, "giving", fields.as_object().cloned().unwrap())
        .await
        .unwrap();

    let (status, pages) = get(&app, "/api/more").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pages.as_array().unwrap().len(), 1);
    assert_eq!(pages[0]["id"], "giving");
}

#[tokio::test]
async fn test_deep_links() {
    let (app, _) = common::create_test_app();

    let (status, screen) =
        get(&app, "/api/links/resolve?path=thewall%3A%2F%2Fmore%2Fabout-us").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(screen, json!({"screen": "morePage", "pageId": "about-us"}));

    let (status, screen) = get(&app, "/api/links/resolve?path=auth/verify-email").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(screen, json!({"screen": "verifyEmail"}));

    let (status, _) = get(&app, "/api/links/resolve?path=nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_more_pages_in_order() {
    let (app, state) = common::create_test_app();
    for (id, title, order) in [("b", "Second", 2), ("a", "First", 1)] {
        let fields = json!({
            "title": title,
            "iconName": "info",
            "embedUrl": format!("https://example.com/{id}"),
            "description": "",
            "order": order,
        });
        state
            .db
            .set_document(collections::MORE_PAGES, id, fields.as_object().cloned().unwrap())
            .await
            .unwrap();
    }

    let (status, pages) = get(&app, "/api/more").await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = pages
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);

    let (status, page) = get(&app, "/api/more/b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["embedUrl"], "https://example.com/b");

    let (status, _) = get(&app, "/api/more/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
