// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and
//! `FIRESTORE_EMULATOR_HOST` set; otherwise they are skipped.

use serde_json::json;
use the_wall::db::{collections, Direction, Filter, Query};
use the_wall::models::{AnonymousSoul, NewSoul, Profile};
use the_wall::services::{profiles, souls, Session, VerifiedIdentity};

mod common;
use common::test_db;

/// Generate a unique uid for test isolation.
fn unique_uid(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

fn session_for(uid: &str, profile: Profile) -> Session {
    Session::from_parts(
        VerifiedIdentity {
            uid: uid.to_string(),
            email: profile.email.clone(),
            email_verified: true,
        },
        Some(profile),
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// PROFILE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_profile_created_once() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("profile");

    assert!(profiles::get_profile(&db, &uid).await.unwrap().is_none());

    let created = profiles::ensure_profile(&db, &uid, Some("a@example.com"), false)
        .await
        .unwrap();
    assert_eq!(created.id, uid);
    assert!(!created.is_admin);

    // A second call returns the stored profile rather than overwriting it.
    let again = profiles::ensure_profile(&db, &uid, Some("other@example.com"), true)
        .await
        .unwrap();
    assert_eq!(again.email.as_deref(), Some("a@example.com"));

    db.delete_document(collections::USERS, &uid).await.unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════
// SOUL TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_soul_ownership_query() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("owner");
    let profile = profiles::ensure_profile(&db, &uid, None, true).await.unwrap();
    let session = session_for(&uid, profile);

    let soul = souls::add_soul(
        &db,
        &session,
        NewSoul {
            name: "Emulator Person".to_string(),
            email: None,
            phone: None,
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            is_public: false,
        },
    )
    .await
    .unwrap();

    let mine = souls::list_my_souls(&db, &uid).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, soul.id);

    let quota = souls::soul_quota(&db, &uid, false).await.unwrap();
    assert_eq!(quota.used, 1);

    souls::delete_soul(&db, &session, &soul.id).await.unwrap();
    assert!(souls::list_my_souls(&db, &uid).await.unwrap().is_empty());
    db.delete_document(collections::USERS, &uid).await.unwrap();
}

#[tokio::test]
async fn test_anonymous_soul_duplicate() {
    require_emulator!();

    let db = test_db().await;
    let email = format!("{}@example.com", unique_uid("anon"));
    let submission = AnonymousSoul {
        name: "Anon Person".to_string(),
        email: email.clone(),
        city: None,
        state: None,
    };

    let soul = souls::add_anonymous_soul(&db, b"emulator-key", submission.clone())
        .await
        .unwrap();
    let err = souls::add_anonymous_soul(&db, b"emulator-key", submission)
        .await
        .unwrap_err();
    assert!(matches!(err, the_wall::error::AppError::Conflict(_)));

    db.delete_document(collections::SOULS, &soul.id).await.unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════
// QUERY TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_ordered_query_and_count() {
    require_emulator!();

    let db = test_db().await;
    let tag = unique_uid("order");
    let mut ids = Vec::new();
    for order in [3, 1, 2] {
        let fields = json!({"tag": tag, "order": order});
        let doc = db
            .add_document(collections::MORE_PAGES, fields.as_object().cloned().unwrap())
            .await
            .unwrap();
        ids.push(doc.id);
    }

    let query = Query::new()
        .filter(Filter::eq("tag", tag.as_str()))
        .order_by("order", Direction::Ascending);
    let docs = db.query_documents(collections::MORE_PAGES, &query).await.unwrap();
    let orders: Vec<i64> = docs
        .iter()
        .map(|d| d.get("order").and_then(|v| v.as_i64()).unwrap())
        .collect();
    assert_eq!(orders, vec![1, 2, 3]);

    let count = db
        .count_documents(
            collections::MORE_PAGES,
            &Query::new().filter(Filter::eq("tag", tag.as_str())),
        )
        .await
        .unwrap();
    assert_eq!(count, 3);

    let targets: Vec<(&str, &str)> = ids
        .iter()
        .map(|id| (collections::MORE_PAGES, id.as_str()))
        .collect();
    assert_eq!(db.delete_documents(&targets).await.unwrap(), 3);
}
