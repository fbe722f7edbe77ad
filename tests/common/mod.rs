// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::Value;
use std::sync::Arc;
use the_wall::config::Config;
use the_wall::db::{collections, FirestoreDb};
use the_wall::models::{Profile, ProfileUpdate};
use the_wall::routes::create_router;
use the_wall::services::token_verifier::IdTokenClaims;
use the_wall::services::{profiles, IdentityClient, StorageService, TokenVerifier};
use the_wall::AppState;

pub const TEST_KID: &str = "test-kid";
pub const TEST_SECRET: &[u8] = b"integration-test-secret";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by in-memory stores.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let token_verifier = TokenVerifier::new_with_static_key(
        &config,
        TEST_KID,
        Algorithm::HS256,
        DecodingKey::from_secret(TEST_SECRET),
    )
    .expect("static verifier");

    // Nothing listens here; tests never reach the identity service.
    let identity = IdentityClient::with_base_url(
        config.firebase_api_key.clone(),
        "http://127.0.0.1:9".to_string(),
    );

    let state = Arc::new(AppState {
        storage: StorageService::new_in_memory(&config.firebase_storage_bucket),
        db: FirestoreDb::new_in_memory(),
        token_verifier: Arc::new(token_verifier),
        identity,
        config,
    });

    (create_router(state.clone()), state)
}

/// Sign an ID token for `uid` the way the test verifier expects.
#[allow(dead_code)]
pub fn id_token(uid: &str) -> String {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = IdTokenClaims {
        iss: "https://securetoken.google.com/test-project".to_string(),
        aud: "test-project".to_string(),
        sub: uid.to_string(),
        exp: now + 3600,
        iat: Some(now),
        user_id: Some(uid.to_string()),
        email: Some(format!("{uid}@example.com")),
        email_verified: Some(true),
    };

    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(TEST_KID.to_string());
    encode(&header, &claims, &EncodingKey::from_secret(TEST_SECRET)).expect("sign token")
}

/// Create a named profile for `uid`, optionally with the admin flag.
#[allow(dead_code)]
pub async fn seed_profile(state: &AppState, uid: &str, is_admin: bool) -> Profile {
    let email = format!("{uid}@example.com");
    profiles::ensure_profile(&state.db, uid, Some(&email), true)
        .await
        .unwrap();
    let names = ProfileUpdate {
        first_name: Some("test".to_string()),
        last_name: Some(uid.to_string()),
        ..Default::default()
    };
    let profile = profiles::update_profile(&state.db, uid, names).await.unwrap();

    if is_admin {
        let mut fields = serde_json::Map::new();
        fields.insert("isAdmin".to_string(), true.into());
        state
            .db
            .update_document(collections::USERS, uid, fields)
            .await
            .unwrap();
    }
    profile
}

/// Build a request with a bearer token and optional JSON body.
#[allow(dead_code)]
pub fn authed(method: &str, uri: &str, uid: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", id_token(uid)));
    with_body(builder, body)
}

/// Build an unauthenticated request with optional JSON body.
#[allow(dead_code)]
pub fn anonymous(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    with_body(Request::builder().method(method).uri(uri), body)
}

fn with_body(builder: axum::http::request::Builder, body: Option<Value>) -> Request<Body> {
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
