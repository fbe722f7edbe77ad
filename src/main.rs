// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The Wall API Server
//!
//! Serves prayer names, testimonies and the wall animation schedules to the
//! mobile client, backed by Firestore, Cloud Storage and Firebase Auth.

use std::sync::Arc;
use the_wall::{
    config::Config,
    db::FirestoreDb,
    services::{IdentityClient, StorageService, TokenVerifier},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        offline = config.offline_mode,
        "Starting The Wall API"
    );

    let (db, storage) = if config.offline_mode {
        tracing::warn!("Offline mode: using in-memory database and storage");
        (
            FirestoreDb::new_in_memory(),
            StorageService::new_in_memory(&config.firebase_storage_bucket),
        )
    } else {
        let db = FirestoreDb::new(&config.firebase_project_id).await?;
        let storage = StorageService::new(&config.firebase_storage_bucket).await?;
        tracing::info!(bucket = %config.firebase_storage_bucket, "Cloud Storage initialized");
        (db, storage)
    };

    // The auth emulator mints unsigned tokens, so it needs its own verifier.
    let (identity, token_verifier) = match std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
        Ok(host) if !host.is_empty() => {
            tracing::info!(host = %host, "Using auth emulator");
            (
                IdentityClient::for_emulator(config.firebase_api_key.clone(), &host),
                TokenVerifier::new_for_emulator(&config)?,
            )
        }
        _ => (
            IdentityClient::new(config.firebase_api_key.clone()),
            TokenVerifier::new(&config)?,
        ),
    };
    let token_verifier = Arc::new(token_verifier);

    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        token_verifier,
        identity,
        storage,
    });

    let app = the_wall::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("the_wall=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
