// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! The Wall: prayer names, testimonies and the animated walls that show them
//!
//! This crate provides the backend API over Firestore, Cloud Storage and
//! Firebase Authentication, plus the wall layout and animation timelines
//! served to clients.

pub mod config;
pub mod db;
pub mod error;
pub mod links;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod wall;

use config::Config;
use db::FirestoreDb;
use services::{IdentityClient, StorageService, TokenVerifier};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub token_verifier: Arc<TokenVerifier>,
    pub identity: IdentityClient,
    pub storage: StorageService,
}
