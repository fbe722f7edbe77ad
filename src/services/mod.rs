// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod identity;
pub mod more_pages;
pub mod profiles;
pub mod session;
pub mod souls;
pub mod storage;
pub mod testimonies;
pub mod token_verifier;
pub mod wall;

pub use identity::{friendly_auth_message, AuthTokens, IdentityClient};
pub use session::Session;
pub use souls::Quota;
pub use storage::StorageService;
pub use token_verifier::{TokenError, TokenVerifier, VerifiedIdentity};
