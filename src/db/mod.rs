// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).

pub mod document;
pub mod firestore;
pub mod memory;

pub use document::{Direction, Document, Fields, Filter, FilterOp, Query};
pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const SOULS: &str = "souls";
    pub const TESTIMONIES: &str = "testimonies";
    /// Staging copies of testimonies awaiting admin review
    pub const SUBMISSIONS: &str = "submissions";
    /// Approved testimonies with the public field set
    pub const PUBLIC_TESTIMONIES: &str = "publicTestimonies";
    /// User profiles (keyed by uid)
    pub const USERS: &str = "users";
    /// Admin-configured navigation pages
    pub const MORE_PAGES: &str = "morePages";
}
