// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only "More" pages configured by admins.

use crate::db::{collections, FirestoreDb};
use crate::error::AppError;
use crate::models::MorePage;

/// Pages in display order, then by title. Pages without an `order` sort as 0.
/// Errors are logged and yield an empty list.
pub async fn list_more_pages(db: &FirestoreDb) -> Vec<MorePage> {
    // Sorted here: a store-side order_by would drop pages lacking the field.
    let docs = match db.get_collection(collections::MORE_PAGES).await {
        Ok(docs) => docs,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list more pages");
            return Vec::new();
        }
    };

    let mut pages: Vec<MorePage> = docs
        .into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            doc.into_model()
                .inspect_err(|e| {
                    tracing::warn!(page_id = %id, error = %e, "Skipping malformed page")
                })
                .ok()
        })
        .collect();
    pages.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.title.cmp(&b.title)));
    pages
}

pub async fn get_more_page(db: &FirestoreDb, id: &str) -> Result<MorePage, AppError> {
    db.get_document_by_id(collections::MORE_PAGES, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Page {} not found", id)))?
        .into_model()
}
