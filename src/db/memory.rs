// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store used in offline mode and tests.

use crate::db::document::{Document, Fields};
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Length of generated document IDs, matching Firestore auto IDs.
const AUTO_ID_LEN: usize = 20;

/// Collections keyed by name, documents ordered by ID.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections.get(collection).and_then(|docs| {
            docs.get(id).map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            })
        })
    }

    pub fn list(&self, collection: &str) -> Vec<Document> {
        self.collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Write a document, replacing any previous content.
    pub fn set(&self, collection: &str, id: &str, fields: Fields) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// Merge fields into an existing document. Returns `false` if it does not exist.
    pub fn merge(&self, collection: &str, id: &str, fields: Fields) -> bool {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return false;
        };
        match docs.get_mut(id) {
            Some(existing) => {
                existing.extend(fields);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, collection: &str, id: &str) -> bool {
        self.collections
            .get_mut(collection)
            .is_some_and(|mut docs| docs.remove(id).is_some())
    }

    /// Generate a fresh random document ID.
    pub fn generate_id() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(AUTO_ID_LEN)
            .map(char::from)
            .collect()
    }
}
