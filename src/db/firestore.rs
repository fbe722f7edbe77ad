// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document database client with generic CRUD operations.
//!
//! Backed by Firestore in production (or the emulator when
//! `FIRESTORE_EMULATOR_HOST` is set) and by an in-memory store offline.
//! Every write stamps `updatedAt`; creations also stamp `createdAt`.

use crate::db::document::{
    Direction, Document, Fields, Filter, FilterOp, Query, CREATED_AT, UPDATED_AT,
};
use crate::db::memory::MemoryStore;
use crate::error::AppError;
use crate::time_utils::now_rfc3339;
use firestore::{FirestoreQueryDirection, FirestoreQueryOrder};
use futures_util::{stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Prefix of metadata keys the Firestore deserializer injects.
const FIRESTORE_META_PREFIX: &str = "_firestore_";

/// Document as read back from Firestore, with its ID surfaced.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "_firestore_id")]
    id: String,
    #[serde(flatten)]
    fields: Fields,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        let mut fields = raw.fields;
        fields.retain(|key, _| !key.starts_with(FIRESTORE_META_PREFIX));
        Document { id: raw.id, fields }
    }
}

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(MemoryStore),
}

/// Document database client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator does not check credentials, so skip the default token lookup.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create an in-memory database (offline mode, tests).
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryStore::new()),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        matches!(self.backend, Backend::Memory(_))
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// Fetch every document of a collection.
    pub async fn get_collection(&self, collection: &str) -> Result<Vec<Document>, AppError> {
        match &self.backend {
            Backend::Memory(store) => Ok(store.list(collection)),
            Backend::Firestore(client) => {
                let docs: Vec<RawDocument> = client
                    .fluent()
                    .select()
                    .from(collection)
                    .obj()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(docs.into_iter().map(Document::from).collect())
            }
        }
    }

    /// Fetch a single document by ID.
    pub async fn get_document_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, AppError> {
        match &self.backend {
            Backend::Memory(store) => Ok(store.get(collection, id)),
            Backend::Firestore(client) => {
                let doc: Option<RawDocument> = client
                    .fluent()
                    .select()
                    .by_id_in(collection)
                    .obj()
                    .one(id)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(doc.map(Document::from))
            }
        }
    }

    /// Run a filtered, ordered, limited query.
    pub async fn query_documents(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, AppError> {
        match &self.backend {
            Backend::Memory(store) => Ok(query.apply(store.list(collection))),
            Backend::Firestore(client) => {
                let filters = query.filters.clone();
                let select = client
                    .fluent()
                    .select()
                    .from(collection)
                    .filter(move |q| {
                        q.for_all(filters.iter().map(|f| {
                            let field = q.field(f.field.as_str());
                            let value = f.value.clone();
                            match f.op {
                                FilterOp::Eq => field.eq(value),
                                FilterOp::NotEq => field.not_equal(value),
                                FilterOp::Lt => field.less_than(value),
                                FilterOp::Lte => field.less_than_or_equal(value),
                                FilterOp::Gt => field.greater_than(value),
                                FilterOp::Gte => field.greater_than_or_equal(value),
                            }
                        }))
                    })
                    .order_by(query.order_by.iter().map(|(field, direction)| {
                        FirestoreQueryOrder::new(field.clone(), firestore_direction(*direction))
                    }));

                let select = if let Some(limit) = query.limit {
                    select.limit(limit)
                } else {
                    select
                };

                let docs: Vec<RawDocument> = select
                    .obj()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(docs.into_iter().map(Document::from).collect())
            }
        }
    }

    /// Count documents matching a query.
    pub async fn count_documents(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<usize, AppError> {
        Ok(self.query_documents(collection, query).await?.len())
    }

    // ─── Writes ──────────────────────────────────────────────────

    /// Create a document with a generated ID, stamping creation and update times.
    pub async fn add_document(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<Document, AppError> {
        let fields = stamp(fields, true);

        match &self.backend {
            Backend::Memory(store) => {
                let id = MemoryStore::generate_id();
                store.set(collection, &id, fields.clone());
                Ok(Document { id, fields })
            }
            Backend::Firestore(client) => {
                let created: RawDocument = client
                    .fluent()
                    .insert()
                    .into(collection)
                    .generate_document_id()
                    .object(&fields)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                tracing::debug!(collection, id = %created.id, "Document created");
                Ok(created.into())
            }
        }
    }

    /// Create or replace a document under a caller-chosen ID.
    ///
    /// `createdAt` is stamped only when the fields do not already carry one.
    pub async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, AppError> {
        let has_created = fields.contains_key(CREATED_AT);
        let fields = stamp(fields, !has_created);

        match &self.backend {
            Backend::Memory(store) => store.set(collection, id, fields.clone()),
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collection)
                    .document_id(id)
                    .object(&fields)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        Ok(Document {
            id: id.to_string(),
            fields,
        })
    }

    /// Merge fields into an existing document, stamping the update time.
    pub async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), AppError> {
        let fields = stamp(fields, false);

        match &self.backend {
            Backend::Memory(store) => {
                if !store.merge(collection, id, fields) {
                    return Err(AppError::NotFound(format!("{}/{}", collection, id)));
                }
            }
            Backend::Firestore(client) => {
                if self.get_document_by_id(collection, id).await?.is_none() {
                    return Err(AppError::NotFound(format!("{}/{}", collection, id)));
                }

                let paths: Vec<String> = fields.keys().cloned().collect();
                let _: () = client
                    .fluent()
                    .update()
                    .fields(paths)
                    .in_col(collection)
                    .document_id(id)
                    .object(&fields)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        tracing::debug!(collection, id, "Document updated");
        Ok(())
    }

    /// Delete a document. Deleting a missing document is not an error.
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Memory(store) => {
                store.remove(collection, id);
            }
            Backend::Firestore(client) => {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(id)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        tracing::debug!(collection, id, "Document deleted");
        Ok(())
    }

    /// Delete `(collection, id)` pairs with bounded concurrency.
    ///
    /// Order is unspecified. Returns the number of documents deleted.
    pub async fn delete_documents(&self, targets: &[(&str, &str)]) -> Result<usize, AppError> {
        let deletes: Vec<_> = targets
            .iter()
            .map(|(collection, id)| self.delete_document(collection, id))
            .collect();
        stream::iter(deletes)
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(targets.len())
    }
}

fn stamp(mut fields: Fields, created: bool) -> Fields {
    let now = Value::String(now_rfc3339());
    if created {
        fields.insert(CREATED_AT.to_string(), now.clone());
    }
    fields.insert(UPDATED_AT.to_string(), now);
    fields
}

fn firestore_direction(direction: Direction) -> FirestoreQueryDirection {
    match direction {
        Direction::Ascending => FirestoreQueryDirection::Ascending,
        Direction::Descending => FirestoreQueryDirection::Descending,
    }
}

/// Convenience filter for documents owned by a user.
pub fn owned_by(user_id: &str) -> Filter {
    Filter::eq("userId", user_id)
}
