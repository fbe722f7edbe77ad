// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Object storage for testimony media (Cloud Storage JSON API).

use crate::error::AppError;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

const UPLOAD_BASE_URL: &str = "https://storage.googleapis.com/upload/storage/v1";
const API_BASE_URL: &str = "https://storage.googleapis.com/storage/v1";
const DOWNLOAD_BASE_URL: &str = "https://firebasestorage.googleapis.com/v0/b";
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
enum Backend {
    Gcs {
        http: reqwest::Client,
        tokens: Arc<gcloud_sdk::GoogleAuthTokenGenerator>,
    },
    Memory(Arc<DashMap<String, StoredObject>>),
}

/// Object kept by the in-memory backend.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Storage client bound to one bucket.
#[derive(Clone)]
pub struct StorageService {
    bucket: String,
    backend: Backend,
}

impl StorageService {
    /// Create a client using application default credentials.
    pub async fn new(bucket: &str) -> anyhow::Result<Self> {
        let tokens = gcloud_sdk::GoogleAuthTokenGenerator::new(
            gcloud_sdk::TokenSourceType::Default,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create storage token source: {}", e))?;

        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        tracing::info!(bucket, "Storage client initialized");
        Ok(Self {
            bucket: bucket.to_string(),
            backend: Backend::Gcs {
                http,
                tokens: Arc::new(tokens),
            },
        })
    }

    /// Create an in-memory store (offline mode, tests).
    pub fn new_in_memory(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            backend: Backend::Memory(Arc::new(DashMap::new())),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload bytes to `path` and return the public download URL.
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        match &self.backend {
            Backend::Memory(objects) => {
                objects.insert(
                    path.to_string(),
                    StoredObject {
                        bytes,
                        content_type: content_type.to_string(),
                    },
                );
            }
            Backend::Gcs { http, tokens } => {
                let token = bearer_token(tokens).await?;
                let url = format!("{}/b/{}/o", UPLOAD_BASE_URL, self.bucket);
                let size = bytes.len();

                let response = http
                    .post(&url)
                    .bearer_auth(token)
                    .query(&[("uploadType", "media"), ("name", path)])
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(bytes)
                    .send()
                    .await
                    .map_err(|e| AppError::Storage(format!("Upload request failed: {}", e)))?;

                check_response(response).await?;
                tracing::info!(path, size, "Uploaded object");
            }
        }

        Ok(self.public_url(path))
    }

    /// Delete the object behind a URL produced by [`upload`](Self::upload).
    ///
    /// Deleting an object that no longer exists is not an error.
    pub async fn delete_by_url(&self, url: &str) -> Result<(), AppError> {
        let path = self
            .path_from_url(url)
            .ok_or_else(|| AppError::BadRequest(format!("Not a URL in this bucket: {}", url)))?;
        self.delete(&path).await
    }

    /// Delete an object by path.
    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Memory(objects) => {
                objects.remove(path);
            }
            Backend::Gcs { http, tokens } => {
                let token = bearer_token(tokens).await?;
                let url = format!(
                    "{}/b/{}/o/{}",
                    API_BASE_URL,
                    self.bucket,
                    urlencoding::encode(path)
                );

                let response = http
                    .delete(&url)
                    .bearer_auth(token)
                    .send()
                    .await
                    .map_err(|e| AppError::Storage(format!("Delete request failed: {}", e)))?;

                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    tracing::debug!(path, "Object already gone");
                    return Ok(());
                }
                check_response(response).await?;
            }
        }

        tracing::debug!(path, "Deleted object");
        Ok(())
    }

    /// Fetch an object from the in-memory backend.
    pub fn get_in_memory(&self, path: &str) -> Option<StoredObject> {
        match &self.backend {
            Backend::Memory(objects) => objects.get(path).map(|o| o.clone()),
            Backend::Gcs { .. } => None,
        }
    }

    /// Download URL for an object path.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}/o/{}?alt=media",
            DOWNLOAD_BASE_URL,
            self.bucket,
            urlencoding::encode(path)
        )
    }

    /// Recover the object path from a download URL of this bucket.
    pub fn path_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/{}/o/", DOWNLOAD_BASE_URL, self.bucket);
        let encoded = url.strip_prefix(&prefix)?;
        let encoded = encoded.split('?').next().unwrap_or_default();
        if encoded.is_empty() {
            return None;
        }
        urlencoding::decode(encoded).ok().map(|p| p.into_owned())
    }
}

async fn bearer_token(tokens: &gcloud_sdk::GoogleAuthTokenGenerator) -> Result<String, AppError> {
    let token = tokens
        .create_token()
        .await
        .map_err(|e| AppError::Storage(format!("Failed to get storage token: {}", e)))?;
    Ok(token.token.as_sensitive_str().to_string())
}

async fn check_response(response: reqwest::Response) -> Result<(), AppError> {
    if response.status().is_success() {
        return Ok(());
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Storage(format!("HTTP {}: {}", status, body)))
}

/// File extension for an accepted media content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        "video/mp4" => Some("mp4"),
        "video/quicktime" => Some("mov"),
        _ => None,
    }
}
