// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Soul submissions: quota, ownership, anonymous intake and admin linking.

use crate::db::document::to_fields;
use crate::db::firestore::owned_by;
use crate::db::{collections, Direction, FirestoreDb, Filter, Query};
use crate::error::AppError;
use crate::models::soul::{MAX_SOULS_PER_USER, TESTIMONY_SOUL_PREFIX};
use crate::models::{AnonymousSoul, NewSoul, PublicSoul, Soul, SoulStatus, SoulUpdate};
use crate::services::session::Session;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

type HmacSha256 = Hmac<Sha256>;

/// Usage against a per-user limit. `limit` is `None` for admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Quota {
    pub used: usize,
    pub limit: Option<usize>,
    pub can_add: bool,
}

impl Quota {
    pub(crate) fn new(used: usize, limit: usize, is_admin: bool) -> Self {
        if is_admin {
            return Self {
                used,
                limit: None,
                can_add: true,
            };
        }
        Self {
            used,
            limit: Some(limit),
            can_add: used < limit,
        }
    }
}

pub async fn soul_quota(
    db: &FirestoreDb,
    user_id: &str,
    is_admin: bool,
) -> Result<Quota, AppError> {
    // Souls from approved testimonies are not the user's submissions.
    let used = db
        .query_documents(collections::SOULS, &Query::new().filter(owned_by(user_id)))
        .await?
        .iter()
        .filter(|doc| !doc.id.starts_with(TESTIMONY_SOUL_PREFIX))
        .count();
    Ok(Quota::new(used, MAX_SOULS_PER_USER, is_admin))
}

/// True while a non-admin user owns fewer than the maximum souls.
pub async fn can_add_more_souls(
    db: &FirestoreDb,
    user_id: &str,
    is_admin: bool,
) -> Result<bool, AppError> {
    if is_admin {
        return Ok(true);
    }
    Ok(soul_quota(db, user_id, is_admin).await?.can_add)
}

pub async fn add_soul(
    db: &FirestoreDb,
    session: &Session,
    new_soul: NewSoul,
) -> Result<Soul, AppError> {
    new_soul.validate()?;

    if !can_add_more_souls(db, &session.uid, session.is_admin).await? {
        return Err(AppError::QuotaExceeded(format!(
            "You can add up to {} souls",
            MAX_SOULS_PER_USER
        )));
    }

    let soul = new_soul.into_soul(Some(session.uid.clone()));
    let doc = db.add_document(collections::SOULS, to_fields(&soul)?).await?;
    tracing::info!(uid = %session.uid, soul_id = %doc.id, "Soul added");
    doc.into_model()
}

pub async fn list_my_souls(db: &FirestoreDb, user_id: &str) -> Result<Vec<Soul>, AppError> {
    let query = Query::new()
        .filter(owned_by(user_id))
        .order_by("createdAt", Direction::Descending);
    db.query_documents(collections::SOULS, &query)
        .await?
        .into_iter()
        .map(|doc| doc.into_model())
        .collect()
}

pub async fn get_soul(db: &FirestoreDb, soul_id: &str) -> Result<Soul, AppError> {
    db.get_document_by_id(collections::SOULS, soul_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Soul {} not found", soul_id)))?
        .into_model()
}

async fn get_modifiable_soul(
    db: &FirestoreDb,
    session: &Session,
    soul_id: &str,
) -> Result<Soul, AppError> {
    let soul = get_soul(db, soul_id).await?;
    if !session.can_modify(soul.user_id.as_deref()) {
        return Err(AppError::Forbidden("Not your soul".to_string()));
    }
    Ok(soul)
}

pub async fn update_soul(
    db: &FirestoreDb,
    session: &Session,
    soul_id: &str,
    update: SoulUpdate,
) -> Result<Soul, AppError> {
    update.validate()?;
    let existing = get_modifiable_soul(db, session, soul_id).await?;

    let mut fields = to_fields(&update)?;
    if let Some(name) = &update.name {
        fields.insert("name".to_string(), name.trim().into());
    }
    // Contact is one of email or phone; setting one clears the other.
    if let Some(email) = &update.email {
        fields.insert("email".to_string(), email.trim().to_lowercase().into());
        if existing.phone.is_some() {
            fields.insert("phone".to_string(), serde_json::Value::Null);
        }
    } else if update.phone.is_some() && existing.email.is_some() {
        fields.insert("email".to_string(), serde_json::Value::Null);
    }

    db.update_document(collections::SOULS, soul_id, fields).await?;
    tracing::info!(uid = %session.uid, soul_id, "Soul updated");
    get_soul(db, soul_id).await
}

pub async fn delete_soul(
    db: &FirestoreDb,
    session: &Session,
    soul_id: &str,
) -> Result<(), AppError> {
    let soul = get_modifiable_soul(db, session, soul_id).await?;
    if soul.is_from_testimony() && !session.is_admin {
        return Err(AppError::Conflict(
            "This name belongs to an approved testimony".to_string(),
        ));
    }
    db.delete_document(collections::SOULS, soul_id).await?;
    tracing::info!(uid = %session.uid, soul_id, "Soul deleted");
    Ok(())
}

/// Public souls, newest first. Errors are logged and yield an empty list.
pub async fn list_public_souls(db: &FirestoreDb, limit: Option<u32>) -> Vec<PublicSoul> {
    let mut query = Query::new()
        .filter(Filter::eq("isPublic", true))
        .order_by("createdAt", Direction::Descending);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    let docs = match db.query_documents(collections::SOULS, &query).await {
        Ok(docs) => docs,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list public souls");
            return Vec::new();
        }
    };

    docs.into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            doc.into_model::<Soul>()
                .inspect_err(|e| {
                    tracing::warn!(soul_id = %id, error = %e, "Skipping malformed soul")
                })
                .ok()
        })
        .map(PublicSoul::from)
        .collect()
}

/// Document ID of an anonymous soul: keyed HMAC of the normalized email.
pub fn anonymous_soul_id(key: &[u8], email: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid anonymous hash key: {}", e)))?;
    mac.update(email.trim().to_lowercase().as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Accept one anonymous soul per email address. The email itself is not stored.
pub async fn add_anonymous_soul(
    db: &FirestoreDb,
    hash_key: &[u8],
    mut submission: AnonymousSoul,
) -> Result<Soul, AppError> {
    submission.email = submission.email.trim().to_string();
    submission.validate()?;

    let id = anonymous_soul_id(hash_key, &submission.email)?;
    if db.get_document_by_id(collections::SOULS, &id).await?.is_some() {
        return Err(AppError::Conflict(
            "A name has already been submitted with this email".to_string(),
        ));
    }

    let soul = Soul {
        id: String::new(),
        name: submission.name.trim().to_string(),
        user_id: None,
        email: None,
        phone: None,
        city: submission.city,
        state: submission.state,
        status: SoulStatus::Active,
        is_public: true,
        testimony_id: None,
        created_at: None,
        updated_at: None,
    };

    let doc = db
        .set_document(collections::SOULS, &id, to_fields(&soul)?)
        .await?;
    tracing::info!(soul_id = %id, "Anonymous soul added");
    doc.into_model()
}

/// Link a soul to a testimony (admin only).
pub async fn link_testimony(
    db: &FirestoreDb,
    session: &Session,
    soul_id: &str,
    testimony_id: &str,
) -> Result<Soul, AppError> {
    session.require_admin()?;

    get_soul(db, soul_id).await?;
    if db
        .get_document_by_id(collections::TESTIMONIES, testimony_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(format!(
            "Testimony {} not found",
            testimony_id
        )));
    }

    let mut fields = serde_json::Map::new();
    fields.insert("testimonyId".to_string(), testimony_id.into());
    db.update_document(collections::SOULS, soul_id, fields).await?;

    let mut fields = serde_json::Map::new();
    fields.insert("soulId".to_string(), soul_id.into());
    db.update_document(collections::TESTIMONIES, testimony_id, fields)
        .await?;

    tracing::info!(uid = %session.uid, soul_id, testimony_id, "Soul linked to testimony");
    get_soul(db, soul_id).await
}
