// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile reads and merge writes.

use crate::db::document::to_fields;
use crate::db::{collections, FirestoreDb};
use crate::error::AppError;
use crate::models::{check_profile_completeness, Profile, ProfileCompleteness, ProfileUpdate};
use validator::Validate;

pub async fn get_profile(db: &FirestoreDb, uid: &str) -> Result<Option<Profile>, AppError> {
    db.get_document_by_id(collections::USERS, uid)
        .await?
        .map(|doc| doc.into_model())
        .transpose()
}

/// Return the profile for `uid`, creating a minimal one on first sign-in.
pub async fn ensure_profile(
    db: &FirestoreDb,
    uid: &str,
    email: Option<&str>,
    email_verified: bool,
) -> Result<Profile, AppError> {
    if let Some(profile) = get_profile(db, uid).await? {
        return Ok(profile);
    }

    let profile = Profile {
        id: uid.to_string(),
        email: email.map(str::to_string),
        email_verified,
        ..Default::default()
    };

    let doc = db
        .set_document(collections::USERS, uid, to_fields(&profile)?)
        .await?;
    tracing::info!(uid, "Created profile");
    doc.into_model()
}

/// Merge `update` into the stored profile and return the result.
///
/// The display name is re-derived when both name parts are known.
pub async fn update_profile(
    db: &FirestoreDb,
    uid: &str,
    update: ProfileUpdate,
) -> Result<Profile, AppError> {
    update.validate()?;

    // Fetch-modify-write so the derived display name sees the merged names.
    let mut profile = get_profile(db, uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", uid)))?;

    let mut fields = to_fields(&update)?;

    if let Some(first) = update.first_name {
        profile.first_name = Some(first);
    }
    if let Some(last) = update.last_name {
        profile.last_name = Some(last);
    }

    let display_name = profile.derived_display_name();
    if !display_name.is_empty() && display_name != profile.display_name {
        fields.insert("displayName".to_string(), display_name.into());
    }

    if fields.is_empty() {
        return Ok(profile);
    }

    db.update_document(collections::USERS, uid, fields).await?;
    tracing::info!(uid, "Profile updated");

    get_profile(db, uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", uid)))
}

pub async fn profile_completeness(
    db: &FirestoreDb,
    uid: &str,
) -> Result<ProfileCompleteness, AppError> {
    let profile = get_profile(db, uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", uid)))?;
    Ok(check_profile_completeness(&profile))
}
