// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-request session built from a verified ID token and the stored profile.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::Profile;
use crate::services::profiles;
use crate::services::token_verifier::VerifiedIdentity;

/// Authenticated caller, injected into handlers as a request extension.
#[derive(Debug, Clone)]
pub struct Session {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
    /// Admin flag from the stored profile (never from the token)
    pub is_admin: bool,
    pub profile: Option<Profile>,
}

impl Session {
    /// Establish a session for a verified identity.
    pub async fn establish(db: &FirestoreDb, identity: VerifiedIdentity) -> Result<Self, AppError> {
        let profile = profiles::get_profile(db, &identity.uid).await?;
        if profile.is_none() {
            tracing::warn!(uid = %identity.uid, "Session established without a profile");
        }

        Ok(Self::from_parts(identity, profile))
    }

    /// Build a session from already-loaded parts.
    pub fn from_parts(identity: VerifiedIdentity, profile: Option<Profile>) -> Self {
        Self {
            is_admin: profile.as_ref().is_some_and(|p| p.is_admin),
            uid: identity.uid,
            email: identity.email,
            email_verified: identity.email_verified,
            profile,
        }
    }

    /// Re-read the profile, picking up edits and admin flag changes.
    pub async fn refresh(&mut self, db: &FirestoreDb) -> Result<(), AppError> {
        self.profile = profiles::get_profile(db, &self.uid).await?;
        self.is_admin = self.profile.as_ref().is_some_and(|p| p.is_admin);
        tracing::debug!(uid = %self.uid, is_admin = self.is_admin, "Session refreshed");
        Ok(())
    }

    /// End the session.
    pub fn teardown(self) {
        tracing::info!(uid = %self.uid, "Session ended");
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if !self.is_admin {
            tracing::warn!(uid = %self.uid, "Non-admin attempted admin operation");
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(())
    }

    pub fn require_profile(&self) -> Result<&Profile, AppError> {
        self.profile
            .as_ref()
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", self.uid)))
    }

    /// Owners may modify their own records; admins may modify any.
    pub fn can_modify(&self, owner: Option<&str>) -> bool {
        self.is_admin || owner == Some(self.uid.as_str())
    }
}
