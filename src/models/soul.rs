// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Soul model: a name submitted to the wailing wall for prayer.

use crate::models::validation::{trimmed, trimmed_opt, validate_not_blank, validate_phone};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// Maximum souls a non-admin user may own.
pub const MAX_SOULS_PER_USER: usize = 7;

/// ID prefix of souls created by approving a testimony.
pub const TESTIMONY_SOUL_PREFIX: &str = "testimony-";

/// Lifecycle state of a soul. Only active souls exist today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub enum SoulStatus {
    #[default]
    Active,
}

/// Stored soul record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Soul {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Owner uid; `None` for anonymous submissions
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: SoulStatus,
    #[serde(default)]
    pub is_public: bool,
    /// Linked testimony, set by an admin
    #[serde(default)]
    pub testimony_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Soul {
    /// Created by a testimony approval. Such souls do not count toward the
    /// owner's quota and only admins may delete them.
    pub fn is_from_testimony(&self) -> bool {
        self.id.starts_with(TESTIMONY_SOUL_PREFIX)
    }
}

/// Soul as shown on the public wall (no contact details).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PublicSoul {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub testimony_id: Option<String>,
}

impl From<Soul> for PublicSoul {
    fn from(soul: Soul) -> Self {
        Self {
            id: soul.id,
            name: soul.name,
            city: soul.city,
            state: soul.state,
            testimony_id: soul.testimony_id,
        }
    }
}

/// Request body for adding a soul.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_new_soul_contact"))]
pub struct NewSoul {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 50))]
    pub state: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

impl NewSoul {
    /// Build the stored record for `user_id`.
    pub fn into_soul(self, user_id: Option<String>) -> Soul {
        Soul {
            id: String::new(),
            name: self.name.trim().to_string(),
            user_id,
            email: self.email.map(|e| e.trim().to_lowercase()),
            phone: self.phone,
            city: self.city,
            state: self.state,
            status: SoulStatus::Active,
            is_public: self.is_public,
            testimony_id: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Request body for an owner's edit. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_soul_update_contact"))]
pub struct SoulUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "trimmed_opt",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Request body for an anonymous submission; the email is required and
/// limits submissions to one per address.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousSoul {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 50))]
    pub state: Option<String>,
}

fn contact_exclusive(
    email: &Option<String>,
    phone: &Option<String>,
) -> Result<(), ValidationError> {
    if email.is_some() && phone.is_some() {
        let mut err = ValidationError::new("contact");
        err.message = Some("Provide either an email or a phone number, not both".into());
        return Err(err);
    }
    Ok(())
}

fn validate_new_soul_contact(soul: &NewSoul) -> Result<(), ValidationError> {
    contact_exclusive(&soul.email, &soul.phone)
}

fn validate_soul_update_contact(update: &SoulUpdate) -> Result<(), ValidationError> {
    contact_exclusive(&update.email, &update.phone)
}
