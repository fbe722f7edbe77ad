// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile model.

use crate::models::validation::{validate_dob, validate_not_blank, validate_phone};
use crate::wall::brick::capitalize;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Profile fields that must be filled in for a complete profile.
pub const REQUIRED_PROFILE_FIELDS: [&str; 5] =
    ["firstName", "lastName", "phoneNumber", "address", "dob"];

/// User profile stored in Firestore, keyed by uid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    /// uid (also used as document ID)
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    pub dob: Option<String>,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Profile {
    /// Display name derived from first name and last initial, if both are known.
    pub fn derived_display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        create_display_name(first, last)
    }
}

/// Result of a completeness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCompleteness {
    pub is_complete: bool,
    pub missing_fields: Vec<String>,
}

/// List the required profile fields that are missing or blank.
pub fn check_profile_completeness(profile: &Profile) -> ProfileCompleteness {
    let values = [
        &profile.first_name,
        &profile.last_name,
        &profile.phone_number,
        &profile.address,
        &profile.dob,
    ];

    let missing_fields: Vec<String> = REQUIRED_PROFILE_FIELDS
        .iter()
        .zip(values)
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| name.to_string())
        .collect();

    ProfileCompleteness {
        is_complete: missing_fields.is_empty(),
        missing_fields,
    }
}

/// Build "First L." from a first name and a last name (or its initial).
///
/// Returns an empty string if either part is empty.
pub fn create_display_name(first: &str, last_initial: &str) -> String {
    let first = first.trim();
    let Some(initial) = last_initial.trim().chars().next() else {
        return String::new();
    };
    if first.is_empty() {
        return String::new();
    }

    let initial: String = initial.to_uppercase().collect();
    format!("{} {}.", capitalize(first), initial)
}

/// Merge-write body for profile edits. `isAdmin` and identity fields are not writable.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50), custom(function = "validate_not_blank"))]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50), custom(function = "validate_not_blank"))]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 5, max = 200, message = "Please enter a full address"))]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_dob"))]
    pub dob: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Profile {
        Profile {
            id: "u1".to_string(),
            first_name: Some("Ruth".to_string()),
            last_name: Some("Moab".to_string()),
            phone_number: Some("555-123-4567".to_string()),
            address: Some("1 Wheat Field Rd".to_string()),
            dob: Some("1990-01-01".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_display_name() {
        assert_eq!(create_display_name("john", "d"), "John D.");
        assert_eq!(create_display_name("MARY", "s"), "Mary S.");
        assert_eq!(create_display_name("ruth", "Moab"), "Ruth M.");
        assert_eq!(create_display_name("", "d"), "");
        assert_eq!(create_display_name("john", ""), "");
        assert_eq!(create_display_name("  ", "  "), "");
    }

    #[test]
    fn test_complete_profile() {
        let result = check_profile_completeness(&complete());
        assert!(result.is_complete);
        assert!(result.missing_fields.is_empty());
    }

    #[test]
    fn test_missing_fields_are_listed_in_order() {
        let mut profile = complete();
        profile.first_name = None;
        profile.address = Some("   ".to_string());
        profile.dob = Some(String::new());

        let result = check_profile_completeness(&profile);
        assert!(!result.is_complete);
        assert_eq!(result.missing_fields, vec!["firstName", "address", "dob"]);

        let empty = check_profile_completeness(&Profile::default());
        assert_eq!(empty.missing_fields, REQUIRED_PROFILE_FIELDS.to_vec());
    }

    #[test]
    fn test_update_skips_absent_fields() {
        let update = ProfileUpdate {
            phone_number: Some("555-123-4567".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"phoneNumber": "555-123-4567"}));
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_is_admin_not_writable() {
        let update: ProfileUpdate =
            serde_json::from_value(serde_json::json!({"isAdmin": true, "dob": "1990-01-01"}))
                .unwrap();
        let value = serde_json::to_value(&update).unwrap();
        assert!(value.get("isAdmin").is_none());
    }
}
