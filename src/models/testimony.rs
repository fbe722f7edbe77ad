// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Testimony model, its review lifecycle and the public projection.

use crate::models::validation::validate_not_blank;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Maximum testimonies a non-admin user may own.
pub const MAX_TESTIMONIES_PER_USER: usize = 1;

/// Review status of a testimony.
///
/// `unlinked → pending → review → approved | rejected`. A rejected testimony
/// may be edited and resubmitted, which returns it to `pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub enum TestimonyStatus {
    #[default]
    Unlinked,
    Pending,
    Review,
    Approved,
    Rejected,
}

impl TestimonyStatus {
    pub fn can_transition_to(self, next: TestimonyStatus) -> bool {
        use TestimonyStatus::*;
        matches!(
            (self, next),
            (Unlinked, Pending)
                | (Rejected, Pending)
                | (Pending, Review)
                | (Pending, Approved)
                | (Pending, Rejected)
                | (Review, Approved)
                | (Review, Rejected)
        )
    }

    /// The owner may still edit the content.
    pub fn is_editable(self) -> bool {
        matches!(self, TestimonyStatus::Unlinked | TestimonyStatus::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TestimonyStatus::Unlinked => "unlinked",
            TestimonyStatus::Pending => "pending",
            TestimonyStatus::Review => "review",
            TestimonyStatus::Approved => "approved",
            TestimonyStatus::Rejected => "rejected",
        }
    }
}

/// Questionnaire answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Answer {
    Yes,
    No,
    #[default]
    NotSet,
}

/// Faith and sexuality questions asked alongside a testimony.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase", default)]
pub struct Questionnaire {
    pub knew_jesus_before: Answer,
    pub knows_jesus_now: Answer,
    pub attends_church: Answer,
    pub identified_lgbtq_before: Answer,
    pub identifies_lgbtq_now: Answer,
}

/// Partial questionnaire for edits; absent answers are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knew_jesus_before: Option<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knows_jesus_now: Option<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attends_church: Option<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified_lgbtq_before: Option<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifies_lgbtq_now: Option<Answer>,
}

/// Stored testimony record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Testimony {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub testimony: String,
    #[serde(default)]
    pub before_image: Option<String>,
    #[serde(default)]
    pub after_image: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(flatten)]
    pub questionnaire: Questionnaire,
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub status: TestimonyStatus,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub review_notes: Option<String>,
    /// Soul created for this testimony on approval
    #[serde(default)]
    pub soul_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Testimony {
    /// Media URLs attached to this testimony.
    pub fn media_urls(&self) -> Vec<String> {
        [&self.before_image, &self.after_image, &self.video]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

/// Reduced field set shown publicly once approved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PublicTestimony {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub testimony: String,
    #[serde(default)]
    pub before_image: Option<String>,
    #[serde(default)]
    pub after_image: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub soul_id: Option<String>,
    #[serde(default)]
    pub approved_at: Option<String>,
}

impl PublicTestimony {
    pub fn from_approved(testimony: &Testimony, soul_id: &str, approved_at: &str) -> Self {
        Self {
            id: testimony.id.clone(),
            title: testimony.title.clone(),
            testimony: testimony.testimony.clone(),
            before_image: testimony.before_image.clone(),
            after_image: testimony.after_image.clone(),
            video: testimony.video.clone(),
            display_name: testimony.display_name.clone(),
            soul_id: Some(soul_id.to_string()),
            approved_at: Some(approved_at.to_string()),
        }
    }
}

/// Request body for creating a testimony.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTestimony {
    #[validate(
        length(min = 1, max = 120, message = "Title must be 1-120 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,
    #[validate(length(
        min = 50,
        max = 2000,
        message = "Testimony must be between 50 and 2000 characters"
    ))]
    pub testimony: String,
    #[serde(flatten)]
    pub questionnaire: Questionnaire,
}

/// Request body for editing a testimony. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TestimonyUpdate {
    #[validate(
        length(min = 1, max = 120, message = "Title must be 1-120 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: Option<String>,
    #[validate(length(
        min = 50,
        max = 2000,
        message = "Testimony must be between 50 and 2000 characters"
    ))]
    pub testimony: Option<String>,
    #[serde(flatten)]
    pub questionnaire: QuestionnaireUpdate,
}

/// Admin decision recorded on review.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDecision {
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}
