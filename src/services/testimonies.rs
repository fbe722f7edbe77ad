// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Testimony lifecycle: drafting, submission, admin review and publication.
//!
//! Approval is a sequence of independent writes (soul, public copy,
//! testimony status, submission removal). Every write targets a
//! deterministic document ID, so re-running an approval that failed part
//! way through converges on the same end state.

use crate::db::document::{to_fields, Fields};
use crate::db::firestore::owned_by;
use crate::db::{collections, Direction, FirestoreDb, Filter, Query};
use crate::error::AppError;
use crate::models::soul::TESTIMONY_SOUL_PREFIX;
use crate::models::testimony::MAX_TESTIMONIES_PER_USER;
use crate::models::{
    NewTestimony, PublicTestimony, ReviewDecision, Soul, SoulStatus, Testimony, TestimonyStatus,
    TestimonyUpdate,
};
use crate::services::session::Session;
use crate::services::souls::Quota;
use crate::services::storage::{extension_for, StorageService};
use crate::time_utils::now_rfc3339;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use validator::Validate;

/// Largest accepted media upload.
pub const MAX_MEDIA_BYTES: usize = 25 * 1024 * 1024;

/// Media slot on a testimony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    BeforeImage,
    AfterImage,
    Video,
}

impl MediaKind {
    fn field(self) -> &'static str {
        match self {
            MediaKind::BeforeImage => "beforeImage",
            MediaKind::AfterImage => "afterImage",
            MediaKind::Video => "video",
        }
    }

    fn accepts(self, content_type: &str) -> bool {
        match self {
            MediaKind::Video => content_type.starts_with("video/"),
            MediaKind::BeforeImage | MediaKind::AfterImage => content_type.starts_with("image/"),
        }
    }

    fn current(self, testimony: &Testimony) -> Option<&str> {
        match self {
            MediaKind::BeforeImage => testimony.before_image.as_deref(),
            MediaKind::AfterImage => testimony.after_image.as_deref(),
            MediaKind::Video => testimony.video.as_deref(),
        }
    }
}

/// Soul document created for an approved testimony.
pub fn approval_soul_id(testimony_id: &str) -> String {
    format!("{}{}", TESTIMONY_SOUL_PREFIX, testimony_id)
}

pub async fn testimony_quota(
    db: &FirestoreDb,
    user_id: &str,
    is_admin: bool,
) -> Result<Quota, AppError> {
    let used = db
        .count_documents(
            collections::TESTIMONIES,
            &Query::new().filter(owned_by(user_id)),
        )
        .await?;
    Ok(Quota::new(used, MAX_TESTIMONIES_PER_USER, is_admin))
}

/// True while a non-admin user has no testimony yet.
pub async fn can_add_more_testimonies(
    db: &FirestoreDb,
    user_id: &str,
    is_admin: bool,
) -> Result<bool, AppError> {
    if is_admin {
        return Ok(true);
    }
    Ok(testimony_quota(db, user_id, is_admin).await?.can_add)
}

pub async fn get_testimony(db: &FirestoreDb, id: &str) -> Result<Testimony, AppError> {
    db.get_document_by_id(collections::TESTIMONIES, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Testimony {} not found", id)))?
        .into_model()
}

async fn get_modifiable(
    db: &FirestoreDb,
    session: &Session,
    id: &str,
) -> Result<Testimony, AppError> {
    let testimony = get_testimony(db, id).await?;
    if !session.can_modify(Some(&testimony.user_id)) {
        return Err(AppError::Forbidden("Not your testimony".to_string()));
    }
    Ok(testimony)
}

fn require_editable(testimony: &Testimony) -> Result<(), AppError> {
    if !testimony.status.is_editable() {
        return Err(AppError::Conflict(format!(
            "Testimony is {} and can no longer be edited",
            testimony.status.as_str()
        )));
    }
    Ok(())
}

pub async fn create_testimony(
    db: &FirestoreDb,
    session: &Session,
    new_testimony: NewTestimony,
) -> Result<Testimony, AppError> {
    new_testimony.validate()?;
    let profile = session.require_profile()?;

    if !can_add_more_testimonies(db, &session.uid, session.is_admin).await? {
        return Err(AppError::QuotaExceeded(
            "You have already shared a testimony".to_string(),
        ));
    }

    let display_name = match profile.derived_display_name() {
        name if name.is_empty() => profile.display_name.clone(),
        name => name,
    };

    let testimony = Testimony {
        id: String::new(),
        title: new_testimony.title.trim().to_string(),
        testimony: new_testimony.testimony,
        before_image: None,
        after_image: None,
        video: None,
        questionnaire: new_testimony.questionnaire,
        user_id: session.uid.clone(),
        display_name,
        status: TestimonyStatus::Unlinked,
        submitted_at: None,
        reviewed_at: None,
        reviewed_by: None,
        review_notes: None,
        soul_id: None,
        created_at: None,
        updated_at: None,
    };

    let doc = db
        .add_document(collections::TESTIMONIES, to_fields(&testimony)?)
        .await?;
    tracing::info!(uid = %session.uid, testimony_id = %doc.id, "Testimony created");
    doc.into_model()
}

pub async fn list_my_testimonies(
    db: &FirestoreDb,
    user_id: &str,
) -> Result<Vec<Testimony>, AppError> {
    let query = Query::new()
        .filter(owned_by(user_id))
        .order_by("createdAt", Direction::Descending);
    db.query_documents(collections::TESTIMONIES, &query)
        .await?
        .into_iter()
        .map(|doc| doc.into_model())
        .collect()
}

pub async fn update_testimony(
    db: &FirestoreDb,
    session: &Session,
    id: &str,
    update: TestimonyUpdate,
) -> Result<Testimony, AppError> {
    update.validate()?;
    let testimony = get_modifiable(db, session, id).await?;
    require_editable(&testimony)?;

    let mut fields = Fields::new();
    if let Some(title) = update.title {
        fields.insert("title".to_string(), title.trim().into());
    }
    if let Some(text) = update.testimony {
        fields.insert("testimony".to_string(), text.into());
    }
    fields.extend(to_fields(&update.questionnaire)?);
    if fields.is_empty() {
        return Ok(testimony);
    }

    db.update_document(collections::TESTIMONIES, id, fields)
        .await?;
    tracing::info!(uid = %session.uid, testimony_id = id, "Testimony updated");
    get_testimony(db, id).await
}

/// Owner submits a testimony for review, staging a copy in `submissions`.
pub async fn submit_testimony(
    db: &FirestoreDb,
    session: &Session,
    id: &str,
) -> Result<Testimony, AppError> {
    let testimony = get_modifiable(db, session, id).await?;
    if !testimony.status.can_transition_to(TestimonyStatus::Pending) {
        return Err(AppError::Conflict(format!(
            "Testimony is {} and cannot be submitted",
            testimony.status.as_str()
        )));
    }

    let mut fields = Fields::new();
    fields.insert("status".to_string(), TestimonyStatus::Pending.as_str().into());
    fields.insert("submittedAt".to_string(), now_rfc3339().into());
    // A resubmission starts a fresh review.
    for cleared in ["reviewedAt", "reviewedBy", "reviewNotes"] {
        fields.insert(cleared.to_string(), Value::Null);
    }
    db.update_document(collections::TESTIMONIES, id, fields)
        .await?;

    let submitted = get_testimony(db, id).await?;
    db.set_document(collections::SUBMISSIONS, id, to_fields(&submitted)?)
        .await?;

    tracing::info!(uid = %session.uid, testimony_id = id, "Testimony submitted for review");
    Ok(submitted)
}

/// Upload media for a testimony slot, replacing any previous file.
pub async fn attach_media(
    db: &FirestoreDb,
    storage: &StorageService,
    session: &Session,
    id: &str,
    kind: MediaKind,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<Testimony, AppError> {
    let testimony = get_modifiable(db, session, id).await?;
    require_editable(&testimony)?;

    if bytes.is_empty() || bytes.len() > MAX_MEDIA_BYTES {
        return Err(AppError::BadRequest(format!(
            "Media must be between 1 byte and {} MB",
            MAX_MEDIA_BYTES / (1024 * 1024)
        )));
    }
    let extension = extension_for(content_type)
        .filter(|_| kind.accepts(content_type))
        .ok_or_else(|| {
            AppError::BadRequest(format!("Unsupported content type: {}", content_type))
        })?;

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let path = format!(
        "testimonies/{}/{}/{}-{}.{}",
        testimony.user_id,
        id,
        kind.field(),
        suffix,
        extension
    );
    let url = storage.upload(&path, bytes, content_type).await?;

    let mut fields = Fields::new();
    fields.insert(kind.field().to_string(), url.into());
    db.update_document(collections::TESTIMONIES, id, fields)
        .await?;

    if let Some(previous) = kind.current(&testimony) {
        if let Err(e) = storage.delete_by_url(previous).await {
            tracing::warn!(testimony_id = id, error = %e, "Failed to remove replaced media");
        }
    }

    tracing::info!(uid = %session.uid, testimony_id = id, field = kind.field(), "Media attached");
    get_testimony(db, id).await
}

/// Delete a testimony and its media. Published copies are left to admins.
pub async fn delete_testimony(
    db: &FirestoreDb,
    storage: &StorageService,
    session: &Session,
    id: &str,
) -> Result<(), AppError> {
    let testimony = get_modifiable(db, session, id).await?;
    if testimony.status == TestimonyStatus::Approved && !session.is_admin {
        return Err(AppError::Conflict(
            "Approved testimonies can only be removed by an admin".to_string(),
        ));
    }

    for url in testimony.media_urls() {
        if let Err(e) = storage.delete_by_url(&url).await {
            tracing::warn!(testimony_id = id, error = %e, "Failed to remove media");
        }
    }

    // Dependent documents first; the testimony goes last so a failed delete
    // can be retried.
    let soul_id = approval_soul_id(id);
    let mut dependents = vec![(collections::SUBMISSIONS, id)];
    if testimony.status == TestimonyStatus::Approved {
        dependents.push((collections::PUBLIC_TESTIMONIES, id));
        dependents.push((collections::SOULS, soul_id.as_str()));
    }
    db.delete_documents(&dependents).await?;

    db.delete_document(collections::TESTIMONIES, id).await?;
    tracing::info!(
        uid = %session.uid,
        testimony_id = id,
        dependents = dependents.len(),
        "Testimony deleted"
    );
    Ok(())
}

/// Public testimonies, newest approval first. Errors yield an empty list.
pub async fn list_public_testimonies(db: &FirestoreDb, limit: Option<u32>) -> Vec<PublicTestimony> {
    let mut query = Query::new().order_by("approvedAt", Direction::Descending);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    match db
        .query_documents(collections::PUBLIC_TESTIMONIES, &query)
        .await
    {
        Ok(docs) => docs
            .into_iter()
            .filter_map(|doc| doc.into_model().ok())
            .collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list public testimonies");
            Vec::new()
        }
    }
}

// ─── Admin review ────────────────────────────────────────────

/// Submissions awaiting a decision, oldest first.
pub async fn list_submissions(
    db: &FirestoreDb,
    session: &Session,
    status: Option<TestimonyStatus>,
) -> Result<Vec<Testimony>, AppError> {
    session.require_admin()?;

    let mut query = Query::new();
    if let Some(status) = status {
        query = query.filter(Filter::eq("status", status.as_str()));
    }
    query = query.order_by("submittedAt", Direction::Ascending);

    db.query_documents(collections::SUBMISSIONS, &query)
        .await?
        .into_iter()
        .map(|doc| doc.into_model())
        .collect()
}

fn review_fields(status: TestimonyStatus, reviewer: &str, notes: Option<String>) -> Fields {
    let mut fields = Fields::new();
    fields.insert("status".to_string(), status.as_str().into());
    fields.insert("reviewedAt".to_string(), now_rfc3339().into());
    fields.insert("reviewedBy".to_string(), reviewer.into());
    fields.insert(
        "reviewNotes".to_string(),
        notes.map(Value::String).unwrap_or(Value::Null),
    );
    fields
}

async fn load_for_review(
    db: &FirestoreDb,
    session: &Session,
    id: &str,
) -> Result<Testimony, AppError> {
    session.require_admin()?;
    if db
        .get_document_by_id(collections::SUBMISSIONS, id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(format!("Submission {} not found", id)));
    }
    get_testimony(db, id).await
}

/// Run one write of a multi-step flow, logging which step failed.
async fn step<T>(
    flow: &'static str,
    name: &'static str,
    testimony_id: &str,
    fut: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    match fut.await {
        Ok(value) => {
            tracing::debug!(flow, step = name, testimony_id, "Step complete");
            Ok(value)
        }
        Err(e) => {
            tracing::error!(flow, step = name, testimony_id, error = %e, "Step failed");
            Err(e)
        }
    }
}

/// Mark a submission as under review.
pub async fn start_review(
    db: &FirestoreDb,
    session: &Session,
    id: &str,
) -> Result<Testimony, AppError> {
    let testimony = load_for_review(db, session, id).await?;
    if !testimony.status.can_transition_to(TestimonyStatus::Review) {
        return Err(AppError::Conflict(format!(
            "Testimony is {} and cannot move to review",
            testimony.status.as_str()
        )));
    }

    let mut fields = Fields::new();
    fields.insert("status".to_string(), TestimonyStatus::Review.as_str().into());
    fields.insert("reviewedBy".to_string(), session.uid.clone().into());

    db.update_document(collections::TESTIMONIES, id, fields.clone())
        .await?;
    db.update_document(collections::SUBMISSIONS, id, fields)
        .await?;

    tracing::info!(uid = %session.uid, testimony_id = id, "Review started");
    get_testimony(db, id).await
}

/// Approve a submission: create its soul, publish it and close the review.
pub async fn approve_submission(
    db: &FirestoreDb,
    session: &Session,
    id: &str,
    decision: ReviewDecision,
) -> Result<PublicTestimony, AppError> {
    decision.validate()?;
    let testimony = load_for_review(db, session, id).await?;

    // An approved testimony whose submission still exists is a retry.
    let resuming = testimony.status == TestimonyStatus::Approved;
    if !resuming && !testimony.status.can_transition_to(TestimonyStatus::Approved) {
        return Err(AppError::Conflict(format!(
            "Testimony is {} and cannot be approved",
            testimony.status.as_str()
        )));
    }
    if resuming {
        tracing::warn!(testimony_id = id, "Resuming partially applied approval");
    }

    let soul_id = approval_soul_id(id);
    let approved_at = now_rfc3339();

    let soul = Soul {
        id: String::new(),
        name: testimony.display_name.clone(),
        user_id: Some(testimony.user_id.clone()),
        email: None,
        phone: None,
        city: None,
        state: None,
        status: SoulStatus::Active,
        is_public: true,
        testimony_id: Some(id.to_string()),
        created_at: None,
        updated_at: None,
    };
    step(
        "approve",
        "create_soul",
        id,
        db.set_document(collections::SOULS, &soul_id, to_fields(&soul)?),
    )
    .await?;

    let public = PublicTestimony::from_approved(&testimony, &soul_id, &approved_at);
    step(
        "approve",
        "publish",
        id,
        db.set_document(collections::PUBLIC_TESTIMONIES, id, to_fields(&public)?),
    )
    .await?;

    let mut fields = review_fields(TestimonyStatus::Approved, &session.uid, decision.notes);
    fields.insert("soulId".to_string(), soul_id.clone().into());
    step(
        "approve",
        "mark_approved",
        id,
        db.update_document(collections::TESTIMONIES, id, fields),
    )
    .await?;

    step(
        "approve",
        "remove_submission",
        id,
        db.delete_document(collections::SUBMISSIONS, id),
    )
    .await?;

    tracing::info!(uid = %session.uid, testimony_id = id, soul_id = %soul_id, "Testimony approved");
    Ok(public)
}

/// Reject a submission. The owner may edit and resubmit.
pub async fn reject_submission(
    db: &FirestoreDb,
    session: &Session,
    id: &str,
    decision: ReviewDecision,
) -> Result<Testimony, AppError> {
    decision.validate()?;
    let testimony = load_for_review(db, session, id).await?;
    if !testimony.status.can_transition_to(TestimonyStatus::Rejected) {
        return Err(AppError::Conflict(format!(
            "Testimony is {} and cannot be rejected",
            testimony.status.as_str()
        )));
    }

    let fields = review_fields(TestimonyStatus::Rejected, &session.uid, decision.notes);
    step(
        "reject",
        "mark_rejected",
        id,
        db.update_document(collections::TESTIMONIES, id, fields),
    )
    .await?;
    step(
        "reject",
        "remove_submission",
        id,
        db.delete_document(collections::SUBMISSIONS, id),
    )
    .await?;

    tracing::info!(uid = %session.uid, testimony_id = id, "Testimony rejected");
    get_testimony(db, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Profile, Questionnaire};
    use crate::services::token_verifier::VerifiedIdentity;

    fn session(uid: &str, is_admin: bool) -> Session {
        let profile = Profile {
            id: uid.to_string(),
            first_name: Some("ruth".to_string()),
            last_name: Some("moab".to_string()),
            is_admin,
            ..Default::default()
        };
        Session::from_parts(
            VerifiedIdentity {
                uid: uid.to_string(),
                email: None,
                email_verified: true,
            },
            Some(profile),
        )
    }

    fn draft() -> NewTestimony {
        NewTestimony {
            title: "Found hope".to_string(),
            testimony: "I was lost and then I found a community that loved me well.".to_string(),
            questionnaire: Questionnaire::default(),
        }
    }

    #[tokio::test]
    async fn test_quota_one_per_user() {
        let db = FirestoreDb::new_in_memory();
        let user = session("u1", false);

        let created = create_testimony(&db, &user, draft()).await.unwrap();
        assert_eq!(created.status, TestimonyStatus::Unlinked);
        assert_eq!(created.display_name, "Ruth M.");

        let err = create_testimony(&db, &user, draft()).await.unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded(_)));
        assert!(!can_add_more_testimonies(&db, "u1", false).await.unwrap());
        assert!(can_add_more_testimonies(&db, "u1", true).await.unwrap());
    }

    #[tokio::test]
    async fn test_admin_bypasses_quota() {
        let db = FirestoreDb::new_in_memory();
        let admin = session("admin", true);
        create_testimony(&db, &admin, draft()).await.unwrap();
        create_testimony(&db, &admin, draft()).await.unwrap();
        assert_eq!(list_my_testimonies(&db, "admin").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_approval_flow() {
        let db = FirestoreDb::new_in_memory();
        let user = session("u1", false);
        let admin = session("admin", true);

        let created = create_testimony(&db, &user, draft()).await.unwrap();
        let submitted = submit_testimony(&db, &user, &created.id).await.unwrap();
        assert_eq!(submitted.status, TestimonyStatus::Pending);
        assert!(submitted.submitted_at.is_some());

        // Pending content is locked
        let err = update_testimony(&db, &user, &created.id, TestimonyUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let pending = list_submissions(&db, &admin, Some(TestimonyStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        let reviewing = start_review(&db, &admin, &created.id).await.unwrap();
        assert_eq!(reviewing.status, TestimonyStatus::Review);

        let public = approve_submission(&db, &admin, &created.id, ReviewDecision::default())
            .await
            .unwrap();
        assert_eq!(public.id, created.id);
        assert_eq!(public.soul_id.as_deref(), Some(approval_soul_id(&created.id).as_str()));

        let approved = get_testimony(&db, &created.id).await.unwrap();
        assert_eq!(approved.status, TestimonyStatus::Approved);
        assert_eq!(approved.reviewed_by.as_deref(), Some("admin"));

        let soul = db
            .get_document_by_id(collections::SOULS, &approval_soul_id(&created.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(soul.get("testimonyId").unwrap(), created.id.as_str());

        assert!(list_submissions(&db, &admin, None).await.unwrap().is_empty());
        assert_eq!(list_public_testimonies(&db, None).await.len(), 1);

        // The submission is gone, so a second approval finds nothing
        let err = approve_submission(&db, &admin, &created.id, ReviewDecision::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_approval_resumes_after_partial_failure() {
        let db = FirestoreDb::new_in_memory();
        let user = session("u1", false);
        let admin = session("admin", true);

        let created = create_testimony(&db, &user, draft()).await.unwrap();
        submit_testimony(&db, &user, &created.id).await.unwrap();
        approve_submission(&db, &admin, &created.id, ReviewDecision::default())
            .await
            .unwrap();

        // Simulate a crash before the submission was removed
        let testimony = get_testimony(&db, &created.id).await.unwrap();
        db.set_document(collections::SUBMISSIONS, &created.id, to_fields(&testimony).unwrap())
            .await
            .unwrap();

        approve_submission(&db, &admin, &created.id, ReviewDecision::default())
            .await
            .unwrap();
        assert_eq!(list_public_testimonies(&db, None).await.len(), 1);
        let souls = db.get_collection(collections::SOULS).await.unwrap();
        assert_eq!(souls.len(), 1);
    }

    #[tokio::test]
    async fn test_approval_soul_is_not_an_owner_submission() {
        let db = FirestoreDb::new_in_memory();
        let user = session("u1", false);
        let admin = session("admin", true);

        let created = create_testimony(&db, &user, draft()).await.unwrap();
        submit_testimony(&db, &user, &created.id).await.unwrap();
        approve_submission(&db, &admin, &created.id, ReviewDecision::default())
            .await
            .unwrap();

        let soul_id = approval_soul_id(&created.id);
        let mine = crate::services::souls::list_my_souls(&db, "u1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(mine[0].is_from_testimony());

        let quota = crate::services::souls::soul_quota(&db, "u1", false).await.unwrap();
        assert_eq!(quota.used, 0);
        assert!(quota.can_add);

        let err = crate::services::souls::delete_soul(&db, &user, &soul_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_deleting_approved_testimony_removes_public_copy() {
        let db = FirestoreDb::new_in_memory();
        let storage = StorageService::new_in_memory("bucket");
        let user = session("u1", false);
        let admin = session("admin", true);

        let created = create_testimony(&db, &user, draft()).await.unwrap();
        submit_testimony(&db, &user, &created.id).await.unwrap();
        approve_submission(&db, &admin, &created.id, ReviewDecision::default())
            .await
            .unwrap();

        let err = delete_testimony(&db, &storage, &user, &created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        delete_testimony(&db, &storage, &admin, &created.id)
            .await
            .unwrap();
        assert!(list_public_testimonies(&db, None).await.is_empty());
        assert!(db
            .get_document_by_id(collections::SOULS, &approval_soul_id(&created.id))
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            get_testimony(&db, &created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reject_then_resubmit() {
        let db = FirestoreDb::new_in_memory();
        let user = session("u1", false);
        let admin = session("admin", true);

        let created = create_testimony(&db, &user, draft()).await.unwrap();
        submit_testimony(&db, &user, &created.id).await.unwrap();

        let decision = ReviewDecision {
            notes: Some("Please add more detail".to_string()),
        };
        let rejected = reject_submission(&db, &admin, &created.id, decision)
            .await
            .unwrap();
        assert_eq!(rejected.status, TestimonyStatus::Rejected);
        assert_eq!(rejected.review_notes.as_deref(), Some("Please add more detail"));

        let update = TestimonyUpdate {
            title: Some("Found hope again".to_string()),
            ..Default::default()
        };
        update_testimony(&db, &user, &created.id, update).await.unwrap();

        let resubmitted = submit_testimony(&db, &user, &created.id).await.unwrap();
        assert_eq!(resubmitted.status, TestimonyStatus::Pending);
        assert_eq!(resubmitted.review_notes, None);
        assert_eq!(resubmitted.title, "Found hope again");
    }

    #[tokio::test]
    async fn test_review_requires_admin() {
        let db = FirestoreDb::new_in_memory();
        let user = session("u1", false);
        let created = create_testimony(&db, &user, draft()).await.unwrap();
        submit_testimony(&db, &user, &created.id).await.unwrap();

        let err = approve_submission(&db, &user, &created.id, ReviewDecision::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(matches!(
            list_submissions(&db, &user, None).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_media_replacement_and_delete() {
        let db = FirestoreDb::new_in_memory();
        let storage = StorageService::new_in_memory("bucket");
        let user = session("u1", false);
        let created = create_testimony(&db, &user, draft()).await.unwrap();

        let first = attach_media(
            &db, &storage, &user, &created.id, MediaKind::BeforeImage, vec![1], "image/png",
        )
        .await
        .unwrap();
        let first_url = first.before_image.clone().unwrap();
        let first_path = storage.path_from_url(&first_url).unwrap();
        assert!(storage.get_in_memory(&first_path).is_some());

        let second = attach_media(
            &db, &storage, &user, &created.id, MediaKind::BeforeImage, vec![2], "image/jpeg",
        )
        .await
        .unwrap();
        assert_ne!(second.before_image, Some(first_url));
        assert!(storage.get_in_memory(&first_path).is_none());

        let err = attach_media(
            &db, &storage, &user, &created.id, MediaKind::Video, vec![3], "image/png",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        delete_testimony(&db, &storage, &user, &created.id).await.unwrap();
        let second_path = storage.path_from_url(&second.before_image.unwrap()).unwrap();
        assert!(storage.get_in_memory(&second_path).is_none());
        assert!(matches!(
            get_testimony(&db, &created.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
