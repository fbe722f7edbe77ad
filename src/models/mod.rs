// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod more_page;
pub mod profile;
pub mod soul;
pub mod testimony;
pub mod validation;

pub use more_page::MorePage;
pub use profile::{
    check_profile_completeness, create_display_name, Profile, ProfileCompleteness, ProfileUpdate,
};
pub use soul::{AnonymousSoul, NewSoul, PublicSoul, Soul, SoulStatus, SoulUpdate};
pub use testimony::{
    Answer, NewTestimony, PublicTestimony, Questionnaire, QuestionnaireUpdate, ReviewDecision,
    Testimony, TestimonyStatus, TestimonyUpdate,
};
