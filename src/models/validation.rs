// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field validators shared by request types.

use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use validator::ValidationError;

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Phone numbers: digits with optional `+`, spaces, dashes, dots and parentheses.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '.' | '(' | ')'));
    let digits = value.chars().filter(char::is_ascii_digit).count();

    if !allowed || !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(invalid("phone", "Please enter a valid phone number"));
    }
    Ok(())
}

/// Dates of birth as `YYYY-MM-DD`, not in the future.
pub fn validate_dob(value: &str) -> Result<(), ValidationError> {
    let date = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| invalid("dob", "Date of birth must be YYYY-MM-DD"))?;

    if date > chrono::Utc::now().date_naive() {
        return Err(invalid("dob", "Date of birth cannot be in the future"));
    }
    Ok(())
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "This field is required"));
    }
    Ok(())
}

/// Deserialize a string with surrounding whitespace removed, so that
/// format validators see the value that will be stored.
pub fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

/// Optional variant of [`trimmed`]. Use together with `#[serde(default)]`.
pub fn trimmed_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.map(|s| s.trim().to_string()))
}
