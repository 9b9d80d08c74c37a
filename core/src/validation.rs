//! Field-level validation rules.
//!
//! These mirror the constraints the stored documents have always carried.
//! Each function returns `VibeError::Validation` with a user-facing message.

use crate::error::{Result, VibeError};
use chrono::{DateTime, Utc};

/// Minimum title length (characters, after trimming).
pub const TITLE_MIN: usize = 5;
/// Maximum title length.
pub const TITLE_MAX: usize = 100;
/// Minimum description length.
pub const DESCRIPTION_MIN: usize = 20;
/// Maximum description length.
pub const DESCRIPTION_MAX: usize = 1000;
/// Minimum event capacity.
pub const CAPACITY_MIN: u32 = 1;
/// Maximum event capacity.
pub const CAPACITY_MAX: u32 = 500;
/// Minimum password length.
pub const PASSWORD_MIN: usize = 6;

/// Validate and normalize an event title.
///
/// # Errors
///
/// Returns `Validation` if the trimmed title is outside 5-100 characters.
pub fn title(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < TITLE_MIN {
        return Err(VibeError::validation(format!(
            "Title must be at least {TITLE_MIN} characters"
        )));
    }
    if len > TITLE_MAX {
        return Err(VibeError::validation(format!(
            "Title cant exceed {TITLE_MAX} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate an event description.
///
/// # Errors
///
/// Returns `Validation` if the description is outside 20-1000 characters.
pub fn description(raw: &str) -> Result<String> {
    let len = raw.chars().count();
    if len < DESCRIPTION_MIN {
        return Err(VibeError::validation(format!(
            "Description must be at least {DESCRIPTION_MIN} characters"
        )));
    }
    if len > DESCRIPTION_MAX {
        return Err(VibeError::validation(format!(
            "Description cant exceed {DESCRIPTION_MAX} characters"
        )));
    }
    Ok(raw.to_string())
}

/// The event date must lie strictly after `now`.
///
/// # Errors
///
/// Returns `Validation` for dates in the past.
pub fn future_date(date: DateTime<Utc>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if date < now {
        return Err(VibeError::validation("Event date must be in the future"));
    }
    Ok(date)
}

/// Free-text event time; only presence is enforced.
///
/// # Errors
///
/// Returns `Validation` when blank.
pub fn time(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(VibeError::validation(
            "Event time is required in 24 hour format",
        ));
    }
    Ok(trimmed.to_string())
}

/// Capacity must be within 1-500.
///
/// # Errors
///
/// Returns `Validation` when out of range.
pub fn capacity(value: u32) -> Result<u32> {
    if value < CAPACITY_MIN {
        return Err(VibeError::validation(format!(
            "Capacity must be at least {CAPACITY_MIN}"
        )));
    }
    if value > CAPACITY_MAX {
        return Err(VibeError::validation(format!(
            "Capacity cannot exceed {CAPACITY_MAX}"
        )));
    }
    Ok(value)
}

/// Price must be a finite, non-negative number.
///
/// # Errors
///
/// Returns `Validation` for negative, NaN or infinite prices.
pub fn price(value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(VibeError::validation("Price must be a non-negative number"));
    }
    Ok(value)
}

/// A reservation must claim at least one ticket.
///
/// # Errors
///
/// Returns `Validation` for zero.
pub fn ticket_count(value: u32) -> Result<u32> {
    if value == 0 {
        return Err(VibeError::validation("Must reserve at least one spot"));
    }
    Ok(value)
}

/// Display name must not be blank.
///
/// # Errors
///
/// Returns `Validation` when blank.
pub fn name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(VibeError::validation("Name is required"));
    }
    Ok(trimmed.to_string())
}

/// Trim, lowercase and check the shape of an email address.
///
/// # Errors
///
/// Returns `Validation` for malformed addresses.
///
/// # Examples
///
/// ```
/// use vibe_core::validation::email;
///
/// assert_eq!(email("  Ada@Example.COM ").unwrap(), "ada@example.com");
/// assert!(email("invalid").is_err());
/// assert!(email("user@").is_err());
/// ```
pub fn email(raw: &str) -> Result<String> {
    let normalized = raw.trim().to_lowercase();
    if is_valid_email(&normalized) {
        Ok(normalized)
    } else {
        Err(VibeError::validation("Invalid email address"))
    }
}

/// Basic RFC 5322 shape check.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if email.chars().any(char::is_whitespace) {
        return false;
    }

    // Domain needs a dot that is neither leading nor trailing
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Password rules: at least 6 characters after trimming, and must not
/// contain the word "password".
///
/// Returns the trimmed password, which is what gets hashed.
///
/// # Errors
///
/// Returns `Validation` describing the first rule violated.
pub fn password(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < PASSWORD_MIN {
        return Err(VibeError::validation(format!(
            "Password must be at least {PASSWORD_MIN} characters long"
        )));
    }
    if trimmed.to_lowercase().contains("password") {
        return Err(VibeError::validation(
            "Password cannot contain \"password\"",
        ));
    }
    Ok(trimmed.to_string())
}

/// Coordinates must be two finite numbers in range.
///
/// # Errors
///
/// Returns `Validation` for out-of-range or non-finite coordinates.
pub fn coordinates(longitude: f64, latitude: f64) -> Result<()> {
    if !longitude.is_finite() || !latitude.is_finite() {
        return Err(VibeError::validation("Coordinates must be numbers"));
    }
    if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
        return Err(VibeError::validation("Coordinates are out of range"));
    }
    Ok(())
}
