//! Profile field validation.
//!
//! The limits match the backend's own checks so a form can reject input
//! before a round-trip. Lengths are counted in characters, and display names
//! are measured after trimming.

use thiserror::Error;

pub const DISPLAY_NAME_MIN_LENGTH: usize = 2;
pub const DISPLAY_NAME_MAX_LENGTH: usize = 20;
pub const BIO_MAX_LENGTH: usize = 500;

/// A rejected profile field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Display name is required")]
    DisplayNameRequired,

    #[error("Display name must be at least 2 characters")]
    DisplayNameTooShort,

    #[error("Display name must not exceed 20 characters")]
    DisplayNameTooLong,

    #[error("Bio must not exceed 500 characters")]
    BioTooLong,
}

impl ValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::DisplayNameRequired
            | ValidationError::DisplayNameTooShort
            | ValidationError::DisplayNameTooLong => "display_name",
            ValidationError::BioTooLong => "bio",
        }
    }
}

/// The limits in one place, for forms that display them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    pub display_name_min_length: usize,
    pub display_name_max_length: usize,
    pub bio_max_length: usize,
}

impl ValidationLimits {
    pub const fn current() -> Self {
        Self {
            display_name_min_length: DISPLAY_NAME_MIN_LENGTH,
            display_name_max_length: DISPLAY_NAME_MAX_LENGTH,
            bio_max_length: BIO_MAX_LENGTH,
        }
    }
}

pub fn validate_display_name(display_name: Option<&str>) -> Result<(), ValidationError> {
    let name = display_name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ValidationError::DisplayNameRequired);
    }

    let length = name.chars().count();
    if length < DISPLAY_NAME_MIN_LENGTH {
        return Err(ValidationError::DisplayNameTooShort);
    }
    if length > DISPLAY_NAME_MAX_LENGTH {
        return Err(ValidationError::DisplayNameTooLong);
    }
    Ok(())
}

/// Bio is optional; only its length is checked.
pub fn validate_bio(bio: Option<&str>) -> Result<(), ValidationError> {
    match bio {
        Some(bio) if bio.chars().count() > BIO_MAX_LENGTH => Err(ValidationError::BioTooLong),
        _ => Ok(()),
    }
}

/// Checks for a new profile. The first failing field wins.
pub fn validate_profile_data(
    display_name: Option<&str>,
    bio: Option<&str>,
) -> Result<(), ValidationError> {
    validate_display_name(display_name)?;
    validate_bio(bio)
}

/// Checks for a partial update: an absent or empty display name means "leave
/// it unchanged" and is not validated.
pub fn validate_profile_update(
    display_name: Option<&str>,
    bio: Option<&str>,
) -> Result<(), ValidationError> {
    if display_name.is_some_and(|name| !name.is_empty()) {
        validate_display_name(display_name)?;
    }
    validate_bio(bio)
}
