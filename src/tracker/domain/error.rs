//! Error types for tracker entity construction.

use super::EntityKind;
use thiserror::Error;

/// Errors returned while constructing tracker entities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerDomainError {
    /// A required name or title is empty after trimming.
    #[error("{0} name must not be empty")]
    EmptyName(EntityKind),

    /// A name or title exceeds its maximum length.
    #[error("{kind} name exceeds {max} characters")]
    NameTooLong {
        /// Kind of the entity being named.
        kind: EntityKind,
        /// Maximum permitted length in characters.
        max: usize,
    },

    /// A slug is empty, or a name produced no slug characters.
    #[error("slug must not be empty")]
    EmptySlug,

    /// A slug contains characters other than lowercase ASCII alphanumerics
    /// and single interior hyphens.
    #[error("invalid slug '{0}'")]
    InvalidSlug(String),

    /// A release version is empty after trimming.
    #[error("release version must not be empty")]
    EmptyReleaseVersion,

    /// A release status string is not recognised.
    #[error("unknown release status '{0}'")]
    UnknownReleaseStatus(String),

    /// A theme status string is not recognised.
    #[error("unknown theme status '{0}'")]
    UnknownThemeStatus(String),
}

/// Trims `value` and checks it is non-empty and at most `max` characters.
pub(crate) fn required_text(
    kind: EntityKind,
    value: impl Into<String>,
    max: usize,
) -> Result<String, TrackerDomainError> {
    let raw = value.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TrackerDomainError::EmptyName(kind));
    }
    if trimmed.chars().count() > max {
        return Err(TrackerDomainError::NameTooLong { kind, max });
    }
    Ok(trimmed.to_owned())
}

/// Trims optional free text, mapping blank values to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
