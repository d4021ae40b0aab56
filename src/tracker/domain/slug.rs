//! URL-safe slugs derived from display names.

use super::TrackerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercase, hyphen-separated identifier such as `platform-team`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    const MAX_LENGTH: usize = 100;

    /// Creates a validated slug.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptySlug`] for a blank value or
    /// [`TrackerDomainError::InvalidSlug`] when the value is not already in
    /// slug form or exceeds 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TrackerDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TrackerDomainError::EmptySlug);
        }
        let is_valid = trimmed.len() <= Self::MAX_LENGTH
            && trimmed
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
            && !trimmed.starts_with('-')
            && !trimmed.ends_with('-')
            && !trimmed.contains("--");
        if !is_valid {
            return Err(TrackerDomainError::InvalidSlug(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Derives a slug from a display name.
    ///
    /// The name is lowercased, characters outside `[a-z0-9 -]` are dropped,
    /// whitespace runs become a single hyphen, repeated hyphens collapse and
    /// leading or trailing hyphens are removed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptySlug`] when nothing remains.
    pub fn from_name(name: &str) -> Result<Self, TrackerDomainError> {
        let mut slug = String::with_capacity(name.len());
        for ch in name.to_lowercase().chars() {
            let mapped = if ch.is_whitespace() || ch == '-' {
                '-'
            } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
                ch
            } else {
                continue;
            };
            if mapped == '-' && (slug.is_empty() || slug.ends_with('-')) {
                continue;
            }
            slug.push(mapped);
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        if slug.is_empty() {
            return Err(TrackerDomainError::EmptySlug);
        }
        slug.truncate(Self::MAX_LENGTH);
        let trimmed_len = slug.trim_end_matches('-').len();
        slug.truncate(trimmed_len);
        Ok(Self(slug))
    }

    /// Returns the slug as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Slug {
    type Error = TrackerDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
