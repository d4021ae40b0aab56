//! Themes grouping related projects.

use super::{EntityKind, ThemeId, TrackerDomainError, error::optional_text, error::required_text};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_TITLE_LENGTH: usize = 255;

/// Lifecycle state of a theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeStatus {
    /// Currently pursued.
    #[default]
    Active,
    /// Achieved.
    Completed,
    /// Retired; hidden from listings unless asked for.
    Archived,
}

impl ThemeStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl TryFrom<&str> for ThemeStatus {
    type Error = TrackerDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(TrackerDomainError::UnknownThemeStatus(value.to_owned())),
        }
    }
}

impl fmt::Display for ThemeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategic initiative grouping projects. Deleting a theme unlinks its
/// projects and never deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    id: ThemeId,
    title: String,
    description: Option<String>,
    status: ThemeStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Theme {
    /// Creates an active theme.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError`] when the title is empty or too long.
    pub fn new(title: impl Into<String>, clock: &impl Clock) -> Result<Self, TrackerDomainError> {
        let theme_title = required_text(EntityKind::Theme, title, MAX_TITLE_LENGTH)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: ThemeId::new(),
            title: theme_title,
            description: None,
            status: ThemeStatus::default(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = optional_text(Some(description.into()));
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: ThemeStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the theme identifier.
    #[must_use]
    pub const fn id(&self) -> ThemeId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ThemeStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn set_status(&mut self, status: ThemeStatus, clock: &impl Clock) {
        self.status = status;
        self.updated_at = clock.utc();
    }
}

/// Criteria for listing themes.
///
/// Archived themes are left out unless they are asked for, either with
/// [`ThemeFilter::including_archived`] or by filtering on
/// [`ThemeStatus::Archived`] directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeFilter {
    status: Option<ThemeStatus>,
    include_archived: bool,
}

impl ThemeFilter {
    /// Creates a filter matching every theme that is not archived.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one status.
    #[must_use]
    pub const fn with_status(mut self, status: ThemeStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Keeps archived themes in the result.
    #[must_use]
    pub const fn including_archived(mut self) -> Self {
        self.include_archived = true;
        self
    }

    /// Returns `true` when `theme` satisfies the filter.
    #[must_use]
    pub fn matches(&self, theme: &Theme) -> bool {
        match self.status {
            Some(status) => theme.status == status,
            None => self.include_archived || theme.status != ThemeStatus::Archived,
        }
    }
}
