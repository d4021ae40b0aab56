//! Releases grouping tasks by version.

use super::{EntityKind, ReleaseId, TrackerDomainError, error::optional_text, error::required_text};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_VERSION_LENGTH: usize = 50;
const MAX_TITLE_LENGTH: usize = 255;

/// Delivery state of a release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    /// Scheduled but not started.
    #[default]
    Planned,
    /// Work towards the release is under way.
    InProgress,
    /// Shipped.
    Released,
    /// Abandoned.
    Cancelled,
}

impl ReleaseStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Released => "released",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for ReleaseStatus {
    type Error = TrackerDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "in_progress" => Ok(Self::InProgress),
            "released" => Ok(Self::Released),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(TrackerDomainError::UnknownReleaseStatus(value.to_owned())),
        }
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A versioned release. Versions are unique; deleting a release unlinks its
/// tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    id: ReleaseId,
    version: String,
    title: String,
    description: Option<String>,
    target_date: Option<NaiveDate>,
    release_date: Option<NaiveDate>,
    status: ReleaseStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Release {
    /// Creates a planned release.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptyReleaseVersion`] for a blank
    /// version, or a title validation error.
    pub fn new(
        version: impl Into<String>,
        title: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, TrackerDomainError> {
        let release_version = required_text(EntityKind::Release, version, MAX_VERSION_LENGTH)
            .map_err(|err| match err {
                TrackerDomainError::EmptyName(_) => TrackerDomainError::EmptyReleaseVersion,
                other => other,
            })?;
        let release_title = required_text(EntityKind::Release, title, MAX_TITLE_LENGTH)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: ReleaseId::new(),
            version: release_version,
            title: release_title,
            description: None,
            target_date: None,
            release_date: None,
            status: ReleaseStatus::Planned,
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

    /// Sets the target date.
    #[must_use]
    pub const fn with_target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    /// Returns the release identifier.
    #[must_use]
    pub const fn id(&self) -> ReleaseId {
        self.id
    }

    /// Returns the unique version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
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

    /// Returns the target date, if any.
    #[must_use]
    pub const fn target_date(&self) -> Option<NaiveDate> {
        self.target_date
    }

    /// Returns the date the release shipped, if it has.
    #[must_use]
    pub const fn release_date(&self) -> Option<NaiveDate> {
        self.release_date
    }

    /// Returns the delivery status.
    #[must_use]
    pub const fn status(&self) -> ReleaseStatus {
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

    /// Moves the release to `status`, stamping the release date when it
    /// ships.
    pub(crate) fn set_status(&mut self, status: ReleaseStatus, clock: &impl Clock) {
        let now = clock.utc();
        if status == ReleaseStatus::Released && self.release_date.is_none() {
            self.release_date = Some(now.date_naive());
        }
        self.status = status;
        self.updated_at = now;
    }
}
