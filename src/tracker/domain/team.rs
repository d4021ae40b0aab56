//! Team entity.

use super::{
    EntityKind, Slug, TeamId, TrackerDomainError, error::optional_text, error::required_text,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

const MAX_NAME_LENGTH: usize = 100;

/// A team owning task types and tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: String,
    slug: Slug,
    description: Option<String>,
    color: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Team {
    /// Creates a team whose slug is derived from its name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError`] when the name is empty, too long, or
    /// yields no slug characters.
    pub fn new(name: impl Into<String>, clock: &impl Clock) -> Result<Self, TrackerDomainError> {
        let validated_name = team_name(name)?;
        let slug = Slug::from_name(&validated_name)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: TeamId::new(),
            name: validated_name,
            slug,
            description: None,
            color: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Replaces the derived slug.
    #[must_use]
    pub fn with_slug(mut self, slug: Slug) -> Self {
        self.slug = slug;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = optional_text(Some(description.into()));
        self
    }

    /// Sets the display colour.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = optional_text(Some(color.into()));
        self
    }

    /// Returns the team identifier.
    #[must_use]
    pub const fn id(&self) -> TeamId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unique slug.
    #[must_use]
    pub const fn slug(&self) -> &Slug {
        &self.slug
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the display colour, if any.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
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

    pub(crate) fn rename(&mut self, name: String, slug: Slug, clock: &impl Clock) {
        self.name = name;
        self.slug = slug;
        self.updated_at = clock.utc();
    }

    pub(crate) fn recolor(&mut self, color: Option<String>, clock: &impl Clock) {
        self.color = optional_text(color);
        self.updated_at = clock.utc();
    }
}

/// Validates a team name, returning the trimmed value.
pub(crate) fn team_name(name: impl Into<String>) -> Result<String, TrackerDomainError> {
    required_text(EntityKind::Team, name, MAX_NAME_LENGTH)
}
