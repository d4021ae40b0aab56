//! Teams, themes and releases.

use crate::tracker::{
    domain::{
        Release, ReleaseId, ReleaseStatus, Slug, Team, TeamId, TeamStats, Theme, ThemeFilter,
        ThemeId, ThemeStatus, TrackerDomainError,
    },
    error::EngineResult,
    ports::WorkspaceStore,
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, instrument};

/// Request payload for creating a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDefinition {
    name: String,
    slug: Option<Slug>,
    description: Option<String>,
    color: Option<String>,
}

impl TeamDefinition {
    /// Creates a definition whose slug will be derived from `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
            description: None,
            color: None,
        }
    }

    /// Sets an explicit slug.
    #[must_use]
    pub fn with_slug(mut self, slug: Slug) -> Self {
        self.slug = Some(slug);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the display colour.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    fn into_team(self, clock: &impl Clock) -> Result<Team, TrackerDomainError> {
        let mut team = Team::new(self.name, clock)?;
        if let Some(slug) = self.slug {
            team = team.with_slug(slug);
        }
        if let Some(description) = self.description {
            team = team.with_description(description);
        }
        if let Some(color) = self.color {
            team = team.with_color(color);
        }
        Ok(team)
    }
}

/// Management of teams, themes and releases.
#[derive(Clone)]
pub struct DirectoryService<S, C>
where
    S: WorkspaceStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> DirectoryService<S, C>
where
    S: WorkspaceStore,
    C: Clock + Send + Sync,
{
    /// Creates a new directory service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Creates a team.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the slug is taken or a domain error when the
    /// name is invalid.
    #[instrument(skip(self, definition), fields(name = %definition.name))]
    pub async fn create_team(&self, definition: TeamDefinition) -> EngineResult<Team> {
        let clock = &*self.clock;
        let team = self
            .store
            .transact(move |catalog| {
                let team = definition.into_team(clock)?;
                catalog.insert_team(team.clone())?;
                Ok(team)
            })
            .await?;
        info!(team = %team.id(), slug = %team.slug(), "created team");
        Ok(team)
    }

    /// Renames a team, deriving the slug from the new name unless one is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, a domain error for an invalid name, or `Conflict`
    /// when the slug is taken.
    #[instrument(skip(self))]
    pub async fn rename_team(
        &self,
        id: TeamId,
        name: &str,
        slug: Option<Slug>,
    ) -> EngineResult<Team> {
        let clock = &*self.clock;
        let team = self
            .store
            .transact(move |catalog| catalog.rename_team(id, name, slug, clock))
            .await?;
        info!(team = %id, slug = %team.slug(), "renamed team");
        Ok(team)
    }

    /// Sets or clears a team's display colour.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the team does not exist.
    #[instrument(skip(self))]
    pub async fn recolor_team(&self, id: TeamId, color: Option<String>) -> EngineResult<Team> {
        let clock = &*self.clock;
        self.store
            .transact(move |catalog| catalog.recolor_team(id, color, clock))
            .await
    }

    /// Returns the team with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the team does not exist.
    #[instrument(skip(self))]
    pub async fn find_team(&self, id: TeamId) -> EngineResult<Team> {
        self.store
            .read(move |catalog| catalog.team(id).cloned())
            .await
    }

    /// Returns the protected team that owns the default task type.
    ///
    /// # Errors
    ///
    /// Returns a store error when the catalog cannot be read.
    #[instrument(skip(self))]
    pub async fn unassigned_team(&self) -> EngineResult<Team> {
        self.store
            .read(|catalog| catalog.team(catalog.defaults().team_id()).cloned())
            .await
    }

    /// Returns every team, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a store error when the catalog cannot be read.
    #[instrument(skip(self))]
    pub async fn list_teams(&self) -> EngineResult<Vec<Team>> {
        self.store
            .read(|catalog| {
                let mut teams: Vec<Team> = catalog.teams().cloned().collect();
                teams.sort_by(|left, right| left.name().cmp(right.name()));
                Ok(teams)
            })
            .await
    }

    /// Returns task and task type counts for a team.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the team does not exist.
    #[instrument(skip(self))]
    pub async fn team_stats(&self, id: TeamId) -> EngineResult<TeamStats> {
        self.store.read(move |catalog| catalog.team_stats(id)).await
    }

    /// Creates an active theme.
    ///
    /// # Errors
    ///
    /// Returns a domain error for an empty title.
    #[instrument(skip(self, description))]
    pub async fn create_theme(
        &self,
        title: &str,
        description: Option<String>,
    ) -> EngineResult<Theme> {
        let clock = &*self.clock;
        let theme = self
            .store
            .transact(move |catalog| {
                let mut theme = Theme::new(title, clock)?;
                if let Some(text) = description {
                    theme = theme.with_description(text);
                }
                catalog.insert_theme(theme.clone());
                Ok(theme)
            })
            .await?;
        info!(theme = %theme.id(), "created theme");
        Ok(theme)
    }

    /// Moves a theme to another lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the theme does not exist.
    #[instrument(skip(self))]
    pub async fn set_theme_status(&self, id: ThemeId, status: ThemeStatus) -> EngineResult<Theme> {
        let clock = &*self.clock;
        let theme = self
            .store
            .transact(move |catalog| catalog.set_theme_status(id, status, clock))
            .await?;
        info!(theme = %id, %status, "changed theme status");
        Ok(theme)
    }

    /// Returns the themes matching `filter`, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns a store error when the catalog cannot be read.
    #[instrument(skip(self))]
    pub async fn list_themes(&self, filter: ThemeFilter) -> EngineResult<Vec<Theme>> {
        self.store
            .read(move |catalog| {
                let mut themes: Vec<Theme> = catalog
                    .themes()
                    .filter(|theme| filter.matches(theme))
                    .cloned()
                    .collect();
                themes.sort_by(|left, right| left.title().cmp(right.title()));
                Ok(themes)
            })
            .await
    }

    /// Creates a planned release.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the version is taken or a domain error for a
    /// blank version or title.
    #[instrument(skip(self))]
    pub async fn create_release(
        &self,
        version: &str,
        title: &str,
        target_date: Option<NaiveDate>,
    ) -> EngineResult<Release> {
        let clock = &*self.clock;
        let release = self
            .store
            .transact(move |catalog| {
                let mut release = Release::new(version, title, clock)?;
                if let Some(date) = target_date {
                    release = release.with_target_date(date);
                }
                catalog.insert_release(release.clone())?;
                Ok(release)
            })
            .await?;
        info!(release = %release.id(), version, "created release");
        Ok(release)
    }

    /// Moves a release to another delivery status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the release does not exist.
    #[instrument(skip(self))]
    pub async fn set_release_status(
        &self,
        id: ReleaseId,
        status: ReleaseStatus,
    ) -> EngineResult<Release> {
        let clock = &*self.clock;
        let release = self
            .store
            .transact(move |catalog| catalog.set_release_status(id, status, clock))
            .await?;
        info!(release = %id, %status, "changed release status");
        Ok(release)
    }

    /// Returns every release, ordered by version.
    ///
    /// # Errors
    ///
    /// Returns a store error when the catalog cannot be read.
    #[instrument(skip(self))]
    pub async fn list_releases(&self) -> EngineResult<Vec<Release>> {
        self.store
            .read(|catalog| {
                let mut releases: Vec<Release> = catalog.releases().cloned().collect();
                releases.sort_by(|left, right| left.version().cmp(right.version()));
                Ok(releases)
            })
            .await
    }
}
