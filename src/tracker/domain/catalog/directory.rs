//! Teams, themes and releases.

use super::{Catalog, StatusCount};
use crate::tracker::domain::{
    EntityKind, EntityRef, Release, ReleaseId, ReleaseStatus, Slug, Team, TeamId, Theme,
    ThemeId, ThemeStatus, team::team_name,
};
use crate::tracker::error::{Conflict, EngineError, EngineResult};
use mockable::Clock;

/// Task statistics for one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamStats {
    /// The team described.
    pub team_id: TeamId,
    /// Whether this is the protected Unassigned team.
    pub is_unassigned: bool,
    /// Tasks owned by the team.
    pub total_tasks: usize,
    /// Task types registered under the team.
    pub task_type_count: usize,
    /// Per-status task counts across all of the team's types, ordered by
    /// label. Statuses no task holds are omitted.
    pub by_status: Vec<StatusCount>,
}

impl Catalog {
    /// Registers a team.
    ///
    /// # Errors
    ///
    /// Returns [`Conflict::DuplicateSlug`] when another team uses the slug.
    pub fn insert_team(&mut self, team: Team) -> EngineResult<TeamId> {
        self.ensure_team_slug_free(team.slug(), None)?;
        let id = team.id();
        self.teams.insert(id, team);
        Ok(id)
    }

    /// Renames a team. Without an explicit slug the slug is derived from the
    /// new name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`], a name validation error, or
    /// [`Conflict::DuplicateSlug`] when another team uses the slug.
    pub fn rename_team(
        &mut self,
        id: TeamId,
        name: &str,
        slug: Option<Slug>,
        clock: &impl Clock,
    ) -> EngineResult<Team> {
        self.team(id)?;
        let validated_name = team_name(name)?;
        let resolved_slug = match slug {
            Some(explicit) => explicit,
            None => Slug::from_name(&validated_name)?,
        };
        self.ensure_team_slug_free(&resolved_slug, Some(id))?;
        let team = self.team_mut(id)?;
        team.rename(validated_name, resolved_slug, clock);
        Ok(team.clone())
    }

    /// Sets or clears a team's display colour.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the team does not exist.
    pub fn recolor_team(
        &mut self,
        id: TeamId,
        color: Option<String>,
        clock: &impl Clock,
    ) -> EngineResult<Team> {
        let team = self.team_mut(id)?;
        team.recolor(color, clock);
        Ok(team.clone())
    }

    /// Registers a theme.
    pub fn insert_theme(&mut self, theme: Theme) -> ThemeId {
        let id = theme.id();
        self.themes.insert(id, theme);
        id
    }

    /// Moves a theme to another lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the theme does not exist.
    pub fn set_theme_status(
        &mut self,
        id: ThemeId,
        status: ThemeStatus,
        clock: &impl Clock,
    ) -> EngineResult<Theme> {
        let theme = self
            .themes
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(EntityRef::Theme(id)))?;
        theme.set_status(status, clock);
        Ok(theme.clone())
    }

    /// Counts the tasks and task types of a team.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the team does not exist.
    pub fn team_stats(&self, id: TeamId) -> EngineResult<TeamStats> {
        self.team(id)?;
        let task_type_count = self
            .task_types
            .values()
            .filter(|task_type| task_type.team_id() == id)
            .count();
        let mut by_status: Vec<StatusCount> = Vec::new();
        for task in self.tasks.values().filter(|task| task.team_id() == id) {
            match by_status
                .iter_mut()
                .find(|entry| &entry.status == task.status())
            {
                Some(entry) => entry.count += 1,
                None => by_status.push(StatusCount {
                    status: task.status().clone(),
                    count: 1,
                }),
            }
        }
        by_status.sort_by(|left, right| left.status.as_str().cmp(right.status.as_str()));
        Ok(TeamStats {
            team_id: id,
            is_unassigned: id == self.defaults.team_id(),
            total_tasks: by_status.iter().map(|entry| entry.count).sum(),
            task_type_count,
            by_status,
        })
    }

    /// Registers a release.
    ///
    /// # Errors
    ///
    /// Returns [`Conflict::DuplicateReleaseVersion`] when another release
    /// uses the version.
    pub fn insert_release(&mut self, release: Release) -> EngineResult<ReleaseId> {
        let taken = self
            .releases
            .values()
            .any(|existing| existing.version() == release.version());
        if taken {
            return Err(Conflict::DuplicateReleaseVersion {
                version: release.version().to_owned(),
            }
            .into());
        }
        let id = release.id();
        self.releases.insert(id, release);
        Ok(id)
    }

    /// Moves a release to another delivery status.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the release does not exist.
    pub fn set_release_status(
        &mut self,
        id: ReleaseId,
        status: ReleaseStatus,
        clock: &impl Clock,
    ) -> EngineResult<Release> {
        let release = self
            .releases
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(EntityRef::Release(id)))?;
        release.set_status(status, clock);
        Ok(release.clone())
    }

    fn team_mut(&mut self, id: TeamId) -> EngineResult<&mut Team> {
        self.teams
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(EntityRef::Team(id)))
    }

    fn ensure_team_slug_free(&self, slug: &Slug, owner: Option<TeamId>) -> EngineResult<()> {
        let taken = self
            .teams
            .values()
            .any(|team| team.slug() == slug && Some(team.id()) != owner);
        if taken {
            return Err(Conflict::DuplicateSlug {
                kind: EntityKind::Team,
                slug: slug.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
