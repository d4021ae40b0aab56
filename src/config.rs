//! Engine configuration established once at bootstrap.
//!
//! The configuration names the deployment-wide display identifier prefix and
//! describes the sentinel team and task type created when a workspace is
//! first bootstrapped.
//!
//! # Examples
//!
//! ```
//! use corepm::config::EngineConfig;
//!
//! let config = EngineConfig::from_lookup(|key| {
//!     (key == "TASK_ID_PREFIX").then(|| "ORBIT".to_owned())
//! })
//! .expect("valid configuration");
//! assert_eq!(config.task_id_prefix.as_str(), "ORBIT");
//! assert_eq!(config.unassigned_team_name, "Unassigned");
//! ```

use crate::display_id::domain::{DisplayIdError, IdPrefix};
use crate::schema::domain::{SchemaError, Workflow};
use thiserror::Error;

/// Environment variable holding the display identifier prefix.
pub const TASK_ID_PREFIX_VAR: &str = "TASK_ID_PREFIX";

/// Errors raised while reading configuration values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The configured prefix is not a valid display identifier prefix.
    #[error("invalid value for {key}: {source}")]
    InvalidPrefix {
        /// The configuration key that was read.
        key: &'static str,
        /// The underlying validation failure.
        #[source]
        source: DisplayIdError,
    },
}

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Prefix of every task display identifier.
    pub task_id_prefix: IdPrefix,
    /// Name of the protected fallback team.
    pub unassigned_team_name: String,
    /// Name of the protected task type owned by the fallback team.
    pub default_task_type_name: String,
    /// Workflow given to the protected task type.
    pub default_workflow: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            task_id_prefix: IdPrefix::default(),
            unassigned_team_name: "Unassigned".to_owned(),
            default_task_type_name: "Task".to_owned(),
            default_workflow: vec![
                "Backlog".to_owned(),
                "In Progress".to_owned(),
                "Done".to_owned(),
            ],
        }
    }
}

impl EngineConfig {
    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefix`] when `TASK_ID_PREFIX` is set to
    /// an invalid prefix.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefix`] when the prefix override is
    /// invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(TASK_ID_PREFIX_VAR) {
            config.task_id_prefix =
                IdPrefix::new(raw).map_err(|source| ConfigError::InvalidPrefix {
                    key: TASK_ID_PREFIX_VAR,
                    source,
                })?;
        }
        Ok(config)
    }

    /// Replaces the display identifier prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: IdPrefix) -> Self {
        self.task_id_prefix = prefix;
        self
    }

    /// Replaces the workflow of the protected task type.
    #[must_use]
    pub fn with_default_workflow<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_workflow = statuses.into_iter().map(Into::into).collect();
        self
    }

    /// Builds the workflow of the protected task type.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when the configured labels do not form a
    /// valid workflow.
    pub fn default_workflow(&self) -> Result<Workflow, SchemaError> {
        Workflow::new(self.default_workflow.iter().map(String::as_str))
    }
}
