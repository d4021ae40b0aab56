//! Prefix and display identifier value types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors returned while constructing or allocating display identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayIdError {
    /// The prefix is empty or contains characters other than ASCII
    /// alphanumerics and underscores.
    #[error("invalid display id prefix '{0}'")]
    InvalidPrefix(String),

    /// The value does not have the form `PREFIX-N` with a positive `N`.
    #[error("invalid display id '{0}', expected PREFIX-N")]
    Malformed(String),

    /// The prefix has issued its largest representable sequence number.
    #[error("display id sequence for prefix '{0}' is exhausted")]
    SequenceExhausted(String),
}

/// Deployment-wide prefix of task display identifiers, e.g. `CORE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdPrefix(String);

impl IdPrefix {
    const MAX_LENGTH: usize = 20;
    const DEFAULT: &'static str = "CORE";

    /// Creates a validated prefix.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayIdError::InvalidPrefix`] when the trimmed value is
    /// empty, longer than 20 characters, or contains characters other than
    /// ASCII alphanumerics and underscores.
    pub fn new(value: impl Into<String>) -> Result<Self, DisplayIdError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let is_valid = !trimmed.is_empty()
            && trimmed.len() <= Self::MAX_LENGTH
            && trimmed
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if !is_valid {
            return Err(DisplayIdError::InvalidPrefix(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the prefix as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IdPrefix {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl TryFrom<String> for IdPrefix {
    type Error = DisplayIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IdPrefix> for String {
    fn from(prefix: IdPrefix) -> Self {
        prefix.0
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable, globally unique task identifier such as `CORE-42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayId {
    prefix: IdPrefix,
    sequence: u64,
}

impl DisplayId {
    /// Creates a display identifier from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayIdError::Malformed`] when `sequence` is zero.
    pub fn new(prefix: IdPrefix, sequence: u64) -> Result<Self, DisplayIdError> {
        if sequence == 0 {
            return Err(DisplayIdError::Malformed(format!("{prefix}-0")));
        }
        Ok(Self { prefix, sequence })
    }

    /// Returns the prefix.
    #[must_use]
    pub const fn prefix(&self) -> &IdPrefix {
        &self.prefix
    }

    /// Returns the positive sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.sequence)
    }
}

impl FromStr for DisplayId {
    type Err = DisplayIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || DisplayIdError::Malformed(value.to_owned());
        let (prefix, number) = value.trim().rsplit_once('-').ok_or_else(malformed)?;
        let parsed_prefix = IdPrefix::new(prefix).map_err(|_| malformed())?;
        let sequence = number.parse::<u64>().map_err(|_| malformed())?;
        Self::new(parsed_prefix, sequence).map_err(|_| malformed())
    }
}

impl TryFrom<String> for DisplayId {
    type Error = DisplayIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DisplayId> for String {
    fn from(id: DisplayId) -> Self {
        id.to_string()
    }
}

/// Highest sequence number issued per prefix.
///
/// Counters only ever move forward; they are independent of which tasks
/// still exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceCounters {
    last_issued: HashMap<IdPrefix, u64>,
}

impl SequenceCounters {
    /// Creates counters with nothing issued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next identifier for `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayIdError::SequenceExhausted`] when the counter cannot
    /// advance.
    pub fn next(&mut self, prefix: &IdPrefix) -> Result<DisplayId, DisplayIdError> {
        let counter = self.last_issued.entry(prefix.clone()).or_insert(0);
        let sequence = counter
            .checked_add(1)
            .ok_or_else(|| DisplayIdError::SequenceExhausted(prefix.to_string()))?;
        *counter = sequence;
        DisplayId::new(prefix.clone(), sequence)
    }

    /// Returns the highest number issued for `prefix`, or zero.
    #[must_use]
    pub fn last_issued(&self, prefix: &IdPrefix) -> u64 {
        self.last_issued.get(prefix).copied().unwrap_or_default()
    }
}
