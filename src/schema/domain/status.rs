//! Status labels and ordered workflows.

use super::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A workflow status label such as `Backlog` or `In Progress`.
///
/// Labels are trimmed on construction. Membership checks are case-sensitive;
/// uniqueness within a [`Workflow`] is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatusLabel(String);

impl StatusLabel {
    const MAX_LENGTH: usize = 100;

    /// Creates a validated status label.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyStatusLabel`] when the trimmed value is
    /// empty, or [`SchemaError::StatusLabelTooLong`] when it exceeds 100
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, SchemaError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SchemaError::EmptyStatusLabel);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(SchemaError::StatusLabelTooLong(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the label as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when `other` names this label ignoring case.
    #[must_use]
    pub fn matches_ignoring_case(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

impl TryFrom<String> for StatusLabel {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StatusLabel> for String {
    fn from(label: StatusLabel) -> Self {
        label.0
    }
}

impl AsRef<str> for StatusLabel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for StatusLabel {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StatusLabel {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered sequence of distinct status labels.
///
/// The first label is the initial status of new tasks and projects. A
/// workflow is never empty: the initial status is held apart from the
/// remaining labels so it can be returned without a fallible lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StatusLabel>", into = "Vec<StatusLabel>")]
pub struct Workflow {
    initial: StatusLabel,
    rest: Vec<StatusLabel>,
}

impl Workflow {
    /// Creates a workflow from raw labels, in order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyWorkflow`] for an empty sequence,
    /// [`SchemaError::DuplicateStatus`] when two labels differ only by case,
    /// or a label construction error.
    pub fn new<I, S>(statuses: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = statuses
            .into_iter()
            .map(StatusLabel::new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_labels(labels)
    }

    /// Creates a workflow from already validated labels.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyWorkflow`] or
    /// [`SchemaError::DuplicateStatus`].
    pub fn from_labels(labels: Vec<StatusLabel>) -> Result<Self, SchemaError> {
        let mut remaining = labels.into_iter();
        let initial = remaining.next().ok_or(SchemaError::EmptyWorkflow)?;
        let mut workflow = Self {
            initial,
            rest: Vec::new(),
        };
        for label in remaining {
            workflow.insert(label, None)?;
        }
        Ok(workflow)
    }

    /// Returns the initial status assigned to new entities.
    #[must_use]
    pub const fn initial(&self) -> &StatusLabel {
        &self.initial
    }

    /// Iterates the labels in workflow order.
    pub fn iter(&self) -> impl Iterator<Item = &StatusLabel> + '_ {
        std::iter::once(&self.initial).chain(self.rest.iter())
    }

    /// Returns the number of statuses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rest.len() + 1
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` when `status` is a member (case-sensitive).
    #[must_use]
    pub fn contains(&self, status: &str) -> bool {
        self.iter().any(|label| label == status)
    }

    /// Returns the member label equal to `status` (case-sensitive).
    #[must_use]
    pub fn find(&self, status: &str) -> Option<&StatusLabel> {
        self.iter().find(|label| *label == status)
    }

    /// Returns the zero-based position of `status`.
    #[must_use]
    pub fn position(&self, status: &str) -> Option<usize> {
        self.iter().position(|label| label == status)
    }

    /// Returns the labels as string slices.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.iter().map(StatusLabel::as_str).collect()
    }

    /// Inserts a status at `position`, appending when the position is absent
    /// or past the end.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateStatus`] if the label is already
    /// present, ignoring case.
    pub fn insert(
        &mut self,
        label: StatusLabel,
        position: Option<usize>,
    ) -> Result<(), SchemaError> {
        if self
            .iter()
            .any(|existing| existing.matches_ignoring_case(label.as_str()))
        {
            return Err(SchemaError::DuplicateStatus(label.as_str().to_owned()));
        }

        match position {
            Some(0) => {
                let previous = std::mem::replace(&mut self.initial, label);
                self.rest.insert(0, previous);
            }
            Some(index) if index <= self.rest.len() => self.rest.insert(index - 1, label),
            _ => self.rest.push(label),
        }
        Ok(())
    }

    /// Removes `status` from the workflow.
    ///
    /// Removing the initial status promotes the next label.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownStatus`] when the status is not a member
    /// or [`SchemaError::LastStatus`] when it is the only member.
    pub fn remove(&mut self, status: &str) -> Result<StatusLabel, SchemaError> {
        if self.initial == status {
            if self.rest.is_empty() {
                return Err(SchemaError::LastStatus(status.to_owned()));
            }
            let promoted = self.rest.remove(0);
            return Ok(std::mem::replace(&mut self.initial, promoted));
        }

        let index = self
            .rest
            .iter()
            .position(|label| label == status)
            .ok_or_else(|| SchemaError::UnknownStatus(status.to_owned()))?;
        Ok(self.rest.remove(index))
    }
}

impl TryFrom<Vec<StatusLabel>> for Workflow {
    type Error = SchemaError;

    fn try_from(labels: Vec<StatusLabel>) -> Result<Self, Self::Error> {
        Self::from_labels(labels)
    }
}

impl From<Workflow> for Vec<StatusLabel> {
    fn from(workflow: Workflow) -> Self {
        let mut labels = Vec::with_capacity(workflow.rest.len() + 1);
        labels.push(workflow.initial);
        labels.extend(workflow.rest);
        labels
    }
}
