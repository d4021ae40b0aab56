//! Error types for schema construction.

use thiserror::Error;

/// Errors returned while constructing workflow and field-schema values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A status label is empty after trimming.
    #[error("status label must not be empty")]
    EmptyStatusLabel,

    /// A status label exceeds the storage limit.
    #[error("status label exceeds 100 character limit: {0}")]
    StatusLabelTooLong(String),

    /// A workflow must contain at least one status.
    #[error("workflow must contain at least one status")]
    EmptyWorkflow,

    /// The status label is already part of the workflow (case-insensitive).
    #[error("status '{0}' already exists in the workflow")]
    DuplicateStatus(String),

    /// The status label is not part of the workflow.
    #[error("status '{0}' is not part of the workflow")]
    UnknownStatus(String),

    /// Removing the status would leave the workflow empty.
    #[error("status '{0}' is the only status of the workflow")]
    LastStatus(String),

    /// A field key is empty after trimming.
    #[error("field key must not be empty")]
    EmptyFieldKey,

    /// A field key contains whitespace or exceeds the storage limit.
    #[error("invalid field key '{0}'")]
    InvalidFieldKey(String),

    /// A field label is empty after trimming.
    #[error("field '{0}' must have a label")]
    EmptyFieldLabel(String),

    /// Two fields of one schema share a key.
    #[error("duplicate field key '{0}'")]
    DuplicateFieldKey(String),

    /// A select or multiselect field declares no options.
    #[error("field '{0}' must declare at least one option")]
    MissingOptions(String),

    /// Custom data must be a JSON object.
    #[error("custom data must be a JSON object")]
    CustomDataNotObject,
}
