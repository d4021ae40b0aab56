//! Status and custom-data validation.
//!
//! Both functions are pure: they never mutate their inputs and report the
//! first failure they encounter. They run on every create and every update of
//! a status or custom data, never only at creation.

use super::domain::{CustomData, FieldDefinition, FieldSchema, FieldType, StatusLabel, Workflow};
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use thiserror::Error;

/// Result type for validation functions.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors raised when a status or custom data does not satisfy a schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The status is not a member of the current workflow.
    #[error("status '{status}' is not part of the workflow")]
    InvalidStatus {
        /// The rejected status.
        status: String,
    },

    /// A required field is absent or null.
    #[error("required field '{0}' is missing")]
    MissingRequiredField(String),

    /// The value's runtime type does not match the declared field type.
    #[error("field '{key}' expects a {expected} value")]
    TypeMismatch {
        /// The offending field key.
        key: String,
        /// The declared field type.
        expected: FieldType,
    },

    /// A select value is not one of the declared options.
    #[error("'{value}' is not an option of field '{key}'")]
    InvalidOption {
        /// The offending field key.
        key: String,
        /// The rejected value.
        value: String,
    },
}

impl ValidationError {
    /// Returns the offending field key for custom-data failures.
    #[must_use]
    pub fn field_key(&self) -> Option<&str> {
        match self {
            Self::InvalidStatus { .. } => None,
            Self::MissingRequiredField(key)
            | Self::TypeMismatch { key, .. }
            | Self::InvalidOption { key, .. } => Some(key.as_str()),
        }
    }
}

/// Checks that `candidate` is a case-sensitive member of `workflow`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidStatus`] otherwise.
pub fn validate_status(workflow: &Workflow, candidate: &str) -> ValidationResult<StatusLabel> {
    workflow
        .find(candidate)
        .cloned()
        .ok_or_else(|| ValidationError::InvalidStatus {
            status: candidate.to_owned(),
        })
}

/// Checks `candidate` against every field of `schema`, in order.
///
/// The returned map holds only keys declared by the schema; unknown keys are
/// dropped silently and `null` values count as absent.
///
/// # Errors
///
/// Returns [`ValidationError::MissingRequiredField`],
/// [`ValidationError::TypeMismatch`] or [`ValidationError::InvalidOption`]
/// for the first field that fails.
pub fn validate_custom_data(
    schema: &FieldSchema,
    candidate: &CustomData,
) -> ValidationResult<CustomData> {
    let mut validated = CustomData::new();
    for field in schema.iter() {
        let key = field.key().as_str();
        let Some(value) = candidate.get(key).filter(|value| !value.is_null()) else {
            if field.is_required() {
                return Err(ValidationError::MissingRequiredField(key.to_owned()));
            }
            continue;
        };
        check_value(field, value)?;
        validated.insert(key, value.clone());
    }
    Ok(validated)
}

fn check_value(field: &FieldDefinition, value: &Value) -> ValidationResult<()> {
    let matches_type = match field.field_type() {
        FieldType::Text | FieldType::Textarea => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Checkbox => value.is_boolean(),
        FieldType::Url => value.as_str().is_some_and(is_web_url),
        FieldType::Date => value.as_str().is_some_and(is_iso_date),
        FieldType::Select => return check_option(field, value),
        FieldType::Multiselect => return check_options(field, value),
    };
    if matches_type {
        Ok(())
    } else {
        Err(type_mismatch(field))
    }
}

fn check_option(field: &FieldDefinition, value: &Value) -> ValidationResult<()> {
    let choice = value.as_str().ok_or_else(|| type_mismatch(field))?;
    if field.allows_option(choice) {
        Ok(())
    } else {
        Err(ValidationError::InvalidOption {
            key: field.key().as_str().to_owned(),
            value: choice.to_owned(),
        })
    }
}

fn check_options(field: &FieldDefinition, value: &Value) -> ValidationResult<()> {
    let choices = value.as_array().ok_or_else(|| type_mismatch(field))?;
    choices
        .iter()
        .try_for_each(|choice| check_option(field, choice))
}

fn type_mismatch(field: &FieldDefinition) -> ValidationError {
    ValidationError::TypeMismatch {
        key: field.key().as_str().to_owned(),
        expected: field.field_type(),
    }
}

fn is_web_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    rest.is_some_and(|host| !host.is_empty() && !host.chars().any(char::is_whitespace))
}

fn is_iso_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
}
