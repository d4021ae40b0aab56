//! Custom-field definitions and ordered field schemas.

use super::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Key under which a custom field value is stored in `custom_data`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldKey(String);

impl FieldKey {
    const MAX_LENGTH: usize = 100;

    /// Creates a validated field key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyFieldKey`] when the trimmed key is empty
    /// or [`SchemaError::InvalidFieldKey`] when it contains whitespace or
    /// exceeds 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, SchemaError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SchemaError::EmptyFieldKey);
        }
        if trimmed.chars().any(char::is_whitespace) || trimmed.chars().count() > Self::MAX_LENGTH
        {
            return Err(SchemaError::InvalidFieldKey(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FieldKey {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FieldKey> for String {
    fn from(key: FieldKey) -> Self {
        key.0
    }
}

impl AsRef<str> for FieldKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared type of a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line text.
    Text,
    /// Multi-line text.
    Textarea,
    /// Any JSON number.
    Number,
    /// Boolean flag.
    #[serde(alias = "boolean")]
    Checkbox,
    /// One value out of the field's options.
    Select,
    /// Any subset of the field's options.
    Multiselect,
    /// `http` or `https` URL.
    Url,
    /// ISO calendar date or RFC 3339 timestamp.
    Date,
}

impl FieldType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Url => "url",
            Self::Date => "date",
        }
    }

    /// Returns `true` for field types validated against declared options.
    #[must_use]
    pub const fn uses_options(self) -> bool {
        matches!(self, Self::Select | Self::Multiselect)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definition of one custom field of a task type or project type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    key: FieldKey,
    label: String,
    field_type: FieldType,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    options: Vec<String>,
}

impl FieldDefinition {
    /// Creates an optional field without options.
    ///
    /// # Errors
    ///
    /// Returns a key validation error or [`SchemaError::EmptyFieldLabel`].
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        field_type: FieldType,
    ) -> Result<Self, SchemaError> {
        let field_key = FieldKey::new(key)?;
        let field_label = label.into().trim().to_owned();
        if field_label.is_empty() {
            return Err(SchemaError::EmptyFieldLabel(field_key.0));
        }
        Ok(Self {
            key: field_key,
            label: field_label,
            field_type,
            required: false,
            options: Vec::new(),
        })
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the allowed options of a select or multiselect field.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the field key.
    #[must_use]
    pub const fn key(&self) -> &FieldKey {
        &self.key
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns `true` when a value must be present on every write.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the declared options.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Returns `true` when `value` is one of the declared options.
    #[must_use]
    pub fn allows_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option == value)
    }
}

/// Ordered list of field definitions with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldDefinition>", into = "Vec<FieldDefinition>")]
pub struct FieldSchema {
    fields: Vec<FieldDefinition>,
}

impl FieldSchema {
    /// Creates a schema, preserving field order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateFieldKey`] when two fields share a key
    /// or [`SchemaError::MissingOptions`] for a select field without options.
    pub fn new(fields: Vec<FieldDefinition>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.key.as_str()) {
                return Err(SchemaError::DuplicateFieldKey(field.key.0.clone()));
            }
            if field.field_type.uses_options() && field.options.is_empty() {
                return Err(SchemaError::MissingOptions(field.key.0.clone()));
            }
        }
        Ok(Self { fields })
    }

    /// Creates a schema with no fields.
    #[must_use]
    pub const fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// Iterates the field definitions in order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDefinition> + '_ {
        self.fields.iter()
    }

    /// Returns the field definition for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.key.as_str() == key)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the schema declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<FieldDefinition>> for FieldSchema {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldDefinition>) -> Result<Self, Self::Error> {
        Self::new(fields)
    }
}

impl From<FieldSchema> for Vec<FieldDefinition> {
    fn from(schema: FieldSchema) -> Self {
        schema.fields
    }
}
