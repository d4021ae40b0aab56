//! Domain model for workflows and custom-field schemas.
//!
//! Every type here is a validated value: a [`Workflow`] is never empty and
//! never holds two labels that differ only by case, and a [`FieldSchema`]
//! never holds duplicate keys or option-less select fields.

mod custom_data;
mod error;
mod field;
mod status;
mod type_schema;

pub use custom_data::CustomData;
pub use error::SchemaError;
pub use field::{FieldDefinition, FieldKey, FieldSchema, FieldType};
pub use status::{StatusLabel, Workflow};
pub use type_schema::TypeSchema;
