//! Workflow and custom-field schemas.
//!
//! A task type or project type owns a [`domain::TypeSchema`]: an ordered
//! [`domain::Workflow`] of status labels and an ordered
//! [`domain::FieldSchema`] of typed custom-field definitions. The
//! [`validation`] module checks candidate statuses and custom data against the
//! schema that is current at the time of the write.
//!
//! - Domain types in [`domain`]
//! - Pure validation functions in [`validation`]

pub mod domain;
pub mod validation;

#[cfg(test)]
mod tests;
