//! Unit tests for workflow and field-schema values and validation.
