//! Unit tests for the tracker catalog, cascades and services.

mod cascade_tests;
mod service_tests;
