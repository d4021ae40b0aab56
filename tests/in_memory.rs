//! In-memory workspace integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `scenario_tests`: End-to-end workflow, schema and dependency scenarios
//! - `cascade_tests`: Team, type and project cascades through the services
//! - `display_id_tests`: Concurrent display identifier allocation

mod in_memory {
    pub mod helpers;

    mod cascade_tests;
    mod display_id_tests;
    mod scenario_tests;
}
