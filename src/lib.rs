//! Corepm: workflow and referential-integrity engine for team-based work
//! tracking.
//!
//! Tasks and projects follow customisable workflows, carry typed custom
//! fields and depend on one another. This crate keeps that configurable data
//! model consistent while it is mutated: statuses stay members of their
//! workflow, custom data satisfies the current field schema, dependency
//! graphs stay acyclic, and removing a status, type, team, theme or project
//! cascades atomically.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: Concrete implementations of ports (in-memory)
//!
//! # Modules
//!
//! - [`schema`]: Workflows, field schemas and validation
//! - [`graph`]: Acyclic dependency graphs
//! - [`display_id`]: `PREFIX-N` identifier allocation
//! - [`tracker`]: Entities, cascades and application services
//! - [`config`]: Engine configuration

pub mod config;
pub mod display_id;
pub mod graph;
pub mod schema;
pub mod tracker;
