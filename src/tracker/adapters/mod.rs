//! Store adapters for the tracker.

pub mod memory;
