//! Adapter implementations for display identifier allocation.

pub mod memory;
