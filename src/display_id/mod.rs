//! Display identifier allocation.
//!
//! Every task receives an immutable identifier of the form `PREFIX-N` at
//! creation. `N` is one greater than the highest number ever issued for the
//! prefix, so numbers are never reused after a task is deleted. The context
//! follows the same layout as the rest of the crate:
//!
//! - Value types in [`domain`]
//! - The allocator contract in [`ports`]
//! - The in-memory allocator in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
