//! Style injection with tiered cascade ordering.
//!
//! This module provides the core styling primitives:
//!
//! - [`Priority`]: The cascade tier a style unit belongs to
//! - [`StyleRegistry`]: Deduplicating, order-preserving injector
//! - [`ComponentStyle`]: Static per-component style declaration
//! - [`StyleError`]: Errors from injection
//!
//! Higher tiers are placed later in the document, so theme overrides win over
//! component defaults, which win over base resets.

mod error;
mod priority;
mod registry;

pub use error::{ParsePriorityError, StyleError};
pub use priority::Priority;
pub use registry::{ComponentStyle, Injected, StyleOrder, StyleOrderEntry, StyleRegistry};
