//! Style injection errors.

use thiserror::Error;

/// Error returned when a style unit cannot be injected.
///
/// Only caller mistakes are reported here. A missing document is not an
/// error; injection silently does nothing in that case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// The style identifier was empty.
    #[error("style identifier must not be empty")]
    EmptyId,
}

/// Error returned when a priority name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown style priority '{value}' (expected base, normal, high or override)")]
pub struct ParsePriorityError {
    pub value: String,
}
