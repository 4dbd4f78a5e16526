//! Planner error type.
//!
//! Data problems never surface here; they degrade the itinerary instead.
//! Only misconfiguration is reported as an error.

use thiserror::Error;

/// Errors returned by the planning entry points.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlannerError {
    /// A [`SolveOptions`](crate::options::SolveOptions) value is out of range
    /// or inconsistent with another one.
    #[error("invalid option `{field}`: {message}")]
    InvalidOption {
        /// Dotted path of the offending option, e.g. `capacity.per_region`.
        field: &'static str,
        message: String,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// Shorthand for [`PlannerError::InvalidOption`].
    pub fn invalid_option(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            field,
            message: message.into(),
        }
    }
}
