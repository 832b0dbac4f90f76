//! Planning error type

use thiserror::Error;

/// Errors surfaced to callers of the planner.
///
/// Inside the simulator every transition is total, so these only come from
/// input validation and from collaborators that could not produce a route.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl PlanError {
    pub fn invalid(message: impl Into<String>) -> Self {
        PlanError::InvalidInput(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        PlanError::UpstreamUnavailable(message.into())
    }

    /// Wire code used in `ErrorResponse`
    pub const fn code(&self) -> &'static str {
        match self {
            PlanError::InvalidInput(_) => "INVALID_INPUT",
            PlanError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
        }
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
