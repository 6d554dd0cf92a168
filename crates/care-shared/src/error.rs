//! Error types for the care coordination engine.

use thiserror::Error;

/// Why a free-text or enumerated reason was refused.
///
/// The `Display` strings are shown inline next to the reason field, so
/// they are part of the user-facing contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReasonError {
    #[error("Reason cannot consist of only spaces.")]
    Blank,

    #[error("Reason must be at least {min} characters long.")]
    TooShort { min: usize },

    #[error("Reason cannot exceed {max} characters.")]
    TooLong { max: usize },

    #[error("Reason cannot be numeric-only.")]
    NumericOnly,

    #[error("Please select a valid MSOC reason.")]
    UnknownMsocReason,
}

/// Local input problems caught before any remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    Reason(#[from] ReasonError),

    #[error("Assignee cannot be empty.")]
    BlankAssignee,

    #[error("{field} is required.")]
    MissingField { field: String },
}

impl ValidationError {
    /// Name of the offending input, for inline placement.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Reason(_) => "reason",
            ValidationError::BlankAssignee => "assignee",
            ValidationError::MissingField { field } => field,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CareError {
    #[error("Action not permitted for this case.")]
    NotPermitted,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Request targets case {requested} but case {loaded} is loaded.")]
    CaseMismatch { requested: String, loaded: String },

    #[error("Action already in progress: {0}")]
    InFlight(String),

    #[error("No case loaded.")]
    NotLoaded,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl CareError {
    pub fn code(&self) -> i32 {
        match self {
            CareError::NotPermitted => -32010,
            CareError::Validation(_) => -32011,
            CareError::CaseMismatch { .. } => -32012,
            CareError::InFlight(_) => -32013,
            CareError::NotLoaded => -32014,
            CareError::Transport(_) => -32001,
            CareError::Config(_) => -32603,
        }
    }

    /// Authorization and validation problems are recovered locally and
    /// never reach the notification channel.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            CareError::NotPermitted
                | CareError::Validation(_)
                | CareError::CaseMismatch { .. }
                | CareError::InFlight(_)
        )
    }
}
