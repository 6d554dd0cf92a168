//! Ephemeral notification values derived from action outcomes.

use crate::action::ActionOutcome;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { severity: Severity::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }

    /// Successes and remote failures are notified. Local rejections are
    /// not: they surface as disabled controls or inline field errors.
    pub fn from_outcome(outcome: &ActionOutcome) -> Option<Self> {
        match outcome {
            ActionOutcome::Success { message, .. } => Some(Self::success(message.clone())),
            ActionOutcome::Failed { message } => Some(Self::error(message.clone())),
            ActionOutcome::Rejected { .. } => None,
        }
    }
}
