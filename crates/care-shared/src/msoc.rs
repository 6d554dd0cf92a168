//! Enumerated reasons for the missed-start-of-care tag.

use crate::error::ReasonError;
use serde::{Deserialize, Serialize};

/// Reasons offered when no catalog is configured. Order is display order.
pub const DEFAULT_MSOC_REASONS: &[&str] = &[
    "Patient unreachable",
    "Patient declined services",
    "Patient hospitalized",
    "Provider unavailable",
    "Authorization pending",
    "Referral incomplete",
    "Other",
];

/// The closed list an MSOC reason must be chosen from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MsocReasonCatalog {
    reasons: Vec<String>,
}

impl MsocReasonCatalog {
    /// Blank entries and duplicates are dropped; first occurrence wins.
    pub fn new<I, S>(reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for reason in reasons {
            let reason = reason.into().trim().to_string();
            if !reason.is_empty() && !out.contains(&reason) {
                out.push(reason);
            }
        }
        Self { reasons: out }
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn contains(&self, reason: &str) -> bool {
        self.reasons.iter().any(|r| r == reason.trim())
    }

    /// Resolve a selection to its canonical catalog entry.
    pub fn validate(&self, reason: &str) -> Result<String, ReasonError> {
        let trimmed = reason.trim();
        self.reasons
            .iter()
            .find(|r| r.as_str() == trimmed)
            .cloned()
            .ok_or(ReasonError::UnknownMsocReason)
    }
}

impl Default for MsocReasonCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_MSOC_REASONS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = MsocReasonCatalog::default();
        assert_eq!(catalog.reasons().len(), DEFAULT_MSOC_REASONS.len());
        assert!(catalog.contains("Other"));
    }

    #[test]
    fn test_validate_known_reason() {
        let catalog = MsocReasonCatalog::default();
        assert_eq!(
            catalog.validate("  Patient unreachable ").unwrap(),
            "Patient unreachable"
        );
    }

    #[test]
    fn test_validate_rejects_unknown_and_empty() {
        let catalog = MsocReasonCatalog::default();
        assert_eq!(catalog.validate("because"), Err(ReasonError::UnknownMsocReason));
        assert_eq!(catalog.validate(""), Err(ReasonError::UnknownMsocReason));
    }

    #[test]
    fn test_catalog_dedup() {
        let catalog = MsocReasonCatalog::new(["A", "A ", "", "B"]);
        assert_eq!(catalog.reasons(), &["A".to_string(), "B".to_string()]);
    }
}
