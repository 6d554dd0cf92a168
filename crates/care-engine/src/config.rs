//! Configuration management for the care engine.
//!
//! Loads settings from /etc/care/engine.toml or uses defaults.

use anyhow::Result;
use care_shared::msoc::DEFAULT_MSOC_REASONS;
use care_shared::user::DEFAULT_SUPERVISOR_ROLES;
use care_shared::{MsocReasonCatalog, SectionName, SectionRules, SupervisorRoles};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/care/engine.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/care/engine.toml";

/// Role configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolesConfig {
    /// Membership in any of these grants edit rights regardless of owner
    #[serde(default = "default_supervisor_roles")]
    pub supervisor_roles: Vec<String>,
}

fn default_supervisor_roles() -> Vec<String> {
    DEFAULT_SUPERVISOR_ROLES.iter().map(|r| r.to_string()).collect()
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self { supervisor_roles: default_supervisor_roles() }
    }
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Auto-dismiss window in milliseconds
    #[serde(default = "default_dismiss_after_ms")]
    pub dismiss_after_ms: u64,
}

fn default_dismiss_after_ms() -> u64 {
    3000
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { dismiss_after_ms: default_dismiss_after_ms() }
    }
}

/// MSOC reason catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsocConfig {
    #[serde(default = "default_msoc_reasons")]
    pub reasons: Vec<String>,
}

fn default_msoc_reasons() -> Vec<String> {
    DEFAULT_MSOC_REASONS.iter().map(|r| r.to_string()).collect()
}

impl Default for MsocConfig {
    fn default() -> Self {
        Self { reasons: default_msoc_reasons() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive, used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,

    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_ansi() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter(), ansi: default_ansi() }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub roles: RolesConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub msoc: MsocConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-section required fields, keyed by section name (e.g. "follow_up")
    #[serde(default)]
    pub sections: BTreeMap<String, SectionRules>,
}

impl EngineConfig {
    /// Load config from file, or return defaults
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(DEFAULT_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                EngineConfig::default()
            })
    }

    /// Load config from specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn supervisor_roles(&self) -> SupervisorRoles {
        SupervisorRoles::new(&self.roles.supervisor_roles)
    }

    /// Falls back to the default catalog if the configured list is empty.
    pub fn msoc_catalog(&self) -> MsocReasonCatalog {
        let catalog = MsocReasonCatalog::new(self.msoc.reasons.iter().cloned());
        if catalog.reasons().is_empty() {
            warn!("Empty MSOC reason list configured, using defaults");
            return MsocReasonCatalog::default();
        }
        catalog
    }

    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.notifications.dismiss_after_ms)
    }

    pub fn section_rules(&self, name: SectionName) -> SectionRules {
        self.sections.get(&name.to_string()).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.dismiss_after(), Duration::from_millis(3000));
        assert_eq!(config.supervisor_roles().len(), 3);
        assert!(config.msoc_catalog().contains("Other"));
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[roles]
supervisor_roles = ["CC_Supervisor", "cc_manager"]

[notifications]
dismiss_after_ms = 1500

[sections.follow_up]
required = ["dueDate", "method"]
"#;
        let config = EngineConfig::from_toml_str(toml_str).unwrap();
        assert!(config.supervisor_roles().any_of(&["cc_supervisor"]));
        assert!(!config.supervisor_roles().any_of(&["supervisor"]));
        assert_eq!(config.dismiss_after(), Duration::from_millis(1500));
        assert_eq!(
            config.section_rules(SectionName::FollowUp).required,
            vec!["dueDate".to_string(), "method".to_string()]
        );
        assert!(config.section_rules(SectionName::Notes).required.is_empty());
        // Defaults for missing sections
        assert!(config.logging.ansi);
        assert!(config.msoc_catalog().contains("Patient unreachable"));
    }

    #[test]
    fn test_empty_msoc_list_falls_back() {
        let config = EngineConfig::from_toml_str("[msoc]\nreasons = []\n").unwrap();
        assert_eq!(config.msoc_catalog(), MsocReasonCatalog::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(EngineConfig::from_toml_str("[notifications]\ndismiss_after_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "[logging]\nfilter = \"care_engine=debug\"\n").unwrap();
        let config = EngineConfig::load_from_path(&path).unwrap();
        assert_eq!(config.logging.filter, "care_engine=debug");
        assert!(EngineConfig::load_from_path(dir.path().join("missing.toml")).is_err());
    }
}
