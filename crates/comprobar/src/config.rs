//! Harness configuration: fixture inputs supplied from outside the core.
//!
//! Base URL, the two canonical credential pairs, the selector catalog, and
//! polling budgets all arrive here, so nothing about the target deployment
//! is hard-coded in scenario logic.

use serde::{Deserialize, Serialize};

use crate::result::{ComprobarError, ComprobarResult};
use crate::selectors::SelectorCatalog;
use crate::wait::PollPolicy;

/// A username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name (the demo shop uses an email address)
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create a credentials pair
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Full harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Navigation target every session starts from
    pub base_url: String,
    /// Credentials accepted by the application
    pub valid: Credentials,
    /// Credentials the application rejects
    pub invalid: Credentials,
    /// Role-to-selector mapping
    pub selectors: SelectorCatalog,
    /// Polling budgets for resolution, assertions, and network idle
    pub poll: PollPolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://qa-practice.netlify.app/auth_ecommerce".to_string(),
            valid: Credentials::new("admin@admin.com", "admin123"),
            invalid: Credentials::new("invalid@example.com", "wrongpassword"),
            selectors: SelectorCatalog::default(),
            poll: PollPolicy::default(),
        }
    }
}

impl HarnessConfig {
    /// Parse a config from YAML; unspecified fields keep their defaults
    pub fn from_yaml(text: &str) -> ComprobarResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn from_file(path: &std::path::Path) -> ComprobarResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Reject configs that cannot possibly drive a session
    pub fn validate(&self) -> ComprobarResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ComprobarError::Config {
                message: "base_url must not be empty".to_string(),
            });
        }
        if self.poll.interval_ms == 0 {
            return Err(ComprobarError::Config {
                message: "poll.interval_ms must be greater than zero".to_string(),
            });
        }
        if self.poll.timeout_ms < self.poll.interval_ms {
            return Err(ComprobarError::Config {
                message: "poll.timeout_ms must be at least one interval".to_string(),
            });
        }
        Ok(())
    }
}
