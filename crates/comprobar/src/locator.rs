//! Locator references.
//!
//! A [`Locator`] is an immutable semantic descriptor: a CSS selector plus
//! the condition an element must satisfy before it is actionable. It is not
//! a live handle; the page is re-queried on every use, so a locator can
//! never go stale across DOM mutations.

use serde::{Deserialize, Serialize};

use crate::engine::ElementState;
use crate::selectors::SelectorName;

/// Condition an element must satisfy before a locator resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Condition {
    /// Element exists in the DOM, visible or not
    Present,
    /// Element exists and is rendered (nonzero box, not hidden)
    #[default]
    Visible,
    /// Element is visible and its layout has stopped moving
    Stable,
}

impl Condition {
    /// Identifier used in timeout diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Visible => "visible",
            Self::Stable => "stable",
        }
    }

    /// Whether a probed element satisfies this condition
    #[must_use]
    pub const fn satisfied_by(&self, state: &ElementState) -> bool {
        match self {
            Self::Present => true,
            Self::Visible => state.visible,
            Self::Stable => state.visible && state.stable,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable element reference: selector expression + required condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    selector: String,
    role: Option<SelectorName>,
    condition: Condition,
    timeout_ms: Option<u64>,
}

impl Locator {
    /// Create a locator for a raw CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            role: None,
            condition: Condition::default(),
            timeout_ms: None,
        }
    }

    /// Create a locator for a catalog role (keeps the role for diagnostics)
    #[must_use]
    pub fn named(role: SelectorName, selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            role: Some(role),
            condition: Condition::default(),
            timeout_ms: None,
        }
    }

    /// Require a different condition
    #[must_use]
    pub const fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Override the resolution timeout for this locator only
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// The CSS selector expression
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The catalog role, when the locator came from the catalog
    #[must_use]
    pub const fn role(&self) -> Option<SelectorName> {
        self.role
    }

    /// The required condition
    #[must_use]
    pub const fn condition(&self) -> Condition {
        self.condition
    }

    /// The per-locator timeout override, if any
    #[must_use]
    pub const fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }

    /// Label used in logs: the role when known, the raw selector otherwise
    #[must_use]
    pub fn label(&self) -> &str {
        match self.role {
            Some(ref role) => role.as_str(),
            None => &self.selector,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' ({})", self.selector, self.condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(visible: bool, stable: bool) -> ElementState {
        ElementState {
            visible,
            stable,
            obstructed: false,
            text: String::new(),
            value: String::new(),
        }
    }

    mod condition_tests {
        use super::*;

        #[test]
        fn test_present_accepts_hidden_elements() {
            assert!(Condition::Present.satisfied_by(&state(false, false)));
        }

        #[test]
        fn test_visible_rejects_hidden_elements() {
            assert!(!Condition::Visible.satisfied_by(&state(false, false)));
            assert!(Condition::Visible.satisfied_by(&state(true, false)));
        }

        #[test]
        fn test_stable_requires_visible_and_settled() {
            assert!(!Condition::Stable.satisfied_by(&state(true, false)));
            assert!(!Condition::Stable.satisfied_by(&state(false, true)));
            assert!(Condition::Stable.satisfied_by(&state(true, true)));
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_css_locator_defaults_to_visible() {
            let locator = Locator::css("button.btn-danger");
            assert_eq!(locator.condition(), Condition::Visible);
            assert_eq!(locator.selector(), "button.btn-danger");
            assert!(locator.timeout_ms().is_none());
        }

        #[test]
        fn test_named_locator_labels_by_role() {
            let locator = Locator::named(SelectorName::CartTotal, "div.cart-total > span");
            assert_eq!(locator.label(), "cart_total");
            assert_eq!(locator.role(), Some(SelectorName::CartTotal));
        }

        #[test]
        fn test_builder_overrides() {
            let locator = Locator::css("input#email")
                .with_condition(Condition::Present)
                .with_timeout_ms(250);
            assert_eq!(locator.condition(), Condition::Present);
            assert_eq!(locator.timeout_ms(), Some(250));
        }

        #[test]
        fn test_display_includes_selector_and_condition() {
            let locator = Locator::css("input#email").with_condition(Condition::Stable);
            assert_eq!(locator.to_string(), "'input#email' (stable)");
        }
    }
}
