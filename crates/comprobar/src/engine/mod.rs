//! Automation engine boundary.
//!
//! The harness drives an abstract [`PageEngine`]; everything that knows how
//! to launch a browser, query a DOM, or dispatch input lives behind this
//! trait. Two implementations ship with the crate:
//!
//! - [`mock::MockPage`]: a deterministic scripted page for unit and
//!   integration tests (always compiled).
//! - `cdp::CdpEngine`: real Chromium control over the DevTools protocol,
//!   compiled with the `browser` feature.
//!
//! [`PageEngine::probe`] is deliberately single-shot: it reports what the
//! page looks like *right now* and never waits. All retry/timeout behavior
//! is owned by the harness's own polling loops, which keeps flake tolerance
//! in one auditable place instead of scattered across engine internals.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::result::ComprobarResult;

#[cfg(feature = "browser")]
pub mod cdp;
pub mod mock;

/// Snapshot of one matched element at probe time.
///
/// Valid only for the immediately following decision; the page may change
/// the instant the probe returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    /// Rendered with a nonzero box and not hidden
    pub visible: bool,
    /// Layout has stopped moving (safe to click)
    pub stable: bool,
    /// Another element covers this one's center point
    pub obstructed: bool,
    /// Current text content
    pub text: String,
    /// Current form value (empty for non-form elements)
    pub value: String,
}

/// What happened when a click was dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click reached the element
    Registered,
    /// The element was covered, detached, or otherwise missed the click
    Blocked,
}

/// One browser page, as seen by the harness.
///
/// Implementations must be safe to share behind an [`Arc`]; the harness
/// itself never issues two calls concurrently for one session.
#[async_trait]
pub trait PageEngine: Send + Sync {
    /// Load a URL in this page
    async fn navigate(&self, url: &str) -> ComprobarResult<()>;

    /// Query the first element matching `selector`, without waiting.
    ///
    /// `None` means no element matches right now.
    async fn probe(&self, selector: &str) -> ComprobarResult<Option<ElementState>>;

    /// Dispatch a click at the first element matching `selector`
    async fn click(&self, selector: &str) -> ComprobarResult<ClickOutcome>;

    /// Replace the form value of the first element matching `selector`.
    ///
    /// Clear-then-type semantics: the previous content is discarded, never
    /// appended to.
    async fn fill(&self, selector: &str, text: &str) -> ComprobarResult<()>;

    /// Scroll the first element matching `selector` into the viewport
    async fn scroll_into_view(&self, selector: &str) -> ComprobarResult<()>;

    /// Whether the page currently has no in-flight network activity
    async fn network_idle(&self) -> ComprobarResult<bool>;

    /// Release the page and everything it owns
    async fn close(&self) -> ComprobarResult<()>;
}

/// Produces one fresh, isolated page per scenario.
///
/// Scenario isolation comes from here: every test case gets its own page
/// with no shared mutable state, so no locking is ever needed between
/// concurrently running scenarios.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Open a new page
    async fn page(&self) -> ComprobarResult<Arc<dyn PageEngine>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_state_serializes() {
        let state = ElementState {
            visible: true,
            stable: true,
            obstructed: false,
            text: "SHOPPING CART".to_string(),
            value: String::new(),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("SHOPPING CART"));
        let back: ElementState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_click_outcome_equality() {
        assert_eq!(ClickOutcome::Registered, ClickOutcome::Registered);
        assert_ne!(ClickOutcome::Registered, ClickOutcome::Blocked);
    }
}
