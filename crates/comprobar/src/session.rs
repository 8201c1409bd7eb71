//! Per-scenario browser session.
//!
//! A [`Session`] binds one engine page to the configured base URL and owns
//! every lookup and action issued during one test case. Opening a session
//! navigates to the base URL (unreachable base URL is fatal for the whole
//! test case); closing it releases the page. Sessions are never shared
//! between scenarios.

use std::sync::Arc;

use crate::config::HarnessConfig;
use crate::engine::{ClickOutcome, ElementState, PageEngine};
use crate::locator::{Condition, Locator};
use crate::result::{ComprobarError, ComprobarResult};
use crate::selectors::SelectorName;
use crate::wait::{Deadline, PollPolicy};

/// One browser page bound to a base URL for the duration of a test case
pub struct Session {
    engine: Arc<dyn PageEngine>,
    config: HarnessConfig,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session: navigate the fresh page to the configured base URL.
    ///
    /// A navigation failure here aborts the whole test case; nothing can be
    /// salvaged from a page that never loaded.
    pub async fn open(
        engine: Arc<dyn PageEngine>,
        config: HarnessConfig,
    ) -> ComprobarResult<Self> {
        engine.navigate(&config.base_url).await?;
        tracing::debug!(url = %config.base_url, "session opened");
        Ok(Self { engine, config })
    }

    /// The harness configuration this session runs under
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Build a locator for a catalog role
    #[must_use]
    pub fn locator(&self, role: SelectorName) -> Locator {
        Locator::named(role, self.config.selectors.selector(role))
    }

    pub(crate) fn engine(&self) -> &Arc<dyn PageEngine> {
        &self.engine
    }

    pub(crate) fn policy_for(&self, locator: &Locator) -> PollPolicy {
        match locator.timeout_ms() {
            Some(timeout_ms) => PollPolicy {
                timeout_ms,
                ..self.config.poll
            },
            None => self.config.poll,
        }
    }

    /// Resolve a locator against the live page.
    ///
    /// Re-queries the DOM on every poll until the locator's condition holds,
    /// then returns a snapshot valid only for the immediately following
    /// action. Gives up with [`ComprobarError::ElementNotFound`] once the
    /// timeout elapses.
    pub async fn resolve(&self, locator: &Locator) -> ComprobarResult<ElementState> {
        let policy = self.policy_for(locator);
        let deadline = Deadline::start(&policy);
        loop {
            if let Some(state) = self.engine.probe(locator.selector()).await? {
                if locator.condition().satisfied_by(&state) {
                    tracing::debug!(
                        locator = %locator,
                        elapsed_ms = deadline.elapsed_ms(),
                        "locator resolved"
                    );
                    return Ok(state);
                }
            }
            if deadline.expired() {
                return Err(ComprobarError::ElementNotFound {
                    selector: locator.selector().to_string(),
                    condition: locator.condition().as_str().to_string(),
                    waited_ms: deadline.elapsed_ms(),
                });
            }
            deadline.tick().await;
        }
    }

    /// Replace a field's content entirely (clear-then-type, never append)
    pub async fn fill(&self, locator: &Locator, text: &str) -> ComprobarResult<()> {
        self.resolve(locator).await?;
        self.engine.fill(locator.selector(), text).await?;
        tracing::debug!(locator = %locator, text, "filled");
        Ok(())
    }

    /// Click, retrying while the element is covered.
    ///
    /// Requires the element visible first; if the click then never registers
    /// within the timeout the failure is [`ComprobarError::ActionBlocked`],
    /// distinct from the element never appearing at all.
    pub async fn click(&self, locator: &Locator) -> ComprobarResult<()> {
        self.resolve(locator).await?;
        let policy = self.policy_for(locator);
        let deadline = Deadline::start(&policy);
        loop {
            if self.engine.click(locator.selector()).await? == ClickOutcome::Registered {
                tracing::debug!(locator = %locator, "clicked");
                return Ok(());
            }
            if deadline.expired() {
                return Err(ComprobarError::ActionBlocked {
                    action: "click".to_string(),
                    selector: locator.selector().to_string(),
                    waited_ms: deadline.elapsed_ms(),
                });
            }
            deadline.tick().await;
        }
    }

    /// Read the element's current text content
    pub async fn read_text(&self, locator: &Locator) -> ComprobarResult<String> {
        Ok(self.resolve(locator).await?.text)
    }

    /// Read the element's current form value
    pub async fn read_value(&self, locator: &Locator) -> ComprobarResult<String> {
        Ok(self.resolve(locator).await?.value)
    }

    /// Bring an element into the viewport; presence is enough, the element
    /// may still be off-screen or occluded
    pub async fn scroll_into_view(&self, locator: &Locator) -> ComprobarResult<()> {
        let present = locator.clone().with_condition(Condition::Present);
        self.resolve(&present).await?;
        self.engine.scroll_into_view(locator.selector()).await
    }

    /// Wait until the page has no in-flight network activity
    pub async fn wait_for_network_idle(&self) -> ComprobarResult<()> {
        let deadline = Deadline::start_idle(&self.config.poll);
        loop {
            if self.engine.network_idle().await? {
                return Ok(());
            }
            if deadline.expired() {
                return Err(ComprobarError::NetworkBusy {
                    waited_ms: deadline.elapsed_ms(),
                });
            }
            deadline.tick().await;
        }
    }

    /// Release the page. Safe to call on every exit path; the runner calls
    /// it exactly once per scenario.
    pub async fn close(&self) -> ComprobarResult<()> {
        tracing::debug!("session closed");
        self.engine.close().await
    }
}
