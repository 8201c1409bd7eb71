//! Polled assertions over page state.
//!
//! Assertions absorb rendering latency the same way locator resolution
//! does: probe, compare, sleep, repeat. The difference is the outcome.
//! A mismatch at the deadline finalizes as a failed [`AssertionOutcome`]
//! with the expected/actual pair, not a thrown lookup error. Engine
//! transport failures still propagate as errors.

use serde::{Deserialize, Serialize};

use crate::locator::Locator;
use crate::result::{ComprobarError, ComprobarResult};
use crate::session::Session;
use crate::wait::Deadline;

/// How expected and observed text are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextMatch {
    /// Exact string equality, no normalization. The default; money amounts
    /// like the cart total must match to the character.
    #[default]
    Exact,
    /// Equality after trimming surrounding whitespace
    Trimmed,
    /// Substring containment
    Contains,
}

impl TextMatch {
    /// Whether `actual` satisfies `expected` under this mode
    #[must_use]
    pub fn matches(&self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Exact => actual == expected,
            Self::Trimmed => actual.trim() == expected.trim(),
            Self::Contains => actual.contains(expected),
        }
    }

    fn describe(&self, expected: &str) -> String {
        match self {
            Self::Exact => format!("text {expected:?}"),
            Self::Trimmed => format!("trimmed text {expected:?}"),
            Self::Contains => format!("text containing {expected:?}"),
        }
    }
}

/// Result of one polled assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionOutcome {
    /// Whether the condition was eventually satisfied
    pub passed: bool,
    /// Selector that was asserted on
    pub selector: String,
    /// What the assertion required
    pub expected: String,
    /// What the page last showed
    pub actual: String,
    /// Total wait spent polling
    pub waited_ms: u64,
}

impl AssertionOutcome {
    fn pass(locator: &Locator, expected: String, waited_ms: u64) -> Self {
        Self {
            passed: true,
            selector: locator.selector().to_string(),
            actual: expected.clone(),
            expected,
            waited_ms,
        }
    }

    fn fail(locator: &Locator, expected: String, actual: String, waited_ms: u64) -> Self {
        Self {
            passed: false,
            selector: locator.selector().to_string(),
            expected,
            actual,
            waited_ms,
        }
    }

    /// Human-readable summary, suitable for a test report
    #[must_use]
    pub fn diagnostic(&self) -> String {
        if self.passed {
            format!(
                "'{}' satisfied {} after {}ms",
                self.selector, self.expected, self.waited_ms
            )
        } else {
            format!(
                "'{}' expected {}, got {} after {}ms",
                self.selector, self.expected, self.actual, self.waited_ms
            )
        }
    }

    /// Convert a failed outcome into the matching typed error
    pub fn into_result(self) -> ComprobarResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(ComprobarError::AssertionFailed {
                selector: self.selector,
                expected: self.expected,
                actual: self.actual,
                waited_ms: self.waited_ms,
            })
        }
    }
}

/// Assert that the element becomes visible within the timeout
pub async fn expect_visible(
    session: &Session,
    locator: &Locator,
) -> ComprobarResult<AssertionOutcome> {
    let policy = session.policy_for(locator);
    let deadline = Deadline::start(&policy);
    let mut last = "absent".to_string();
    loop {
        match session.engine().probe(locator.selector()).await? {
            Some(state) if state.visible => {
                return Ok(AssertionOutcome::pass(
                    locator,
                    "visible".to_string(),
                    deadline.elapsed_ms(),
                ));
            }
            Some(_) => last = "hidden".to_string(),
            None => last = "absent".to_string(),
        }
        if deadline.expired() {
            return Ok(AssertionOutcome::fail(
                locator,
                "visible".to_string(),
                last,
                deadline.elapsed_ms(),
            ));
        }
        deadline.tick().await;
    }
}

/// Assert that the element's text satisfies `expected` under `mode`
pub async fn expect_text(
    session: &Session,
    locator: &Locator,
    expected: &str,
    mode: TextMatch,
) -> ComprobarResult<AssertionOutcome> {
    let policy = session.policy_for(locator);
    let deadline = Deadline::start(&policy);
    let mut last = "absent".to_string();
    loop {
        match session.engine().probe(locator.selector()).await? {
            Some(state) if state.visible && mode.matches(&state.text, expected) => {
                return Ok(AssertionOutcome::pass(
                    locator,
                    mode.describe(expected),
                    deadline.elapsed_ms(),
                ));
            }
            Some(state) if state.visible => last = format!("text {:?}", state.text),
            Some(_) => last = "hidden".to_string(),
            None => last = "absent".to_string(),
        }
        if deadline.expired() {
            return Ok(AssertionOutcome::fail(
                locator,
                mode.describe(expected),
                last,
                deadline.elapsed_ms(),
            ));
        }
        deadline.tick().await;
    }
}

/// Assert that the element's form value equals `expected` exactly.
///
/// Presence is enough; a field does not need to be on screen for its value
/// to be checked.
pub async fn expect_value(
    session: &Session,
    locator: &Locator,
    expected: &str,
) -> ComprobarResult<AssertionOutcome> {
    let policy = session.policy_for(locator);
    let deadline = Deadline::start(&policy);
    let mut last = "absent".to_string();
    loop {
        match session.engine().probe(locator.selector()).await? {
            Some(state) if state.value == expected => {
                return Ok(AssertionOutcome::pass(
                    locator,
                    format!("value {expected:?}"),
                    deadline.elapsed_ms(),
                ));
            }
            Some(state) => last = format!("value {:?}", state.value),
            None => last = "absent".to_string(),
        }
        if deadline.expired() {
            return Ok(AssertionOutcome::fail(
                locator,
                format!("value {expected:?}"),
                last,
                deadline.elapsed_ms(),
            ));
        }
        deadline.tick().await;
    }
}
