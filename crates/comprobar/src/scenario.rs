//! Scenario definitions.
//!
//! A [`Scenario`] is pure data: a name, a description, an ordered step
//! sequence, and an optional final check. Defining one performs no page
//! work; the runner interprets it against a fresh session.

use serde::{Deserialize, Serialize};

use crate::assertion::{self, AssertionOutcome, TextMatch};
use crate::result::ComprobarResult;
use crate::selectors::SelectorName;
use crate::session::Session;
use crate::step::Step;

/// Final check closing out a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Check {
    /// The element must be visible
    Visible {
        /// Element that must be on screen
        target: SelectorName,
    },
    /// The element's text must satisfy `expected` under `mode`
    Text {
        /// Element whose text is compared
        target: SelectorName,
        /// Expected text
        expected: String,
        /// Comparison mode
        mode: TextMatch,
    },
    /// The element's form value must equal `expected` exactly
    Value {
        /// Field whose value is compared
        target: SelectorName,
        /// Expected value
        expected: String,
    },
}

impl Check {
    /// Evaluate the check against the live page
    pub async fn evaluate(&self, session: &Session) -> ComprobarResult<AssertionOutcome> {
        match self {
            Self::Visible { target } => {
                assertion::expect_visible(session, &session.locator(*target)).await
            }
            Self::Text {
                target,
                expected,
                mode,
            } => assertion::expect_text(session, &session.locator(*target), expected, *mode).await,
            Self::Value { target, expected } => {
                assertion::expect_value(session, &session.locator(*target), expected).await
            }
        }
    }

    /// Short description for reports
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Visible { target } => format!("{target} is visible"),
            Self::Text {
                target, expected, ..
            } => format!("{target} shows {expected:?}"),
            Self::Value { target, expected } => format!("{target} holds {expected:?}"),
        }
    }
}

/// A named, immutable test case: ordered steps plus a final check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    name: String,
    description: String,
    steps: Vec<Step>,
    check: Option<Check>,
}

impl Scenario {
    /// Start a scenario definition
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            steps: Vec::new(),
            check: None,
        }
    }

    /// Append a step
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Set the final check
    #[must_use]
    pub fn check(mut self, check: Check) -> Self {
        self.check = Some(check);
        self
    }

    /// Scenario identifier
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable intent
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The ordered step sequence
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The final check, when the scenario declares one
    #[must_use]
    pub const fn final_check(&self) -> Option<&Check> {
        self.check.as_ref()
    }
}
