//! Scenario reporting.
//!
//! The boundary to whatever consumes test results: each scenario yields
//! exactly one [`ScenarioReport`], and a [`RunReporter`] collects them into
//! a summary renderable as text or JSON.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::scenario::Scenario;
use crate::step::StepState;

/// Pass/fail verdict for one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The scenario completed and its final check held
    Passed,
    /// A hard failure or a failed final check
    Failed,
}

impl Outcome {
    /// Whether this is a pass
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Terminal state of one step within a scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Step name
    pub name: String,
    /// Where the step ended up
    pub state: StepState,
}

/// The single per-scenario result emitted to the outside
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario identifier
    pub name: String,
    /// Human-readable intent
    pub description: String,
    /// Verdict
    pub outcome: Outcome,
    /// Failure detail: the failing selector and the wait budget spent, or
    /// the soft-failure trail on a pass
    pub diagnostic: Option<String>,
    /// Wall-clock duration of the whole scenario
    pub duration: Duration,
    /// Per-step terminal states, in execution order
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    /// A passing report
    #[must_use]
    pub fn passed(scenario: &Scenario, duration: Duration, steps: Vec<StepReport>) -> Self {
        Self {
            name: scenario.name().to_string(),
            description: scenario.description().to_string(),
            outcome: Outcome::Passed,
            diagnostic: None,
            duration,
            steps,
        }
    }

    /// A failing report with its diagnostic
    #[must_use]
    pub fn failed(
        scenario: &Scenario,
        diagnostic: impl Into<String>,
        duration: Duration,
        steps: Vec<StepReport>,
    ) -> Self {
        Self {
            name: scenario.name().to_string(),
            description: scenario.description().to_string(),
            outcome: Outcome::Failed,
            diagnostic: Some(diagnostic.into()),
            duration,
            steps,
        }
    }

    /// Attach a diagnostic without changing the verdict (soft-failure trail)
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }
}

/// Collects one report per scenario and summarizes the run
#[derive(Debug, Default, Serialize)]
pub struct RunReporter {
    reports: Vec<ScenarioReport>,
}

impl RunReporter {
    /// An empty reporter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one scenario's report
    pub fn record(&mut self, report: ScenarioReport) {
        tracing::info!(
            scenario = %report.name,
            outcome = ?report.outcome,
            duration_ms = report.duration.as_millis() as u64,
            "scenario finished"
        );
        self.reports.push(report);
    }

    /// All reports, in recording order
    #[must_use]
    pub fn reports(&self) -> &[ScenarioReport] {
        &self.reports
    }

    /// Whether every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(|r| r.outcome.is_passed())
    }

    /// Number of passing scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.is_passed())
            .count()
    }

    /// Number of failing scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.reports.len() - self.passed_count()
    }

    /// One-line run summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} total",
            self.passed_count(),
            self.failed_count(),
            self.reports.len()
        )
    }

    /// Full run as pretty JSON
    pub fn to_json(&self) -> crate::result::ComprobarResult<String> {
        Ok(serde_json::to_string_pretty(&self.reports)?)
    }
}
