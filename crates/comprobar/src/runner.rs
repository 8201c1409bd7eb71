//! Scenario execution.
//!
//! One test case = one fresh [`Session`]: navigate to the base URL (fatal
//! on failure), run the step sequence in order, evaluate the final check,
//! and dispose the page on every exit path. Scenarios never share state;
//! running them in parallel needs no locks, only a factory that hands out
//! isolated pages.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::engine::{EngineFactory, PageEngine};
use crate::report::{RunReporter, ScenarioReport, StepReport};
use crate::result::ComprobarError;
use crate::scenario::Scenario;
use crate::session::Session;
use crate::step::{StepOutcome, StepState};
use crate::config::HarnessConfig;

/// What driving the steps and the final check produced, before teardown
struct DriveResult {
    verdict: Result<(), String>,
    steps: Vec<StepReport>,
    soft: Vec<String>,
}

/// Runs scenarios against engine pages
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: HarnessConfig,
}

impl ScenarioRunner {
    /// Create a runner over a configuration
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// The configuration scenarios run under
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run one scenario on a fresh page.
    ///
    /// The page is released exactly once, on every exit path, including a
    /// failed base-URL navigation.
    pub async fn run(&self, engine: Arc<dyn PageEngine>, scenario: &Scenario) -> ScenarioReport {
        let started = Instant::now();
        tracing::info!(scenario = scenario.name(), "scenario started");

        let session = match Session::open(engine.clone(), self.config.clone()).await {
            Ok(session) => session,
            Err(error) => {
                // The page never became a session; release it directly
                if let Err(close_error) = engine.close().await {
                    tracing::warn!(%close_error, "page release failed after aborted open");
                }
                return ScenarioReport::failed(
                    scenario,
                    format!("session open: {error}"),
                    started.elapsed(),
                    pending_steps(scenario),
                );
            }
        };

        let result = drive(&session, scenario).await;

        if let Err(error) = session.close().await {
            tracing::warn!(%error, "session teardown failed");
        }

        let duration = started.elapsed();
        match result.verdict {
            Ok(()) => {
                let report = ScenarioReport::passed(scenario, duration, result.steps);
                if result.soft.is_empty() {
                    report
                } else {
                    report.with_diagnostic(result.soft.join("; "))
                }
            }
            Err(diagnostic) => {
                ScenarioReport::failed(scenario, diagnostic, duration, result.steps)
            }
        }
    }

    /// Run scenarios one after another, each on its own page
    pub async fn run_catalog(
        &self,
        factory: &dyn EngineFactory,
        scenarios: &[Scenario],
    ) -> RunReporter {
        let mut reporter = RunReporter::new();
        for scenario in scenarios {
            reporter.record(self.run_on_fresh_page(factory, scenario).await);
        }
        reporter
    }

    /// Run all scenarios concurrently, each in a fully isolated session.
    ///
    /// Isolation comes from the factory: every scenario gets its own page
    /// and no state is shared, so nothing here synchronizes anything.
    pub async fn run_catalog_parallel(
        &self,
        factory: &dyn EngineFactory,
        scenarios: &[Scenario],
    ) -> RunReporter {
        let runs = scenarios
            .iter()
            .map(|scenario| self.run_on_fresh_page(factory, scenario));
        let reports = futures::future::join_all(runs).await;
        let mut reporter = RunReporter::new();
        for report in reports {
            reporter.record(report);
        }
        reporter
    }

    async fn run_on_fresh_page(
        &self,
        factory: &dyn EngineFactory,
        scenario: &Scenario,
    ) -> ScenarioReport {
        match factory.page().await {
            Ok(engine) => self.run(engine, scenario).await,
            Err(error) => ScenarioReport::failed(
                scenario,
                format!("page open: {error}"),
                Duration::ZERO,
                pending_steps(scenario),
            ),
        }
    }
}

fn pending_steps(scenario: &Scenario) -> Vec<StepReport> {
    scenario
        .steps()
        .iter()
        .map(|step| StepReport {
            name: step.name(),
            state: StepState::Pending,
        })
        .collect()
}

/// Run the step sequence and the final check. Teardown is the caller's
/// business; nothing in here touches the session lifecycle.
async fn drive(session: &Session, scenario: &Scenario) -> DriveResult {
    let mut steps = Vec::with_capacity(scenario.steps().len());
    let mut soft = Vec::new();

    for (index, step) in scenario.steps().iter().enumerate() {
        tracing::debug!(step = %step, "step running");
        let outcome = step.run(session).await;
        steps.push(StepReport {
            name: step.name(),
            state: outcome.state(),
        });
        match outcome {
            StepOutcome::Succeeded => {}
            StepOutcome::SoftFailed { diagnostic } => soft.push(diagnostic),
            StepOutcome::HardFailed { error } => {
                // Unreached steps stay pending in the report
                for rest in &scenario.steps()[index + 1..] {
                    steps.push(StepReport {
                        name: rest.name(),
                        state: StepState::Pending,
                    });
                }
                return DriveResult {
                    verdict: Err(format!("step '{}' failed: {error}", step.name())),
                    steps,
                    soft,
                };
            }
        }
    }

    let verdict = match scenario.final_check() {
        None => Ok(()),
        Some(check) => match check.evaluate(session).await {
            Ok(outcome) if outcome.passed => Ok(()),
            Ok(outcome) => Err(outcome.diagnostic()),
            Err(error) => Err(check_error_diagnostic(&error)),
        },
    };

    DriveResult {
        verdict,
        steps,
        soft,
    }
}

fn check_error_diagnostic(error: &ComprobarError) -> String {
    format!("final check failed: {error}")
}
