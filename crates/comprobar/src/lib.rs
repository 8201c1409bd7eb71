//! Comprobar: functional UI test harness for storefront flows.
//!
//! Comprobar (Spanish: "to verify") drives a web application through a
//! pluggable browser automation engine, exercising authentication and
//! shopping-cart workflows and asserting on the resulting page state.
//! Element lookups tolerate the timing variability of a live browser by
//! polling with bounded budgets; assertions retry to absorb rendering
//! latency; precondition steps are allowed to fail softly so scenarios can
//! probe states reachable without them.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     COMPROBAR Architecture                        │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌──────────┐   ┌─────────────┐  │
//! │  │ Scenario  │──►│ Steps /   │──►│ Session  │──►│ PageEngine  │  │
//! │  │ Catalog   │   │ Checks    │   │ (locate, │   │ (CDP or     │  │
//! │  │ (data)    │   │           │   │  act,    │   │  scripted   │  │
//! │  └───────────┘   └───────────┘   │  assert) │   │  mock)      │  │
//! │        ▲                         └──────────┘   └─────────────┘  │
//! │        │          ┌───────────┐        │                         │
//! │        └──────────│ Runner    │◄───────┘ one fresh session per   │
//! │                   │ + Reports │          scenario, torn down on  │
//! │                   └───────────┘          every exit path         │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use comprobar::{catalog, storefront, HarnessConfig, MockFactory, ScenarioRunner};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = HarnessConfig::default();
//! let factory_config = config.clone();
//! let factory = MockFactory::new(move || storefront(&factory_config));
//! let runner = ScenarioRunner::new(config.clone());
//! let reporter = runner.run_catalog(&factory, &catalog(&config)).await;
//! assert!(reporter.all_passed(), "{}", reporter.summary());
//! # }
//! ```

#![warn(missing_docs)]

mod assertion;
mod catalog;
mod config;
pub mod engine;
mod locator;
mod report;
mod result;
mod runner;
mod scenario;
mod selectors;
mod session;
mod step;
mod wait;

pub use assertion::{expect_text, expect_value, expect_visible, AssertionOutcome, TextMatch};
pub use catalog::catalog;
pub use config::{Credentials, HarnessConfig};
pub use engine::mock::{storefront, ActionRecord, MockElement, MockFactory, MockPage, Reaction};
pub use engine::{ClickOutcome, ElementState, EngineFactory, PageEngine};
pub use locator::{Condition, Locator};
pub use report::{Outcome, RunReporter, ScenarioReport, StepReport};
pub use result::{ComprobarError, ComprobarResult};
pub use runner::ScenarioRunner;
pub use scenario::{Check, Scenario};
pub use selectors::{SelectorCatalog, SelectorName};
pub use session::Session;
pub use step::{Step, StepOutcome, StepState};
pub use wait::{PollPolicy, DEFAULT_IDLE_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};

#[cfg(feature = "browser")]
pub use engine::cdp::{CdpBrowser, CdpEngine, LaunchOptions};
