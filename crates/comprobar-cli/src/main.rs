//! Comprobador: command-line runner for the Comprobar scenario catalog.
//!
//! ## Usage
//!
//! ```bash
//! comprobador list                      # Show the catalog
//! comprobador run                       # Run against the built-in simulation
//! comprobador run --parallel --json     # Concurrent run, JSON report
//! comprobador run --live                # Drive a real chromium (requires --features browser)
//! ```

use clap::{Args, Parser, Subcommand};
use comprobar::{
    catalog, storefront, ComprobarError, ComprobarResult, HarnessConfig, MockFactory, RunReporter,
    Scenario, ScenarioRunner,
};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "comprobador", version, about = "Functional UI checks for the demo storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the scenarios in the catalog
    List(ListArgs),
    /// Run scenarios and report one outcome per scenario
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Harness config file (YAML); defaults target the public demo shop
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Harness config file (YAML); defaults target the public demo shop
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only run scenarios whose name contains this substring
    #[arg(short, long)]
    filter: Option<String>,

    /// Run scenarios concurrently, one isolated session each
    #[arg(short, long)]
    parallel: bool,

    /// Emit the run as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Drive a real browser instead of the built-in storefront simulation
    #[arg(long)]
    live: bool,

    /// Show the browser window (implies --live)
    #[arg(long)]
    headful: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli.command) {
        Ok(all_passed) => {
            if all_passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn dispatch(command: Commands) -> ComprobarResult<bool> {
    match command {
        Commands::List(args) => {
            let config = load_config(args.config.as_deref())?;
            list_scenarios(&catalog(&config));
            Ok(true)
        }
        Commands::Run(args) => run_scenarios(&args),
    }
}

fn load_config(path: Option<&std::path::Path>) -> ComprobarResult<HarnessConfig> {
    match path {
        Some(path) => HarnessConfig::from_file(path),
        None => Ok(HarnessConfig::default()),
    }
}

fn list_scenarios(scenarios: &[Scenario]) {
    for scenario in scenarios {
        println!(
            "{:<18} {} ({} steps)",
            style(scenario.name()).cyan(),
            scenario.description(),
            scenario.steps().len()
        );
    }
}

fn filter_scenarios(scenarios: Vec<Scenario>, filter: Option<&str>) -> Vec<Scenario> {
    match filter {
        Some(needle) => scenarios
            .into_iter()
            .filter(|s| s.name().contains(needle))
            .collect(),
        None => scenarios,
    }
}

fn run_scenarios(args: &RunArgs) -> ComprobarResult<bool> {
    let config = load_config(args.config.as_deref())?;
    let scenarios = filter_scenarios(catalog(&config), args.filter.as_deref());
    if scenarios.is_empty() {
        return Err(ComprobarError::Config {
            message: "no scenario matches the filter".to_string(),
        });
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let reporter = runtime.block_on(execute(&config, &scenarios, args))?;

    if args.json {
        println!("{}", reporter.to_json()?);
    } else {
        render(&reporter);
    }
    Ok(reporter.all_passed())
}

async fn execute(
    config: &HarnessConfig,
    scenarios: &[Scenario],
    args: &RunArgs,
) -> ComprobarResult<RunReporter> {
    let runner = ScenarioRunner::new(config.clone());

    if args.live || args.headful {
        return execute_live(&runner, scenarios, args).await;
    }

    let factory_config = config.clone();
    let factory = MockFactory::new(move || storefront(&factory_config));
    Ok(if args.parallel {
        runner.run_catalog_parallel(&factory, scenarios).await
    } else {
        runner.run_catalog(&factory, scenarios).await
    })
}

#[cfg(feature = "browser")]
async fn execute_live(
    runner: &ScenarioRunner,
    scenarios: &[Scenario],
    args: &RunArgs,
) -> ComprobarResult<RunReporter> {
    use comprobar::{CdpBrowser, LaunchOptions};

    let options = LaunchOptions::default().with_headless(!args.headful);
    let browser = CdpBrowser::launch(options).await?;
    let reporter = if args.parallel {
        runner.run_catalog_parallel(&browser, scenarios).await
    } else {
        runner.run_catalog(&browser, scenarios).await
    };
    browser.close().await?;
    Ok(reporter)
}

#[cfg(not(feature = "browser"))]
async fn execute_live(
    _runner: &ScenarioRunner,
    _scenarios: &[Scenario],
    _args: &RunArgs,
) -> ComprobarResult<RunReporter> {
    Err(ComprobarError::Config {
        message: "browser control not compiled in. Rebuild with --features browser".to_string(),
    })
}

fn render(reporter: &RunReporter) {
    for report in reporter.reports() {
        let verdict = if report.outcome.is_passed() {
            style("PASS").green().bold()
        } else {
            style("FAIL").red().bold()
        };
        println!(
            "{verdict} {:<18} {} ({}ms)",
            report.name,
            report.description,
            report.duration.as_millis()
        );
        if let Some(ref diagnostic) = report.diagnostic {
            println!("     {}", style(diagnostic).dim());
        }
    }
    println!("\n{}", style(reporter.summary()).bold());
}
