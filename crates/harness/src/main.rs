//! Libris conformance harness.
//!
//! Drives the auth gateway, REST, and SOAP loan suites against a running
//! deployment of the library management backend and reports every
//! expected-vs-actual judgement. Exit code 0 means every check passed.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use libris_application::{Scenario, ScenarioStatus};
use libris_domain::{Ledger, ScenarioState, Targets};
use libris_infrastructure::{Reporter, ReqwestDispatcher};
use libris::{config, suites};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SuiteChoice {
    /// Every suite, in order: auth, rest, soap.
    All,
    /// Auth gateway suite only.
    Auth,
    /// Book and user REST suite only.
    Rest,
    /// SOAP loan suite only.
    Soap,
}

#[derive(Debug, Parser)]
#[command(
    name = "libris",
    about = "Conformance harness for the library management backend",
    version
)]
struct Cli {
    /// Which suite to run.
    #[arg(long, value_enum, default_value_t = SuiteChoice::All)]
    suite: SuiteChoice,

    /// Auth gateway base URL.
    #[arg(long, env = "LIBRIS_AUTH_URL", default_value = config::DEFAULT_AUTH_URL)]
    auth_url: String,

    /// Book service base URL.
    #[arg(long, env = "LIBRIS_BOOK_URL", default_value = config::DEFAULT_BOOK_URL)]
    book_url: String,

    /// User service base URL.
    #[arg(long, env = "LIBRIS_USER_URL", default_value = config::DEFAULT_USER_URL)]
    user_url: String,

    /// Loan SOAP service endpoint URL.
    #[arg(long, env = "LIBRIS_LOAN_URL", default_value = config::DEFAULT_LOAN_URL)]
    loan_url: String,

    /// Delay between scenario steps, in milliseconds.
    #[arg(long, default_value_t = 300)]
    pacing_ms: u64,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn scenarios(&self) -> Vec<Scenario> {
        let pacing = Duration::from_millis(self.pacing_ms);
        match self.suite {
            SuiteChoice::All => vec![
                suites::auth::scenario(pacing),
                suites::rest::scenario(pacing),
                suites::soap::scenario(pacing),
            ],
            SuiteChoice::Auth => vec![suites::auth::scenario(pacing)],
            SuiteChoice::Rest => vec![suites::rest::scenario(pacing)],
            SuiteChoice::Soap => vec![suites::soap::scenario(pacing)],
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let targets = match config::targets(&cli.auth_url, &cli.book_url, &cli.user_url, &cli.loan_url)
    {
        Ok(targets) => targets,
        Err(e) => {
            eprintln!("invalid target address: {e}");
            return ExitCode::FAILURE;
        }
    };

    let dispatcher = match ReqwestDispatcher::new() {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let reporter = Reporter::new(!cli.no_color);
    let scenarios = cli.scenarios();

    tokio::select! {
        code = run(scenarios, &dispatcher, &targets, reporter) => code,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nTests interrupted by user");
            ExitCode::from(130)
        }
    }
}

async fn run(
    mut scenarios: Vec<Scenario>,
    dispatcher: &ReqwestDispatcher,
    targets: &Targets,
    reporter: Reporter,
) -> ExitCode {
    let mut all_passed = true;

    for scenario in &mut scenarios {
        println!("\n==== {} ====", scenario.name());

        let mut state = ScenarioState::new();
        let mut ledger = Ledger::new();
        let status = scenario
            .run(dispatcher, targets, &mut state, &mut ledger)
            .await;

        // The full ledger is printed even after an abort.
        println!("{}", reporter.render(&ledger));

        if let ScenarioStatus::Aborted { step, reason } = status {
            eprintln!("{}: aborted at '{step}': {reason}", scenario.name());
            all_passed = false;
        }
        if !ledger.all_passed() {
            all_passed = false;
        }
    }

    if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
