use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anpr_api_harness::{HarnessConfig, TestRunner};

/// ANPR API Harness - run the backend test battery
///
/// Flags override the environment; unset flags fall back to the values
/// resolved by `config::get()`.
#[derive(Parser, Debug)]
#[command(
    name = "anpr-api-harness",
    about = "Sequential HTTP integration tests for a license plate recognition backend",
    after_help = "ENVIRONMENT VARIABLES:\n\
        ANPR_HARNESS_BASE_URL         Root URL of the backend\n\
        ANPR_HARNESS_TIMEOUT          Timeout for simple requests (s)\n\
        ANPR_HARNESS_UPLOAD_TIMEOUT   Timeout for file uploads (s)\n\
        ANPR_HARNESS_RESULTS_PATH     Where the JSON summary is written\n\
        RUST_LOG                      Log filter (default: info)"
)]
struct Args {
    /// Root URL of the backend under test
    #[arg(long)]
    base_url: Option<String>,

    /// Path of the JSON summary file
    #[arg(short, long, conflicts_with = "no_output")]
    output: Option<PathBuf>,

    /// Do not write the JSON summary file
    #[arg(long)]
    no_output: bool,

    /// Timeout in seconds for requests without file uploads
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Timeout in seconds for multipart uploads
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    upload_timeout: Option<u64>,
}

/// Layer command-line overrides on top of the environment configuration
fn harness_config(args: Args) -> HarnessConfig {
    let mut config = match &args.base_url {
        Some(url) => HarnessConfig::new(url),
        None => HarnessConfig::default(),
    };

    if let Some(secs) = args.timeout {
        config = config.request_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = args.upload_timeout {
        config = config.upload_timeout(Duration::from_secs(secs));
    }

    if args.no_output {
        config.results_path(None)
    } else if let Some(path) = args.output {
        config.results_path(Some(path))
    } else {
        config
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = harness_config(Args::parse());

    let mut runner = match TestRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Failed to initialize HTTP client: {}", e);
            return ExitCode::from(2);
        }
    };

    match runner.run_all_tests() {
        0 => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
