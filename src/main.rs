use clap::Parser;
use skulk::cli::Cli;
use skulk::error::ConfigError;
use skulk::output::print_error;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status for a run rejected before scanning.
const EXIT_CONFIG: u8 = 2;

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        "skulk=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.execute().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&format!("{:#}", e));
            if e.downcast_ref::<ConfigError>().is_some() {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
