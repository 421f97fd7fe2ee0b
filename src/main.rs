use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use bax2bam::cli::{execute, Cli};
use bax2bam::legacy::NoBackend;
use bax2bam::utils::ambient::SystemAmbient;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("bax2bam=debug,info")
    } else {
        EnvFilter::new("bax2bam=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let report = execute(&cli, command_line, &NoBackend, &SystemAmbient);

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        for error in &report.errors {
            eprintln!("ERROR: {error}");
        }
        ExitCode::FAILURE
    }
}
