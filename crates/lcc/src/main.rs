//! libcallcount CLI - library call counting instrumentation

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Only the instrument command reports metrics.
    let metrics_handle = match &cli.command {
        cli::Commands::Instrument { stats: true, .. } => lcc::metrics::StatsRecorder::new().install(),
        _ => None,
    };

    lcc_pass::metrics::init();

    let default_level = if cli.verbose {
        "lcc=debug"
    } else if cli.silent {
        "lcc=error"
    } else {
        "lcc=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = commands::run_command(&cli);

    if let Some(handle) = metrics_handle {
        handle.print_summary();
    }

    std::process::exit(exit_code);
}
