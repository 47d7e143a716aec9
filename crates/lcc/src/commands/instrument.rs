//! Instrument command.

use std::path::Path;

use lcc::{InstrumentConfig, Pipeline, Statistic};
use tracing::{error, info};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Handle the `instrument` command.
pub fn cmd_instrument(
    input: &Path,
    output: Option<&Path>,
    pipeline: Pipeline,
    exclude: &[String],
    passes: &[String],
    stats: bool,
) -> i32 {
    info!(input = %input.display(), %pipeline, "instrumenting");

    let mut module = match lcc::load_module(input) {
        Ok(module) => module,
        Err(e) => {
            error!(error = %e, "failed to load module");
            return EXIT_FAILURE;
        }
    };

    let config = InstrumentConfig::new(pipeline).with_exclude(exclude.iter().cloned());
    let outcome = match lcc::instrument_module(&mut module, &config, passes) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "instrumentation failed");
            return EXIT_FAILURE;
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = lcc::write_module(path, &module) {
                error!(output = %path.display(), error = %e, "failed to write module");
                return EXIT_FAILURE;
            }
            info!(output = %path.display(), modified = outcome.modified, "done");
        }
        None => print!("{module}"),
    }

    if stats {
        print_statistics(&outcome.statistics);
    }
    EXIT_SUCCESS
}

fn print_statistics(statistics: &[Statistic]) {
    eprintln!("## Pass Statistics");
    for stat in statistics {
        eprintln!("  {} - {}: {}", stat.pass, stat.description, stat.value);
    }
}
