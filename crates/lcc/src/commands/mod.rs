//! Command implementations.

mod instrument;
mod passes;

use crate::cli::{Cli, Commands};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Instrument { .. } => handle_instrument(cli),
        Commands::Passes { name } => passes::cmd_passes(name.as_deref()),
    }
}

fn handle_instrument(cli: &Cli) -> i32 {
    let Commands::Instrument {
        input,
        output,
        pipeline,
        exclude,
        passes,
        stats,
    } = &cli.command
    else {
        unreachable!("instrument command variant mismatch");
    };

    instrument::cmd_instrument(
        input,
        output.as_deref(),
        (*pipeline).into(),
        exclude,
        passes,
        *stats,
    )
}
