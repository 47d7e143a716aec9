//! Pass listing.

use lcc::{PASSES, PassInfo, lookup_pass};
use tracing::error;

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Handle the `passes` command.
pub fn cmd_passes(name: Option<&str>) -> i32 {
    let selected: Vec<&PassInfo> = match name {
        Some(name) => match lookup_pass(name) {
            Some(info) => vec![info],
            None => {
                error!(pass = name, "unknown pass");
                return EXIT_FAILURE;
            }
        },
        None => PASSES.iter().collect(),
    };
    let width = selected.iter().map(|p| p.name.len()).max().unwrap_or(0);
    for pass in selected {
        println!("{:<width$}  {}", pass.name, pass.description);
    }
    EXIT_SUCCESS
}
