//! The `dump-ir` pass.

use lcc_ir::Module;
use tracing::info;

use crate::error::Result;
use crate::pass::ModulePass;

/// Registered name of the pass.
pub const DUMP_IR_NAME: &str = "dump-ir";

/// One-line description of the pass.
pub const DUMP_IR_DESCRIPTION: &str = "Print the module IR to the log";

/// Logs the module text; never modifies it.
#[derive(Clone, Copy, Debug, Default)]
pub struct DumpIr;

impl ModulePass for DumpIr {
    fn name(&self) -> &'static str {
        DUMP_IR_NAME
    }

    fn run_on_module(&mut self, module: &mut Module) -> Result<bool> {
        info!(module = %module.name, "\n{module}");
        Ok(false)
    }
}
