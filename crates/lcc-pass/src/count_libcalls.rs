//! The `count-libcalls` pass.

use lcc_ir::{FuncId, Module};
use tracing::{debug, info};

use crate::config::InstrumentConfig;
use crate::error::Result;
use crate::exclusion::{ExclusionPolicy, NoInstrumentPrefix, Union, default_policy};
use crate::injector::inject_counters;
use crate::metrics;
use crate::pass::{FunctionPass, Statistic};
use crate::resolver::{EntryPoint, ResolveEntryPoint};
use crate::scanner::scan_call_sites;

/// Registered name of the pass.
pub const COUNT_LIBCALLS_NAME: &str = "count-libcalls";

/// One-line description of the pass.
pub const COUNT_LIBCALLS_DESCRIPTION: &str =
    "Count library calls, printing a summary to stderr at program exit";

/// Counts calls to external library functions at run time.
pub struct CountLibcalls {
    resolver: Box<dyn ResolveEntryPoint>,
    policy: Box<dyn ExclusionPolicy>,
    entry: Option<EntryPoint>,
    instrumented: u64,
}

impl CountLibcalls {
    /// Create the pass from a configuration.
    #[must_use]
    pub fn new(config: &InstrumentConfig) -> Self {
        Self {
            resolver: config.pipeline.resolver(),
            policy: default_policy(&config.exclude),
            entry: None,
            instrumented: 0,
        }
    }

    /// Create the pass with a custom exclusion policy.
    ///
    /// Symbols with the reserved prefix stay excluded whatever `policy`
    /// says, so counter calls are never counted themselves.
    #[must_use]
    pub fn with_policy(config: &InstrumentConfig, policy: Box<dyn ExclusionPolicy>) -> Self {
        Self {
            resolver: config.pipeline.resolver(),
            policy: Box::new(Union::new().with(NoInstrumentPrefix).with_boxed(policy)),
            entry: None,
            instrumented: 0,
        }
    }

}

impl FunctionPass for CountLibcalls {
    fn name(&self) -> &'static str {
        COUNT_LIBCALLS_NAME
    }

    fn initialize_module(&mut self, module: &mut Module) -> Result<bool> {
        self.entry = None;
        let entry = self.resolver.resolve(module)?;
        self.entry = Some(entry);
        Ok(entry.modified)
    }

    fn run_on_function(&mut self, module: &mut Module, func: FuncId) -> Result<bool> {
        let Some(entry) = self.entry else {
            return Ok(false);
        };
        // Runtime code linked into the module must not count itself.
        if self.policy.is_excluded(&module.function(func).name) {
            return Ok(false);
        }

        let records = scan_call_sites(module, func, self.policy.as_ref());
        if records.is_empty() {
            return Ok(false);
        }
        let inserted = inject_counters(module, func, entry, &records)?;
        debug!(
            function = %module.function(func).name,
            call_sites = inserted,
            "instrumented library calls"
        );
        self.instrumented += inserted as u64;
        metrics::record_instrumented(inserted as u64);
        Ok(inserted > 0)
    }

    fn finalize_module(&mut self, module: &mut Module) -> Result<bool> {
        info!(
            module = %module.name,
            instrumented = self.instrumented,
            "libcall instrumentation complete"
        );
        Ok(false)
    }

    fn statistics(&self) -> Vec<Statistic> {
        vec![Statistic {
            pass: COUNT_LIBCALLS_NAME,
            description: "Number of instrumented library calls",
            value: self.instrumented,
        }]
    }
}
