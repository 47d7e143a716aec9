//! Library call counting instrumentation.
//!
//! The `count-libcalls` pass finds every direct call to a function that is
//! only declared in the module and inserts a call to the runtime counter in
//! front of it. The runtime (`lcc-rt`) prints the per-name totals when the
//! instrumented program exits.
//!
//! # Example
//!
//! ```ignore
//! use lcc_pass::{InstrumentConfig, PassManager, Pipeline};
//!
//! let config = InstrumentConfig::new(Pipeline::CompileTime);
//! let mut pm = PassManager::from_names(&["count-libcalls"], &config)?;
//! let outcome = pm.run(&mut module)?;
//! ```

mod config;
mod count_libcalls;
mod dump_ir;
mod error;
mod exclusion;
mod injector;
pub mod metrics;
mod pass;
mod registry;
mod resolver;
mod scanner;

pub use config::*;
pub use count_libcalls::*;
pub use dump_ir::*;
pub use error::*;
pub use exclusion::*;
pub use injector::*;
pub use pass::*;
pub use registry::*;
pub use resolver::*;
pub use scanner::*;

/// Prefix reserved for symbols that must never be instrumented.
pub const NOINSTRUMENT_PREFIX: &str = "__noinstrument_";

/// Runtime counting entry point, `void(const char *)`.
pub const COUNT_LIBCALL_SYMBOL: &str = "__noinstrument_count_libcall";
