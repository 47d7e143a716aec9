//! libcallcount driver.
//!
//! Parses a textual IR module, runs a pass pipeline over it and prints the
//! result.
//!
//! # Example
//!
//! ```ignore
//! use lcc::{InstrumentConfig, Pipeline, instrument_source};
//!
//! let config = InstrumentConfig::new(Pipeline::CompileTime);
//! let (text, outcome) = instrument_source(&source, &config, &["count-libcalls"])?;
//! ```

use std::path::Path;

pub use lcc_ir::{Module, parse_module};
pub use lcc_pass::{
    COUNT_LIBCALL_SYMBOL, InstrumentConfig, PASSES, PassInfo, PassManager, PassOutcome, Pipeline,
    Statistic, lookup_pass,
};

mod error;
pub mod metrics;

pub use error::*;

/// Default pipeline: just the instrumentation pass.
pub const DEFAULT_PASSES: &[&str] = &[lcc_pass::COUNT_LIBCALLS_NAME];

/// Run the named passes over an already parsed module.
pub fn instrument_module<S: AsRef<str>>(
    module: &mut Module,
    config: &InstrumentConfig,
    passes: &[S],
) -> Result<PassOutcome> {
    let mut pm = PassManager::from_names(passes, config)?;
    Ok(pm.run(module)?)
}

/// Parse `source`, run the named passes and return the resulting IR text.
pub fn instrument_source<S: AsRef<str>>(
    source: &str,
    config: &InstrumentConfig,
    passes: &[S],
) -> Result<(String, PassOutcome)> {
    let mut module = parse_module(source)?;
    let outcome = instrument_module(&mut module, config, passes)?;
    Ok((module.to_string(), outcome))
}

/// Read and parse a module file.
pub fn load_module(path: &Path) -> Result<Module> {
    let source = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_module(&source)?)
}

/// Write a module's text form to `path`, replacing any existing file.
pub fn write_module(path: &Path, module: &Module) -> Result<()> {
    std::fs::write(path, module.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_pass_is_reported() {
        let err = instrument_source("", &InstrumentConfig::default(), &["bogus"]).unwrap_err();
        assert!(matches!(err, Error::Pass(lcc_pass::PassError::UnknownPass(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_module(Path::new("/nonexistent/module.ll")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn test_write_module_into_missing_directory() {
        let module = parse_module("declare void @f()\n").unwrap();
        let err = write_module(Path::new("/nonexistent/dir/out.ll"), &module).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
