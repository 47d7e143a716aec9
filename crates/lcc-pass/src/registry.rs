//! Pass registry.

use crate::config::InstrumentConfig;
use crate::count_libcalls::{COUNT_LIBCALLS_DESCRIPTION, COUNT_LIBCALLS_NAME, CountLibcalls};
use crate::dump_ir::{DUMP_IR_DESCRIPTION, DUMP_IR_NAME, DumpIr};
use crate::error::{PassError, Result};
use crate::pass::{Pass, PassManager};

/// Registration info for a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassInfo {
    /// Identifier used to select the pass.
    pub name: &'static str,
    pub description: &'static str,
}

/// All registered passes.
pub const PASSES: &[PassInfo] = &[
    PassInfo {
        name: COUNT_LIBCALLS_NAME,
        description: COUNT_LIBCALLS_DESCRIPTION,
    },
    PassInfo {
        name: DUMP_IR_NAME,
        description: DUMP_IR_DESCRIPTION,
    },
];

/// Look up registration info by name.
#[must_use]
pub fn lookup_pass(name: &str) -> Option<&'static PassInfo> {
    PASSES.iter().find(|p| p.name == name)
}

/// Instantiate a registered pass.
pub fn create_pass(name: &str, config: &InstrumentConfig) -> Result<Pass> {
    match name {
        COUNT_LIBCALLS_NAME => Ok(Pass::Function(Box::new(CountLibcalls::new(config)))),
        DUMP_IR_NAME => Ok(Pass::Module(Box::new(DumpIr))),
        _ => Err(PassError::UnknownPass(name.to_string())),
    }
}

impl PassManager {
    /// Build a pipeline from registered pass names.
    pub fn from_names<S: AsRef<str>>(names: &[S], config: &InstrumentConfig) -> Result<Self> {
        let mut pm = Self::new();
        for name in names {
            pm.add(create_pass(name.as_ref(), config)?);
        }
        Ok(pm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_registered_pass_can_be_created() {
        let config = InstrumentConfig::default();
        for info in PASSES {
            let pass = create_pass(info.name, &config).unwrap();
            assert_eq!(pass.name(), info.name);
        }
    }

    #[test]
    fn test_lookup() {
        let info = lookup_pass("count-libcalls").unwrap();
        assert_eq!(
            info.description,
            "Count library calls, printing a summary to stderr at program exit"
        );
        assert!(lookup_pass("count-everything").is_none());
    }

    #[test]
    fn test_from_names() {
        let config = InstrumentConfig::default();
        let pm = PassManager::from_names(&["dump-ir", "count-libcalls"], &config).unwrap();
        assert_eq!(pm.pass_names(), ["dump-ir", "count-libcalls"]);

        let err = PassManager::from_names(&["nope"], &config).err().unwrap();
        assert_eq!(err, PassError::UnknownPass("nope".to_string()));
    }
}
