//! Counting entry point resolution.
//!
//! Where the runtime counter comes from depends on the build: after
//! whole-program linking its definition is already part of the module, while
//! a single translation unit has to forward-declare it and leave the rest to
//! the linker. Each shape gets its own resolver, picked once per module.

use lcc_ir::{FnAttrs, FuncId, FunctionType, Module, Type};
use tracing::debug;

use crate::COUNT_LIBCALL_SYMBOL;
use crate::config::Pipeline;
use crate::error::{PassError, Result};

/// Signature of the counting entry point: `void (ptr)`.
#[must_use]
pub fn entry_point_type() -> FunctionType {
    FunctionType::new(Type::Void, vec![Type::Ptr])
}

/// Resolved counting entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryPoint {
    /// The entry point function in the module.
    pub func: FuncId,
    /// Whether resolving it changed the module.
    pub modified: bool,
}

/// Provides the counting entry point for one module.
pub trait ResolveEntryPoint {
    /// Return the entry point, valid for the rest of the module's processing.
    fn resolve(&self, module: &mut Module) -> Result<EntryPoint>;
}

/// Whole-program resolver: the runtime definition must already be present.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinkTimeResolver;

impl ResolveEntryPoint for LinkTimeResolver {
    fn resolve(&self, module: &mut Module) -> Result<EntryPoint> {
        let func = module
            .get_function(COUNT_LIBCALL_SYMBOL)
            .filter(|&id| !module.function(id).is_declaration())
            .ok_or_else(|| PassError::EntryPointMissing(COUNT_LIBCALL_SYMBOL.to_string()))?;
        check_signature(module, func)?;
        debug!(symbol = COUNT_LIBCALL_SYMBOL, "found runtime definition");
        Ok(EntryPoint {
            func,
            modified: false,
        })
    }
}

/// Single-unit resolver: declares the entry point for the linker to resolve.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompileTimeResolver;

impl ResolveEntryPoint for CompileTimeResolver {
    fn resolve(&self, module: &mut Module) -> Result<EntryPoint> {
        let (func, inserted) = module.get_or_insert_function(
            COUNT_LIBCALL_SYMBOL,
            entry_point_type(),
            FnAttrs::nounwind(),
        )?;
        if !inserted {
            check_signature(module, func)?;
        }
        debug!(
            symbol = COUNT_LIBCALL_SYMBOL,
            declared = inserted,
            "resolved runtime declaration"
        );
        Ok(EntryPoint {
            func,
            modified: inserted,
        })
    }
}

fn check_signature(module: &Module, func: FuncId) -> Result<()> {
    let expected = entry_point_type();
    let found = &module.function(func).ty;
    if *found == expected {
        Ok(())
    } else {
        Err(PassError::EntryPointSignature {
            name: COUNT_LIBCALL_SYMBOL.to_string(),
            expected,
            found: found.clone(),
        })
    }
}

impl Pipeline {
    /// Resolver matching this pipeline shape.
    #[must_use]
    pub fn resolver(self) -> Box<dyn ResolveEntryPoint> {
        match self {
            Self::LinkTime => Box::new(LinkTimeResolver),
            Self::CompileTime => Box::new(CompileTimeResolver),
        }
    }
}
