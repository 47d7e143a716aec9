//! Call-site scanner.

use lcc_ir::{FuncId, Function, InstrId, Module};

use crate::exclusion::ExclusionPolicy;

/// A call site selected for instrumentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSiteRecord {
    /// The call or invoke; still owned by the function.
    pub instr: InstrId,
    /// Resolved target.
    pub target: FuncId,
    /// Name of the target, used as the runtime counter key.
    pub name: String,
}

/// Check if a direct call to `target` should be counted.
///
/// Only declarations qualify: functions with a body in this module,
/// intrinsics, and excluded names are skipped.
pub fn is_countable_target(target: &Function, policy: &dyn ExclusionPolicy) -> bool {
    target.is_declaration() && !target.is_intrinsic() && !policy.is_excluded(&target.name)
}

/// Collect the call sites in `func` that call a countable target.
///
/// Records come out in instruction order. Indirect calls are never recorded,
/// whatever they may point to at run time. The module is not modified.
pub fn scan_call_sites(
    module: &Module,
    func: FuncId,
    policy: &dyn ExclusionPolicy,
) -> Vec<CallSiteRecord> {
    module
        .function(func)
        .instructions()
        .filter_map(|instr| {
            let target = instr.called_function()?;
            let callee = module.function(target);
            is_countable_target(callee, policy).then(|| CallSiteRecord {
                instr: instr.id(),
                target,
                name: callee.name.clone(),
            })
        })
        .collect()
}
