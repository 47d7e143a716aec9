//! Instruction builder.

use crate::error::{IrError, Result};
use crate::function::Function;
use crate::instr::{Callee, InstrKind};
use crate::module::Module;
use crate::types::Type;
use crate::value::{FuncId, InstrId, Operand, Value};

/// Queues new instructions in front of existing ones.
///
/// Calls created with [`IRBuilder::create_call`] are applied to the function
/// together by [`IRBuilder::finish`], so existing handles stay valid while
/// the builder is in use.
#[derive(Clone, Debug, Default)]
pub struct IRBuilder {
    insert_point: Option<InstrId>,
    pending: Vec<(InstrId, InstrKind)>,
}

impl IRBuilder {
    /// Create a builder without an insertion point.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            insert_point: None,
            pending: Vec::new(),
        }
    }

    /// Insert subsequent instructions immediately before `instr`.
    pub const fn set_insert_point(&mut self, instr: InstrId) {
        self.insert_point = Some(instr);
    }

    /// Queue a direct call to `callee` at the insertion point.
    ///
    /// The call has no result name, so `ret` should be `void` or the result
    /// is discarded.
    pub fn create_call(&mut self, ret: Type, callee: FuncId, args: Vec<Operand>) -> Result<()> {
        let before = self.insert_point.ok_or(IrError::NoInsertPoint)?;
        self.pending.push((
            before,
            InstrKind::Call {
                tail: None,
                ret,
                callee: Callee::Direct(callee),
                args,
            },
        ));
        Ok(())
    }

    /// Insert every queued instruction into `function`.
    ///
    /// Returns the new handles in creation order.
    pub fn finish(self, function: &mut Function) -> Result<Vec<InstrId>> {
        function.insert_before_each(self.pending)
    }

    /// Pointer to a read-only, NUL-terminated copy of `s`.
    pub fn create_global_string_ptr(module: &mut Module, s: &str) -> Operand {
        let id = module.add_global_string(s.as_bytes());
        Operand::new(Type::Ptr, Value::Global(id))
    }
}
