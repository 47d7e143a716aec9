//! Handles and operand values.

use std::fmt;

use crate::types::Type;

/// Index of a function within its module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(pub(crate) usize);

impl FuncId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Index of a global string constant within its module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalId(pub(crate) usize);

impl GlobalId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Index of a basic block within its function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Stable instruction handle.
///
/// Ids are allocated per function and never reused, so a handle keeps
/// naming the same instruction while other instructions are inserted
/// around it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrId(pub(crate) u32);

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operand value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// Named local (`%x`).
    Local(String),
    /// Integer literal.
    Int(i64),
    /// Null pointer.
    Null,
    /// Address of a global string constant.
    Global(GlobalId),
    /// Address of a function.
    Func(FuncId),
}

/// Typed operand, as passed to a call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Operand {
    pub ty: Type,
    pub value: Value,
}

impl Operand {
    #[must_use]
    pub const fn new(ty: Type, value: Value) -> Self {
        Self { ty, value }
    }
}
