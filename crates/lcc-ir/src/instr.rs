//! Instruction IR.

use crate::types::Type;
use crate::value::{FuncId, InstrId, Operand, Value};

/// Call target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Callee {
    /// Statically known function.
    Direct(FuncId),
    /// Computed target.
    Indirect(Value),
}

/// Tail call marker on a plain call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TailKind {
    Tail,
    MustTail,
    NoTail,
}

impl TailKind {
    /// Marker keyword as written before `call`.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Tail => "tail",
            Self::MustTail => "musttail",
            Self::NoTail => "notail",
        }
    }

    /// Parse a marker keyword.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "tail" => Some(Self::Tail),
            "musttail" => Some(Self::MustTail),
            "notail" => Some(Self::NoTail),
            _ => None,
        }
    }
}

/// Instruction kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstrKind {
    /// Plain call.
    Call {
        /// Optional `tail`, `musttail` or `notail` marker.
        tail: Option<TailKind>,
        ret: Type,
        callee: Callee,
        args: Vec<Operand>,
    },
    /// Call with an exceptional successor.
    Invoke {
        ret: Type,
        callee: Callee,
        args: Vec<Operand>,
        /// Label of the normal successor.
        normal: String,
        /// Label of the unwind successor.
        unwind: String,
    },
    /// Any other instruction, kept as text.
    Other { opcode: String, operands: String },
}

/// Single instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub(crate) id: InstrId,
    /// Result name, without the `%` sigil.
    pub result: Option<String>,
    pub kind: InstrKind,
}

impl Instruction {
    /// Stable handle of this instruction.
    #[must_use]
    pub const fn id(&self) -> InstrId {
        self.id
    }

    /// Check if this is a call or an invoke.
    #[must_use]
    pub const fn is_call_site(&self) -> bool {
        matches!(self.kind, InstrKind::Call { .. } | InstrKind::Invoke { .. })
    }

    /// Call target, if this is a call site.
    #[must_use]
    pub const fn callee(&self) -> Option<&Callee> {
        match &self.kind {
            InstrKind::Call { callee, .. } | InstrKind::Invoke { callee, .. } => Some(callee),
            InstrKind::Other { .. } => None,
        }
    }

    /// Statically resolved target of a direct call site.
    #[must_use]
    pub const fn called_function(&self) -> Option<FuncId> {
        match self.callee() {
            Some(Callee::Direct(func)) => Some(*func),
            _ => None,
        }
    }

    /// Arguments passed at this call site.
    #[must_use]
    pub fn args(&self) -> &[Operand] {
        match &self.kind {
            InstrKind::Call { args, .. } | InstrKind::Invoke { args, .. } => args,
            InstrKind::Other { .. } => &[],
        }
    }
}
