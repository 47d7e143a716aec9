//! IR types.

use std::fmt;

/// First-class value types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// No value.
    Void,
    /// Integer of the given bit width.
    Int(u32),
    /// Opaque pointer.
    Ptr,
}

impl Type {
    /// Check if this is the void type.
    #[must_use]
    pub const fn is_void(self) -> bool {
        matches!(self, Self::Void)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Int(bits) => write!(f, "i{bits}"),
            Self::Ptr => f.write_str("ptr"),
        }
    }
}

/// Function signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionType {
    /// Return type.
    pub ret: Type,
    /// Parameter types.
    pub params: Vec<Type>,
    /// Accepts extra arguments after `params`.
    pub variadic: bool,
}

impl FunctionType {
    /// Create a non-variadic signature.
    #[must_use]
    pub const fn new(ret: Type, params: Vec<Type>) -> Self {
        Self {
            ret,
            params,
            variadic: false,
        }
    }

    /// Mark the signature as variadic.
    #[must_use]
    pub fn with_variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.ret)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        if self.variadic {
            f.write_str(if self.params.is_empty() { "..." } else { ", ..." })?;
        }
        f.write_str(")")
    }
}
