use thiserror::Error;

use lcc_ir::{FunctionType, IrError};

/// Pass errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PassError {
    #[error("runtime entry point @{0} is not defined in the module (is the runtime linked in?)")]
    EntryPointMissing(String),
    #[error("runtime entry point @{name} has type {found}, expected {expected}")]
    EntryPointSignature {
        name: String,
        expected: FunctionType,
        found: FunctionType,
    },
    #[error("unknown pass: {0}")]
    UnknownPass(String),
    #[error("IR error: {0}")]
    Ir(#[from] IrError),
}

pub type Result<T> = std::result::Result<T, PassError>;
