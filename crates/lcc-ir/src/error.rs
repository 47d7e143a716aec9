use thiserror::Error;

use crate::value::InstrId;

/// IR construction and parsing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("duplicate symbol @{0}")]
    DuplicateSymbol(String),
    #[error("unknown symbol @{0}")]
    UnknownSymbol(String),
    #[error("instruction {id} not found in @{function}")]
    InstrNotFound { id: InstrId, function: String },
    #[error("builder has no insertion point")]
    NoInsertPoint,
    #[error("@{0} is a declaration and has no body")]
    NoBody(String),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, IrError>;
