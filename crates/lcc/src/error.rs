use std::path::PathBuf;

use thiserror::Error;

/// Driver errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IR error: {0}")]
    Ir(#[from] lcc_ir::IrError),
    #[error("pass error: {0}")]
    Pass(#[from] lcc_pass::PassError),
    #[error("{path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
