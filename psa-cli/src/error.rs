//! Top-level CLI error type. Wraps core and collaborator errors so `main`
//! can print one message and choose one exit code.

use crate::csv_io::CsvError;
use psa_core::PsaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Csv(#[from] CsvError),
    #[error(transparent)]
    Solver(#[from] PsaError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
