//! The error enum shared by every stage of the pipeline.
//!
//! Any error aborts the run; there is no local recovery. The driver turns an
//! `Error` into exit code 1 and a single `ERROR: ...` line on standard error.

use thiserror::Error;

/// Every way a run can fail, from the command line down to the VM.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// Missing or malformed command-line input.
    #[error("{0}")]
    Usage(String),

    /// The input file could not be opened or read.
    #[error("{0}")]
    Io(String),

    /// The source program is not well-formed.
    #[error("{0}")]
    Parse(String),

    /// Type mismatch, no matching overload, or unknown name.
    #[error("{0}")]
    Type(String),

    /// Division or modulus by zero.
    #[error("{0}")]
    Arithmetic(String),

    /// A lookup that must succeed did not (missing piece, absent key).
    #[error("{0}")]
    Lookup(String),

    /// An invalid regular expression pattern.
    #[error("{0}")]
    Regex(String),

    /// A broken internal invariant; represents a bug, not bad input.
    #[error("Sanity error: {0}")]
    Internal(String),
}

impl Error {
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Error::Type(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
