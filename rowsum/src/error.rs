//! Error types for rowsum runs

use rowsum_core::RowsumError;
use std::io;
use thiserror::Error;

/// Exit status for a run aborted from the interrupt prompt
pub const EXIT_INTERRUPTED: u8 = 130;

/// Exit status for every other fatal error
pub const EXIT_FAILURE: u8 = 1;

/// Fatal errors of a generation or aggregation run
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(#[from] RowsumError),

    #[error("Error {op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Dataset is {actual} bytes, expected {expected}")]
    DatasetSize { expected: u64, actual: u64 },

    #[error("Error creating {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Error joining {name}: thread panicked")]
    Join { name: String },

    #[error("Error installing signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Sum mismatch: generated {generated}, aggregated {aggregated}")]
    SumMismatch { generated: i64, aggregated: i64 },

    #[error("Aborted by user")]
    Aborted,
}

impl Error {
    /// Wrap an I/O error with the operation that failed
    pub fn io(op: &'static str, source: io::Error) -> Self {
        Error::Io { op, source }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Aborted => EXIT_INTERRUPTED,
            _ => EXIT_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::Aborted.exit_code(), EXIT_INTERRUPTED);
        assert_eq!(
            Error::from(RowsumError::UnevenPartition).exit_code(),
            EXIT_FAILURE
        );
        let err = Error::io("reading the file", io::ErrorKind::UnexpectedEof.into());
        assert_eq!(err.exit_code(), EXIT_FAILURE);
        assert!(err.to_string().starts_with("Error reading the file"));
    }
}
