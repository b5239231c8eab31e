//! Error types for rowsum layout and partitioning

/// Errors that can occur while describing or validating a dataset layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowsumError {
    /// Dataset has zero rows
    ZeroRows,
    /// Dataset has zero columns
    ZeroColumns,
    /// Worker pool has zero workers
    ZeroWorkers,
    /// Row count is not divisible by the worker count
    UnevenPartition,
    /// Worker index is outside the pool
    WorkerOutOfRange,
    /// Element or byte count does not fit the address space
    ShapeOverflow,
    /// Byte length is not a whole number of elements
    ArrayAlignment,
    /// Dataset byte length does not match its shape
    LengthMismatch,
    /// Malformed shape or count string
    InvalidFormat,
}

impl core::fmt::Display for RowsumError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            RowsumError::ZeroRows => "Dataset must have at least one row",
            RowsumError::ZeroColumns => "Dataset must have at least one column",
            RowsumError::ZeroWorkers => "Worker pool must have at least one worker",
            RowsumError::UnevenPartition => "Row count is not divisible by worker count",
            RowsumError::WorkerOutOfRange => "Worker index out of range",
            RowsumError::ShapeOverflow => "Dataset size overflows",
            RowsumError::ArrayAlignment => "Byte length is not a multiple of the element size",
            RowsumError::LengthMismatch => "Dataset length does not match its shape",
            RowsumError::InvalidFormat => "Invalid format",
        };
        write!(f, "{msg}")
    }
}

impl core::error::Error for RowsumError {}

/// Result type for rowsum layout operations
pub type Result<T> = core::result::Result<T, RowsumError>;
