//! Dataset shape definitions
//!
//! A dataset is a flat, headerless sequence of `rows * columns` native-endian
//! integers laid out row-major. The shape is the only metadata; it lives in
//! configuration, never in the file.

use super::constants::{DEFAULT_COLUMNS, DEFAULT_ROWS, ELEMENT_SIZE};
use crate::{Result, RowsumError};

/// Logical rows x columns layout of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DatasetShape {
    /// Number of rows
    pub rows: usize,
    /// Number of elements per row
    pub columns: usize,
}

impl DatasetShape {
    /// Create a validated shape
    ///
    /// Rejects empty dimensions and shapes whose byte length would not fit
    /// in `usize`.
    pub const fn new(rows: usize, columns: usize) -> Result<Self> {
        if rows == 0 {
            return Err(RowsumError::ZeroRows);
        }
        if columns == 0 {
            return Err(RowsumError::ZeroColumns);
        }
        let shape = Self { rows, columns };
        match shape.checked_byte_len() {
            Some(_) => Ok(shape),
            None => Err(RowsumError::ShapeOverflow),
        }
    }

    /// Total number of elements
    pub const fn element_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Total size of the dataset in bytes
    pub const fn byte_len(&self) -> usize {
        self.element_count() * ELEMENT_SIZE
    }

    /// Size of one row in bytes
    pub const fn row_bytes(&self) -> usize {
        self.columns * ELEMENT_SIZE
    }

    /// Byte offset of the first element of `row`
    pub const fn row_offset(&self, row: usize) -> u64 {
        (row * self.row_bytes()) as u64
    }

    const fn checked_byte_len(&self) -> Option<usize> {
        match self.rows.checked_mul(self.columns) {
            Some(count) => count.checked_mul(ELEMENT_SIZE),
            None => None,
        }
    }
}

impl Default for DatasetShape {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
        }
    }
}

impl core::fmt::Display for DatasetShape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}
