//! Partial sums and their reduction into a global total

use crate::format::element::sum_bytes;
use crate::format::ELEMENT_SIZE;
use crate::validation::validate_array_bounds;
use crate::traits::PartitionProcessor;
use crate::RowsumError;

/// Running sum over one partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumProcessor {
    columns: usize,
    sum: i64,
    elements: usize,
}

/// Result of summing one partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartialSum {
    pub sum: i64,
    pub elements: usize,
    pub rows: usize,
}

impl SumProcessor {
    pub const fn new(columns: usize) -> Self {
        Self {
            columns,
            sum: 0,
            elements: 0,
        }
    }
}

impl PartitionProcessor for SumProcessor {
    type Output = PartialSum;

    fn process_block(&mut self, block: &[u8], _first_row: usize) -> Result<(), RowsumError> {
        if block.len() % (self.columns * ELEMENT_SIZE) != 0 {
            return Err(RowsumError::UnevenPartition);
        }
        self.sum += sum_bytes(block)?;
        self.elements += validate_array_bounds(block.len())?;
        Ok(())
    }

    fn finalize(self) -> PartialSum {
        PartialSum {
            sum: self.sum,
            elements: self.elements,
            rows: self.elements / self.columns,
        }
    }
}

/// Combine partial sums into the global total
///
/// Addition is associative and commutative, so the merge order of workers
/// never changes the result.
pub fn reduce<I>(partials: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    partials.into_iter().sum()
}
