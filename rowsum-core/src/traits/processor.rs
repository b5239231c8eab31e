//! Block processing interface for partition reads

use crate::RowsumError;

/// Trait for consumers of a partition, fed one block of rows at a time
///
/// Blocks arrive in ascending row order and always hold whole rows.
pub trait PartitionProcessor {
    /// Result produced once every block has been seen
    type Output;

    /// Process one block of encoded elements
    ///
    /// `first_row` is the dataset row index of the block's first row.
    fn process_block(&mut self, block: &[u8], first_row: usize) -> Result<(), RowsumError>;

    /// Finalize processing and return the result
    fn finalize(self) -> Self::Output;
}
