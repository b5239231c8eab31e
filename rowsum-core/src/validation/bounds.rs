//! Length and bounds validation for dataset byte ranges
//!
//! Pure arithmetic checks with no I/O dependencies.

use crate::format::{DatasetShape, ELEMENT_SIZE};
use crate::partition::Partition;
use crate::RowsumError;

/// Validate a byte length as a whole number of elements
///
/// Returns the element count.
pub const fn validate_array_bounds(byte_len: usize) -> Result<usize, RowsumError> {
    if byte_len % ELEMENT_SIZE != 0 {
        return Err(RowsumError::ArrayAlignment);
    }
    Ok(byte_len / ELEMENT_SIZE)
}

/// Validate that a stored dataset's byte length matches `shape`
///
/// Catches truncated or foreign files before any worker starts reading.
pub const fn validate_dataset_len(byte_len: u64, shape: &DatasetShape) -> Result<(), RowsumError> {
    if byte_len % ELEMENT_SIZE as u64 != 0 {
        return Err(RowsumError::ArrayAlignment);
    }
    if byte_len != shape.byte_len() as u64 {
        return Err(RowsumError::LengthMismatch);
    }
    Ok(())
}

/// Validate that a partition lies inside a dataset of `shape` and starts on
/// a row boundary
pub const fn validate_partition_bounds(
    partition: &Partition,
    shape: &DatasetShape,
) -> Result<(), RowsumError> {
    if shape.columns == 0 {
        return Err(RowsumError::ZeroColumns);
    }
    let end = match partition.start.checked_add(partition.len) {
        Some(end) => end,
        None => return Err(RowsumError::ShapeOverflow),
    };
    if end > shape.element_count() {
        return Err(RowsumError::WorkerOutOfRange);
    }
    if partition.start % shape.columns != 0 || partition.len % shape.columns != 0 {
        return Err(RowsumError::UnevenPartition);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::{PartitionPlan, WorkerId};

    #[test]
    fn test_validate_array_bounds() {
        assert_eq!(validate_array_bounds(16), Ok(4));
        assert_eq!(validate_array_bounds(0), Ok(0));
        assert_eq!(validate_array_bounds(15), Err(RowsumError::ArrayAlignment));
    }

    #[test]
    fn test_validate_dataset_len() {
        let shape = DatasetShape::default();
        assert_eq!(validate_dataset_len(20_000, &shape), Ok(()));
        assert_eq!(
            validate_dataset_len(19_996, &shape),
            Err(RowsumError::LengthMismatch)
        );
        assert_eq!(
            validate_dataset_len(19_999, &shape),
            Err(RowsumError::ArrayAlignment)
        );
        assert_eq!(validate_dataset_len(0, &shape), Err(RowsumError::LengthMismatch));
    }

    #[test]
    fn test_validate_partition_bounds() {
        let shape = DatasetShape::default();
        let plan = PartitionPlan::new(shape, 4).unwrap();
        for partition in plan.partitions() {
            assert_eq!(validate_partition_bounds(&partition, &shape), Ok(()));
        }

        let mut past_end = plan.partition(WorkerId(3)).unwrap();
        past_end.start += shape.columns;
        assert_eq!(
            validate_partition_bounds(&past_end, &shape),
            Err(RowsumError::WorkerOutOfRange)
        );

        let mut mid_row = plan.partition(WorkerId(0)).unwrap();
        mid_row.start += 1;
        assert_eq!(
            validate_partition_bounds(&mid_row, &shape),
            Err(RowsumError::UnevenPartition)
        );
    }
}
