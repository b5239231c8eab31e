//! Deterministic partitioning of a dataset across a fixed worker pool
//!
//! Every worker receives one contiguous run of whole rows. With `rows`
//! divisible by `workers`, worker `i` covers elements
//! `i * columns * (rows / workers)` up to the next worker's start, so the
//! partitions tile the dataset exactly once.

use crate::format::{DatasetShape, ELEMENT_SIZE};
use crate::{Result, RowsumError};
use core::ops::Range;

/// Identity of one worker in the pool (zero-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkerId(pub usize);

impl WorkerId {
    /// Zero-based index
    pub const fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for WorkerId {
    // Humans count workers from one.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

/// Contiguous element range owned by exactly one worker
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Partition {
    pub worker: WorkerId,
    /// Index of the first element
    pub start: usize,
    /// Number of elements
    pub len: usize,
    /// Elements per row in the owning dataset
    pub columns: usize,
}

impl Partition {
    /// Element index range `[start, start + len)`
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Offset of the first byte within the dataset
    pub const fn byte_offset(&self) -> u64 {
        (self.start * ELEMENT_SIZE) as u64
    }

    /// Number of bytes covered
    pub const fn byte_len(&self) -> usize {
        self.len * ELEMENT_SIZE
    }

    /// Number of whole rows covered
    pub const fn rows(&self) -> usize {
        self.len / self.columns
    }

    /// Index of the first row covered
    pub const fn first_row(&self) -> usize {
        self.start / self.columns
    }
}

/// Validated pairing of a dataset shape and a worker count
///
/// Construction checks the shape and `rows % workers == 0` once; after that
/// every partition lookup is infallible for in-range workers. Deserialized
/// plans go through the same checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "PlanParts"))]
pub struct PartitionPlan {
    shape: DatasetShape,
    workers: usize,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct PlanParts {
    shape: DatasetShape,
    workers: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<PlanParts> for PartitionPlan {
    type Error = RowsumError;

    fn try_from(parts: PlanParts) -> Result<Self> {
        Self::new(parts.shape, parts.workers)
    }
}

impl PartitionPlan {
    pub const fn new(shape: DatasetShape, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(RowsumError::ZeroWorkers);
        }
        // Shape fields are public, so re-run its checks here.
        let shape = match DatasetShape::new(shape.rows, shape.columns) {
            Ok(shape) => shape,
            Err(err) => return Err(err),
        };
        if shape.rows % workers != 0 {
            return Err(RowsumError::UnevenPartition);
        }
        Ok(Self { shape, workers })
    }

    pub const fn shape(&self) -> DatasetShape {
        self.shape
    }

    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Rows assigned to each worker
    pub const fn rows_per_worker(&self) -> usize {
        self.shape.rows / self.workers
    }

    /// Elements assigned to each worker
    pub const fn elements_per_worker(&self) -> usize {
        self.shape.columns * self.rows_per_worker()
    }

    /// Partition owned by `worker`
    pub fn partition(&self, worker: WorkerId) -> Result<Partition> {
        if worker.index() >= self.workers {
            return Err(RowsumError::WorkerOutOfRange);
        }
        let len = self.elements_per_worker();
        Ok(Partition {
            worker,
            start: worker.index() * len,
            len,
            columns: self.shape.columns,
        })
    }

    /// All partitions in worker order
    pub fn partitions(&self) -> impl Iterator<Item = Partition> + '_ {
        let len = self.elements_per_worker();
        (0..self.workers).map(move |index| Partition {
            worker: WorkerId(index),
            start: index * len,
            len,
            columns: self.shape.columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_plan() -> PartitionPlan {
        PartitionPlan::new(DatasetShape::default(), 4).unwrap()
    }

    #[test]
    fn test_partition_ranges() {
        let plan = default_plan();
        let mut ranges = [0..0, 0..0, 0..0, 0..0];
        for (slot, partition) in ranges.iter_mut().zip(plan.partitions()) {
            *slot = partition.range();
        }
        assert_eq!(ranges, [0..1250, 1250..2500, 2500..3750, 3750..5000]);
    }

    #[test]
    fn test_partitions_tile_dataset() {
        for (rows, columns, workers) in [(100, 50, 4), (12, 7, 3), (9, 1, 9), (5, 3, 1)] {
            let shape = DatasetShape::new(rows, columns).unwrap();
            let plan = PartitionPlan::new(shape, workers).unwrap();
            let mut next = 0;
            for partition in plan.partitions() {
                assert_eq!(partition.start, next);
                assert_eq!(partition.rows(), rows / workers);
                next = partition.range().end;
            }
            assert_eq!(next, shape.element_count());
        }
    }

    #[test]
    fn test_partition_bytes() {
        let plan = default_plan();
        let third = plan.partition(WorkerId(2)).unwrap();
        assert_eq!(third.byte_offset(), 2500 * 4);
        assert_eq!(third.byte_len(), 1250 * 4);
        assert_eq!(third.rows(), 25);
        assert_eq!(third.first_row(), 50);
        assert_eq!(
            plan.partition(WorkerId(4)),
            Err(RowsumError::WorkerOutOfRange)
        );
    }

    #[test]
    fn test_plan_rejects_uneven_partition() {
        let shape = DatasetShape::new(100, 50).unwrap();
        assert_eq!(
            PartitionPlan::new(shape, 3),
            Err(RowsumError::UnevenPartition)
        );
        assert_eq!(PartitionPlan::new(shape, 0), Err(RowsumError::ZeroWorkers));
        assert_eq!(
            PartitionPlan::new(DatasetShape { rows: 0, columns: 5 }, 1),
            Err(RowsumError::ZeroRows)
        );
    }

    #[test]
    fn test_plan_rejects_overflowing_shape() {
        let shape = DatasetShape {
            rows: usize::MAX,
            columns: 1,
        };
        assert_eq!(
            PartitionPlan::new(shape, 1),
            Err(RowsumError::ShapeOverflow)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialized_plan_is_validated() {
        let plan: PartitionPlan =
            serde_json::from_str(r#"{"shape":{"rows":100,"columns":50},"workers":4}"#).unwrap();
        assert_eq!(plan, default_plan());

        for json in [
            r#"{"shape":{"rows":100,"columns":50},"workers":0}"#,
            r#"{"shape":{"rows":100,"columns":50},"workers":3}"#,
            r#"{"shape":{"rows":0,"columns":50},"workers":1}"#,
        ] {
            assert!(serde_json::from_str::<PartitionPlan>(json).is_err(), "{json}");
        }
    }

    #[test]
    fn test_worker_display_is_one_based() {
        use alloc::string::ToString;
        assert_eq!(WorkerId(0).to_string(), "1");
        assert_eq!(WorkerId(3).to_string(), "4");
    }
}
