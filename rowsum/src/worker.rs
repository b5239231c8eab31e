//! Partition worker: sums one contiguous range of rows

use crate::cancel::CancelToken;
use crate::dataset::DatasetSource;
use crate::error::{Error, Result};
use rowsum_core::{Partition, PartitionProcessor, PositionedSource, SumProcessor, WorkerId};
use std::io;
use tracing::debug;

/// Outcome of one worker's pass over its partition
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkerReport {
    pub worker: WorkerId,
    pub partial_sum: i64,
    pub elements: usize,
    pub rows: usize,
}

/// One member of the pool, bound to its partition for its whole life
#[derive(Debug, Clone)]
pub struct Worker {
    partition: Partition,
}

impl Worker {
    pub fn new(partition: Partition) -> Self {
        Self { partition }
    }

    pub fn id(&self) -> WorkerId {
        self.partition.worker
    }

    /// Read the partition one row at a time and sum it
    ///
    /// Checks `token` after every read. Any read error is fatal for the run.
    pub fn run(&self, source: &DatasetSource, token: &CancelToken) -> Result<WorkerReport> {
        debug!(
            worker = %self.id(),
            offset = self.partition.byte_offset(),
            elements = self.partition.len,
            "worker started"
        );

        let processor = SumProcessor::new(self.partition.columns);
        let partial = match source {
            DatasetSource::SharedCursor(shared) => {
                // Seek and the whole read loop happen under one lock.
                let mut cursor = shared
                    .lock_at(self.partition.byte_offset())
                    .map_err(|e| Error::io("using lseek", e))?;
                self.read_rows(processor, token, |buf, _| cursor.read_next(buf))?
            }
            _ => self.read_rows(processor, token, |buf, offset| {
                source.read_exact_at(buf, offset)
            })?,
        };

        debug!(worker = %self.id(), partial_sum = partial.sum, "worker finished");
        Ok(WorkerReport {
            worker: self.id(),
            partial_sum: partial.sum,
            elements: partial.elements,
            rows: partial.rows,
        })
    }

    fn read_rows<P, F>(&self, mut processor: P, token: &CancelToken, mut read: F) -> Result<P::Output>
    where
        P: PartitionProcessor,
        F: FnMut(&mut [u8], u64) -> io::Result<()>,
    {
        let row_bytes = self.partition.columns * rowsum_core::ELEMENT_SIZE;
        let first_row = self.partition.first_row();
        let mut buf = vec![0u8; row_bytes];

        for row in 0..self.partition.rows() {
            let offset = self.partition.byte_offset() + (row * row_bytes) as u64;
            read(&mut buf, offset).map_err(|e| Error::io("reading the file", e))?;
            processor.process_block(&buf, first_row + row)?;
            token.checkpoint()?;
        }

        Ok(processor.finalize())
    }
}
