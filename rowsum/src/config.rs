//! Run configuration

use rowsum_core::format::constants::DEFAULT_WORKERS;
use rowsum_core::{DatasetShape, PartitionPlan};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default dataset location, relative to the working directory
pub const DEFAULT_DATASET_PATH: &str = "data.bin";

/// How workers read their partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ReadMode {
    /// Independent positioned reads on one shared file, no lock
    #[default]
    Positioned,
    /// Copy rows out of a shared read-only memory map
    #[cfg(feature = "mmap")]
    Mmap,
    /// One seekable cursor behind a mutex, held for a worker's whole range
    SharedCursor,
}

/// Configuration for one generate/aggregate run
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Dataset file, recreated by every generation
    pub path: PathBuf,
    pub shape: DatasetShape,
    /// Worker pool size; must divide `shape.rows`
    pub workers: usize,
    /// RNG seed for reproducible datasets
    pub seed: Option<u64>,
    pub read_mode: ReadMode,
    /// Delay between generation and aggregation, in seconds
    pub pause_secs: u64,
}

impl RunConfig {
    /// Set dataset path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// Set dataset shape
    pub fn with_shape(mut self, shape: DatasetShape) -> Self {
        self.shape = shape;
        self
    }

    /// Set worker pool size
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Seed the generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set partition read strategy
    pub fn with_read_mode(mut self, read_mode: ReadMode) -> Self {
        self.read_mode = read_mode;
        self
    }

    /// Set the delay before aggregation starts
    pub fn with_pause_secs(mut self, pause_secs: u64) -> Self {
        self.pause_secs = pause_secs;
        self
    }

    pub fn pause(&self) -> Duration {
        Duration::from_secs(self.pause_secs)
    }

    /// Validate the shape alone; generation needs nothing more
    pub fn shape(&self) -> rowsum_core::Result<DatasetShape> {
        DatasetShape::new(self.shape.rows, self.shape.columns)
    }

    /// Validate shape and worker count into a partition plan
    pub fn plan(&self) -> rowsum_core::Result<PartitionPlan> {
        PartitionPlan::new(self.shape()?, self.workers)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATASET_PATH),
            shape: DatasetShape::default(),
            workers: DEFAULT_WORKERS,
            seed: None,
            read_mode: ReadMode::default(),
            pause_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowsum_core::RowsumError;

    #[test]
    fn test_default_config_plan() {
        let plan = RunConfig::default().plan().unwrap();
        assert_eq!(plan.workers(), 4);
        assert_eq!(plan.rows_per_worker(), 25);
        assert_eq!(plan.elements_per_worker(), 1250);
    }

    #[test]
    fn test_config_rejects_bad_plans() {
        let config = RunConfig::default().with_workers(3);
        assert_eq!(config.plan(), Err(RowsumError::UnevenPartition));

        let config = RunConfig::default().with_workers(0);
        assert_eq!(config.plan(), Err(RowsumError::ZeroWorkers));

        let mut config = RunConfig::default();
        config.shape.columns = 0;
        assert_eq!(config.plan(), Err(RowsumError::ZeroColumns));
        assert_eq!(config.shape(), Err(RowsumError::ZeroColumns));
    }

    #[test]
    fn test_shape_ignores_worker_count() {
        let config = RunConfig::default().with_workers(3);
        assert_eq!(config.shape(), Ok(DatasetShape::default()));
    }

    #[test]
    fn test_builder() {
        let config = RunConfig::default()
            .with_path("/tmp/x.bin")
            .with_shape(DatasetShape::new(6, 3).unwrap())
            .with_workers(2)
            .with_seed(9)
            .with_read_mode(ReadMode::SharedCursor)
            .with_pause_secs(2);
        assert_eq!(config.path, PathBuf::from("/tmp/x.bin"));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.pause(), Duration::from_secs(2));
        assert_eq!(config.plan().unwrap().rows_per_worker(), 3);
    }
}
