//! rowsum - partitioned multi-threaded aggregation over a binary dataset
//!
//! One phase writes `rows x columns` random integers to a flat binary file;
//! the next splits the file into equal runs of rows, sums each run on its own
//! thread with positioned reads, and reduces the partial sums.
//!
//! ## Architecture
//!
//! - **rowsum-core**: dataset layout, partition plan, validation (no I/O)
//! - **rowsum**: generator, read sources, workers, coordinator, interrupts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rowsum::{CancelToken, Pipeline, RunConfig};
//!
//! fn example() -> rowsum::Result<()> {
//!     let config = RunConfig::default().with_path("data.bin").with_seed(7);
//!     let report = Pipeline::new(config, CancelToken::new())?.run()?;
//!     for worker in &report.worker_reports {
//!         println!("Thread {} read {} lines.", worker.worker, worker.rows);
//!     }
//!     println!("total = {}", report.aggregated_sum);
//!     Ok(())
//! }
//! ```

// Re-export core layout definitions
pub use rowsum_core::{
    DatasetShape, Element, Partition, PartitionPlan, RowsumError, WorkerId, ELEMENT_SIZE,
};

pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod dataset;
pub mod error;
pub mod interrupt;
pub mod logging;
pub mod pipeline;
pub mod worker;

pub use cancel::CancelToken;
pub use config::{ReadMode, RunConfig};
pub use coordinator::{AggregateReport, Coordinator};
pub use dataset::{DatasetSource, GenerationReport, Generator};
pub use error::{Error, Result};
pub use interrupt::{ControlEvent, ControlOutcome, Decision, InterruptController};
pub use pipeline::{Pipeline, RunReport};
pub use worker::{Worker, WorkerReport};
