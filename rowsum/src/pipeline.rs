//! Two-phase run: generate the dataset, then aggregate it
//!
//! Generation runs on its own thread and is joined before the dataset is
//! reopened for reading, so the phases never overlap.

use crate::cancel::CancelToken;
use crate::config::{ReadMode, RunConfig};
use crate::coordinator::{AggregateReport, Coordinator};
use crate::dataset::{DatasetSource, GenerationReport, Generator};
use crate::error::{Error, Result};
use crate::worker::WorkerReport;
use rowsum_core::{DatasetShape, PartitionPlan};
use std::thread;
use tracing::info;

/// Everything a completed run produced
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    pub shape: DatasetShape,
    pub workers: usize,
    pub read_mode: ReadMode,
    /// Sum computed by the generator while writing
    pub generated_sum: i64,
    /// Sum reduced from the workers' partial sums
    pub aggregated_sum: i64,
    pub worker_reports: Vec<WorkerReport>,
}

impl RunReport {
    /// Cross-check the two sums; a mismatch is an error
    pub fn new(
        plan: &PartitionPlan,
        read_mode: ReadMode,
        generated: GenerationReport,
        aggregated: AggregateReport,
    ) -> Result<Self> {
        if generated.sum != aggregated.total {
            return Err(Error::SumMismatch {
                generated: generated.sum,
                aggregated: aggregated.total,
            });
        }
        Ok(Self {
            shape: plan.shape(),
            workers: plan.workers(),
            read_mode,
            generated_sum: generated.sum,
            aggregated_sum: aggregated.total,
            worker_reports: aggregated.workers,
        })
    }
}

/// One configured run, phase by phase
pub struct Pipeline {
    config: RunConfig,
    shape: DatasetShape,
    plan: rowsum_core::Result<PartitionPlan>,
    token: CancelToken,
}

impl Pipeline {
    /// Validate `config` up front; an uneven partition never reaches a worker
    pub fn new(config: RunConfig, token: CancelToken) -> Result<Self> {
        let plan = config.plan()?;
        Ok(Self {
            config,
            shape: plan.shape(),
            plan: Ok(plan),
            token,
        })
    }

    /// Validate only the shape; the worker count is checked if and when
    /// [`aggregate`](Self::aggregate) runs
    pub fn generation_only(config: RunConfig, token: CancelToken) -> Result<Self> {
        let shape = config.shape()?;
        let plan = config.plan();
        Ok(Self {
            config,
            shape,
            plan,
            token,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn shape(&self) -> DatasetShape {
        self.shape
    }

    pub fn plan(&self) -> Result<PartitionPlan> {
        Ok(self.plan?)
    }

    /// Phase one: write the dataset on a generator thread and wait for it
    pub fn generate(&self) -> Result<GenerationReport> {
        let generator = Generator::new(self.shape).with_seed(self.config.seed);
        let path = self.config.path.clone();
        let token = self.token.clone();

        let handle = thread::Builder::new()
            .name("generator".into())
            .spawn(move || generator.generate(path, &token))
            .map_err(|source| Error::Spawn {
                name: "generator".into(),
                source,
            })?;
        let report = handle.join().map_err(|_| Error::Join {
            name: "generator".into(),
        })??;

        info!(sum = report.sum, elements = report.elements, "generation complete");
        Ok(report)
    }

    /// Optional delay between the phases; interruptible
    pub fn pause(&self) -> Result<()> {
        self.token.sleep(self.config.pause())
    }

    /// Phase two: partition the dataset across the worker pool
    pub fn aggregate(&self) -> Result<AggregateReport> {
        let plan = self.plan()?;
        let source = DatasetSource::open(&self.config.path, &self.shape, self.config.read_mode)?;
        let report = Coordinator::new(plan, &source).run(&self.token)?;
        info!(total = report.total, "aggregation complete");
        Ok(report)
    }

    /// Combine both phases' results
    pub fn finish(&self, generated: GenerationReport, aggregated: AggregateReport) -> Result<RunReport> {
        RunReport::new(&self.plan()?, self.config.read_mode, generated, aggregated)
    }

    /// Run generation, pause and aggregation back to back
    pub fn run(&self) -> Result<RunReport> {
        let generated = self.generate()?;
        self.pause()?;
        let aggregated = self.aggregate()?;
        self.finish(generated, aggregated)
    }
}
