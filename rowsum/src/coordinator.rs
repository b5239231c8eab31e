//! Worker pool coordinator
//!
//! Spawns one OS thread per partition, joins them all, and reduces their
//! partial sums on the calling thread. Workers share nothing mutable: each
//! returns its [`WorkerReport`] through its join handle.

use crate::cancel::CancelToken;
use crate::dataset::DatasetSource;
use crate::error::{Error, Result};
use crate::worker::{Worker, WorkerReport};
use rowsum_core::{reduce, validate_partition_bounds, PartitionPlan};
use std::io;
use std::thread::{self, Scope, ScopedJoinHandle};
use tracing::{debug, info, warn};

/// Combined result of every worker
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregateReport {
    /// Global sum of the dataset
    pub total: i64,
    /// Per-worker reports, in worker order
    pub workers: Vec<WorkerReport>,
}

impl AggregateReport {
    /// Reduce worker reports into a global total
    pub fn from_reports(mut workers: Vec<WorkerReport>) -> Self {
        let total = reduce(workers.iter().map(|report| report.partial_sum));
        workers.sort_by_key(|report| report.worker);
        Self { total, workers }
    }
}

type Handle<'scope> = (String, ScopedJoinHandle<'scope, Result<WorkerReport>>);

/// Starts one named worker thread inside a scope
trait SpawnWorker {
    fn spawn<'scope, 'env, F>(
        &mut self,
        scope: &'scope Scope<'scope, 'env>,
        name: &str,
        job: F,
    ) -> io::Result<ScopedJoinHandle<'scope, Result<WorkerReport>>>
    where
        F: FnOnce() -> Result<WorkerReport> + Send + 'scope;
}

/// Named OS threads from [`thread::Builder`]
struct OsThreads;

impl SpawnWorker for OsThreads {
    fn spawn<'scope, 'env, F>(
        &mut self,
        scope: &'scope Scope<'scope, 'env>,
        name: &str,
        job: F,
    ) -> io::Result<ScopedJoinHandle<'scope, Result<WorkerReport>>>
    where
        F: FnOnce() -> Result<WorkerReport> + Send + 'scope,
    {
        thread::Builder::new()
            .name(name.to_string())
            .spawn_scoped(scope, job)
    }
}

/// Fans a partition plan out over a fixed pool of threads
pub struct Coordinator<'a> {
    plan: PartitionPlan,
    source: &'a DatasetSource,
}

impl<'a> Coordinator<'a> {
    pub fn new(plan: PartitionPlan, source: &'a DatasetSource) -> Self {
        Self { plan, source }
    }

    /// Run every worker to completion and reduce their sums
    ///
    /// A spawn failure cancels `token` so already-running workers stop at
    /// their next safe point; the run then fails. A failing worker cancels
    /// its peers the same way.
    pub fn run(&self, token: &CancelToken) -> Result<AggregateReport> {
        self.run_with(token, &mut OsThreads)
    }

    fn run_with<S: SpawnWorker>(
        &self,
        token: &CancelToken,
        spawner: &mut S,
    ) -> Result<AggregateReport> {
        info!(
            workers = self.plan.workers(),
            rows_per_worker = self.plan.rows_per_worker(),
            mode = ?self.source.mode(),
            "starting workers"
        );

        let dataset = self.source;
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.plan.workers());
            for partition in self.plan.partitions() {
                if let Err(err) = validate_partition_bounds(&partition, &self.plan.shape()) {
                    token.cancel();
                    let _ = Self::join_all(handles);
                    return Err(Error::from(err));
                }
                let worker = Worker::new(partition);
                let name = format!("worker-{}", worker.id());
                let job = move || {
                    let result = worker.run(dataset, token);
                    if result.is_err() {
                        token.cancel();
                    }
                    result
                };
                match spawner.spawn(scope, &name, job) {
                    Ok(handle) => handles.push((name, handle)),
                    Err(source) => {
                        warn!(%name, error = %source, "spawn failed, cancelling pool");
                        token.cancel();
                        // Drain what already started; the spawn error wins.
                        let _ = Self::join_all(handles);
                        return Err(Error::Spawn { name, source });
                    }
                }
            }
            Self::join_all(handles).map(AggregateReport::from_reports)
        })
    }

    /// Join every handle, keeping the most informative error
    ///
    /// Peers of a failed worker report `Aborted`; the original failure is
    /// preferred over those.
    fn join_all(handles: Vec<Handle<'_>>) -> Result<Vec<WorkerReport>> {
        let mut reports = Vec::with_capacity(handles.len());
        let mut failure: Option<Error> = None;

        for (name, handle) in handles {
            let outcome = handle.join().unwrap_or_else(|_| Err(Error::Join { name: name.clone() }));
            match outcome {
                Ok(report) => {
                    debug!(%name, rows = report.rows, partial_sum = report.partial_sum, "joined");
                    reports.push(report);
                }
                Err(err) => {
                    let replace = match &failure {
                        None => true,
                        Some(Error::Aborted) => !matches!(err, Error::Aborted),
                        Some(_) => false,
                    };
                    if replace {
                        failure = Some(err);
                    }
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(reports),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReadMode;
    use crate::dataset::Generator;
    use rowsum_core::{DatasetShape, WorkerId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn generated(shape: DatasetShape, seed: u64) -> (tempfile::TempDir, std::path::PathBuf, i64) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let report = Generator::new(shape)
            .with_seed(Some(seed))
            .generate(&path, &CancelToken::new())
            .unwrap();
        (dir, path, report.sum)
    }

    #[test]
    fn test_aggregate_matches_generated_sum() {
        let shape = DatasetShape::default();
        let plan = PartitionPlan::new(shape, 4).unwrap();
        for seed in 0..8 {
            let (_dir, path, expected) = generated(shape, seed);
            let source = DatasetSource::open(&path, &shape, ReadMode::Positioned).unwrap();
            let report = Coordinator::new(plan, &source)
                .run(&CancelToken::new())
                .unwrap();

            assert_eq!(report.total, expected);
            assert_eq!(report.workers.len(), 4);
            for (index, worker) in report.workers.iter().enumerate() {
                assert_eq!(worker.worker, WorkerId(index));
                assert_eq!(worker.rows, 25);
                assert_eq!(worker.elements, 1250);
            }
        }
    }

    #[test]
    fn test_read_modes_agree() {
        let shape = DatasetShape::new(40, 16).unwrap();
        let plan = PartitionPlan::new(shape, 8).unwrap();
        let (_dir, path, expected) = generated(shape, 7);

        let mut modes = vec![ReadMode::Positioned, ReadMode::SharedCursor];
        #[cfg(feature = "mmap")]
        modes.push(ReadMode::Mmap);

        let mut reports = Vec::new();
        for mode in modes {
            let source = DatasetSource::open(&path, &shape, mode).unwrap();
            let report = Coordinator::new(plan, &source)
                .run(&CancelToken::new())
                .unwrap();
            assert_eq!(report.total, expected, "{mode:?}");
            reports.push(report);
        }
        assert!(reports.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_merge_order_does_not_matter() {
        let shape = DatasetShape::default();
        let plan = PartitionPlan::new(shape, 4).unwrap();
        let (_dir, path, expected) = generated(shape, 3);
        let source = DatasetSource::open(&path, &shape, ReadMode::Positioned).unwrap();
        let reports = Coordinator::new(plan, &source)
            .run(&CancelToken::new())
            .unwrap()
            .workers;

        for order in [[3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]] {
            let permuted: Vec<WorkerReport> = order.iter().map(|&i| reports[i].clone()).collect();
            let report = AggregateReport::from_reports(permuted);
            assert_eq!(report.total, expected);
            assert_eq!(report.workers, reports);
        }
    }

    #[test]
    fn test_cancelled_pool_aborts() {
        let shape = DatasetShape::default();
        let plan = PartitionPlan::new(shape, 4).unwrap();
        let (_dir, path, _) = generated(shape, 1);
        let source = DatasetSource::open(&path, &shape, ReadMode::Positioned).unwrap();
        let token = CancelToken::new();
        token.cancel();

        let result = Coordinator::new(plan, &source).run(&token);
        assert!(matches!(result, Err(Error::Aborted)));
    }

    #[test]
    fn test_join_prefers_real_failure() {
        thread::scope(|scope| {
            let aborted = scope.spawn(|| -> Result<WorkerReport> { Err(Error::Aborted) });
            let failed = scope.spawn(|| -> Result<WorkerReport> {
                Err(Error::io(
                    "reading the file",
                    std::io::ErrorKind::UnexpectedEof.into(),
                ))
            });
            let ok = scope.spawn(|| -> Result<WorkerReport> {
                Ok(WorkerReport {
                    worker: WorkerId(2),
                    partial_sum: 1,
                    elements: 1,
                    rows: 1,
                })
            });
            let handles = vec![
                ("worker-1".to_string(), aborted),
                ("worker-2".to_string(), failed),
                ("worker-3".to_string(), ok),
            ];
            let result = Coordinator::join_all(handles);
            assert!(matches!(result, Err(Error::Io { op: "reading the file", .. })));
        });
    }

    #[test]
    fn test_join_reports_panics() {
        thread::scope(|scope| {
            let panicked = scope.spawn(|| -> Result<WorkerReport> { panic!("worker blew up") });
            let result = Coordinator::join_all(vec![("worker-1".to_string(), panicked)]);
            assert!(matches!(result, Err(Error::Join { ref name }) if name == "worker-1"));
        });
    }

    /// Spawns real threads until `fail_at`, then refuses
    struct FailingSpawner {
        fail_at: usize,
        attempts: usize,
        finished: Arc<AtomicUsize>,
    }

    impl SpawnWorker for FailingSpawner {
        fn spawn<'scope, 'env, F>(
            &mut self,
            scope: &'scope Scope<'scope, 'env>,
            name: &str,
            job: F,
        ) -> io::Result<ScopedJoinHandle<'scope, Result<WorkerReport>>>
        where
            F: FnOnce() -> Result<WorkerReport> + Send + 'scope,
        {
            self.attempts += 1;
            if self.attempts == self.fail_at {
                return Err(io::Error::new(io::ErrorKind::WouldBlock, "no more threads"));
            }
            let finished = Arc::clone(&self.finished);
            OsThreads.spawn(scope, name, move || {
                let result = job();
                finished.fetch_add(1, Ordering::SeqCst);
                result
            })
        }
    }

    #[test]
    fn test_spawn_failure_cancels_and_drains_pool() {
        let shape = DatasetShape::default();
        let plan = PartitionPlan::new(shape, 4).unwrap();
        let (_dir, path, _) = generated(shape, 2);
        let source = DatasetSource::open(&path, &shape, ReadMode::Positioned).unwrap();
        let token = CancelToken::new();
        let mut spawner = FailingSpawner {
            fail_at: 3,
            attempts: 0,
            finished: Arc::new(AtomicUsize::new(0)),
        };

        let result = Coordinator::new(plan, &source).run_with(&token, &mut spawner);

        assert!(matches!(result, Err(Error::Spawn { ref name, .. }) if name == "worker-3"));
        assert!(token.is_cancelled());
        assert_eq!(spawner.attempts, 3);
        assert_eq!(spawner.finished.load(Ordering::SeqCst), 2);
    }
}
