use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, warn};
use tokio::runtime::{Builder, Runtime};

use crate::error::LibraryError;

/// Fixed-size worker pool for per-file jobs.
///
/// Each job runs on tokio's blocking thread pool, capped at `workers`
/// threads. Results are collected as jobs finish, so a timed-out batch
/// still yields everything that completed in time.
#[derive(Debug)]
pub struct WorkerPool {
    runtime: Option<Runtime>,
    workers: usize,
}

/// What a batch produced before it finished or ran out of time
#[derive(Debug)]
pub struct PoolOutcome<T> {
    /// Results of completed jobs, in submission order
    pub results: Vec<T>,
    pub submitted: usize,
    pub completed: usize,
    pub timed_out: bool,
}

impl<T> PoolOutcome<T> {
    /// Jobs that were still running (or queued) when the batch returned
    pub fn pending(&self) -> usize {
        self.submitted.saturating_sub(self.completed)
    }
}

impl WorkerPool {
    /// Create a pool with `workers` threads (at least one)
    pub fn new(workers: usize) -> Result<Self, LibraryError> {
        let workers = workers.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers)
            .thread_name("tunejar-worker")
            .enable_all()
            .build()?;

        debug!("Started worker pool with {} threads", workers);
        Ok(Self {
            runtime: Some(runtime),
            workers,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `job` over every item, waiting at most `timeout` for the batch.
    ///
    /// `None` results are dropped. Jobs still running at the deadline keep
    /// going in the background but their results are discarded.
    pub fn run<I, T, F>(&self, items: Vec<I>, timeout: Duration, job: F) -> PoolOutcome<T>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(I) -> Option<T> + Send + Sync + 'static,
    {
        let submitted = items.len();
        let runtime = match &self.runtime {
            Some(runtime) => runtime,
            None => {
                return PoolOutcome {
                    results: Vec::new(),
                    submitted,
                    completed: 0,
                    timed_out: submitted > 0,
                }
            }
        };

        let job = Arc::new(job);
        let collected: Arc<Mutex<Vec<(usize, T)>>> = Arc::new(Mutex::new(Vec::with_capacity(submitted)));
        let completed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let job = Arc::clone(&job);
                let collected = Arc::clone(&collected);
                let completed = Arc::clone(&completed);
                runtime.spawn_blocking(move || {
                    if let Some(result) = (*job)(item) {
                        collected
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push((index, result));
                    }
                    completed.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        let all_done = async move {
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!("Worker job failed: {}", e);
                }
            }
        };
        let timed_out = runtime.block_on(async { tokio::time::timeout(timeout, all_done).await.is_err() });

        let mut results = std::mem::take(&mut *collected.lock().unwrap_or_else(PoisonError::into_inner));
        results.sort_by_key(|(index, _)| *index);

        let outcome = PoolOutcome {
            results: results.into_iter().map(|(_, result)| result).collect(),
            submitted,
            completed: completed.load(Ordering::SeqCst),
            timed_out,
        };

        if timed_out {
            warn!(
                "Batch timed out after {:?}: {} of {} jobs completed",
                timeout, outcome.completed, outcome.submitted
            );
        }
        outcome
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Worker count used when none is configured
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
