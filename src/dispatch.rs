//! Fixed-size worker pool for parallel stepping
//!
//! Sized once at world construction and reused for every step. The solver's
//! `parallel` feature picks up whatever rayon pool is installed around the
//! step call, so broad-phase, narrow-phase and island solving all run on
//! these workers.

use std::num::NonZeroUsize;

use crate::error::PhysicsError;

/// Worker pool used by the solver within one step
#[derive(Debug)]
pub struct StepDispatcher {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl StepDispatcher {
    /// Build a pool with exactly `workers` threads
    pub fn new(workers: usize) -> Result<Self, PhysicsError> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("physics-worker-{i}"))
            .build()
            .map_err(|e| PhysicsError::WorkerPool(e.to_string()))?;

        log::debug!("Step dispatcher created with {workers} workers");
        Ok(Self { pool, workers })
    }

    /// Build a pool sized for the host, leaving cores for the rest of the
    /// application
    pub fn sized_for_host() -> Result<Self, PhysicsError> {
        Self::new(recommended_worker_count())
    }

    /// Number of worker threads in the pool
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `op` inside the pool, blocking until it returns
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }

    /// Run `jobs` independent jobs in parallel, blocking until all complete.
    ///
    /// Jobs must not depend on each other's output within the same dispatch.
    pub fn run(&self, jobs: usize, job: impl Fn(usize) + Sync) {
        self.pool.install(|| {
            rayon::scope(|scope| {
                let job = &job;
                for index in 0..jobs {
                    scope.spawn(move |_| job(index));
                }
            });
        });
    }
}

/// Worker count for this host: all cores minus a reserve for the caller's
/// render/audio/input threads, never less than one
#[must_use]
pub fn recommended_worker_count() -> usize {
    let cores = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    worker_count_for(cores)
}

fn worker_count_for(cores: usize) -> usize {
    let reserved = if cores > 4 { 2 } else { 1 };
    cores.saturating_sub(reserved).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_worker_count_reserves_cores() {
        assert_eq!(worker_count_for(1), 1);
        assert_eq!(worker_count_for(2), 1);
        assert_eq!(worker_count_for(4), 3);
        assert_eq!(worker_count_for(8), 6);
        assert_eq!(worker_count_for(16), 14);
    }

    #[test]
    fn test_install_runs_on_pool() {
        let dispatcher = StepDispatcher::new(2).unwrap();
        assert_eq!(dispatcher.workers(), 2);

        let result = dispatcher.install(|| 21 * 2);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_run_completes_all_jobs() {
        let dispatcher = StepDispatcher::new(3).unwrap();
        let counter = AtomicUsize::new(0);

        dispatcher.run(64, |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        assert_eq!(counter.load(Ordering::Relaxed), 64);
    }

    #[test]
    fn test_zero_workers_clamped_to_one() {
        let dispatcher = StepDispatcher::new(0).unwrap();
        assert_eq!(dispatcher.workers(), 1);
    }
}
