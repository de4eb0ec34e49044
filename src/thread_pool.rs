//! Worker pool sizing strategies for subdirectory aggregation.
//!
//! Each immediate subdirectory of a scanned folder is summed on a bounded
//! pool, one task per subdirectory.
//!
//! # Strategies
//! - `Fixed`: a fixed number of workers (default 16)
//! - `NumCpus`: one worker per logical CPU
//! - `IOHeavy`: 2x the CPU count, for slow or remote-backed disks

use anyhow::{Context, Result};
use clap::ValueEnum;

/// Default bound on concurrent subdirectory workers.
pub const DEFAULT_WORKERS: usize = 16;

/// Worker pool sizing strategies.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum WorkerStrategy {
    /// Use a fixed number of workers
    #[default]
    Fixed,
    /// One worker per logical CPU
    NumCpus,
    /// Optimized for I/O-heavy workloads (2x CPU count)
    IOHeavy,
}

impl WorkerStrategy {
    /// Returns a string representation of the strategy for display purposes.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStrategy::Fixed => "Fixed",
            WorkerStrategy::NumCpus => "NumCpus",
            WorkerStrategy::IOHeavy => "IOHeavy",
        }
    }

    /// Resolves the number of workers for this strategy.
    ///
    /// # Errors
    /// Fails if the `Fixed` strategy is given zero workers.
    pub fn resolve(&self, n_workers: usize) -> Result<usize> {
        match self {
            WorkerStrategy::Fixed => {
                if n_workers == 0 {
                    anyhow::bail!("Fixed strategy requires at least one worker");
                }
                Ok(n_workers)
            }
            WorkerStrategy::NumCpus => Ok(num_cpus::get().max(1)),
            WorkerStrategy::IOHeavy => Ok((num_cpus::get() * 2).max(1)),
        }
    }
}

/// Builds a dedicated pool with `workers` threads for one scan.
pub fn build_worker_pool(workers: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("sizetree-worker-{}", i))
        .build()
        .context("Failed to build worker pool")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_strategy_as_str() {
        assert_eq!(WorkerStrategy::Fixed.as_str(), "Fixed");
        assert_eq!(WorkerStrategy::NumCpus.as_str(), "NumCpus");
        assert_eq!(WorkerStrategy::IOHeavy.as_str(), "IOHeavy");
    }

    #[test]
    fn test_resolve_fixed() {
        assert_eq!(WorkerStrategy::Fixed.resolve(DEFAULT_WORKERS).unwrap(), 16);
        assert!(WorkerStrategy::Fixed.resolve(0).is_err());
    }

    #[test]
    fn test_resolve_cpu_based() {
        let cpus = num_cpus::get();
        assert_eq!(WorkerStrategy::NumCpus.resolve(0).unwrap(), cpus.max(1));
        assert_eq!(WorkerStrategy::IOHeavy.resolve(0).unwrap(), (cpus * 2).max(1));
    }

    #[test]
    fn test_build_worker_pool() {
        let pool = build_worker_pool(3).unwrap();
        assert_eq!(pool.current_num_threads(), 3);
    }
}
