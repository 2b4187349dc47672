//! # Runtime
//!
//! Tokio runtime presets shared by the FarmHub binaries.
//!
//! The UI core is single-threaded and event-driven: UI callbacks, timers and remote calls
//! all interleave on one thread. [`RuntimeConfig::event_loop`] reproduces that model with a
//! current-thread scheduler. [`RuntimeConfig::background`] is a multi-threaded preset for
//! bulk sync jobs and tooling.
//!
//! ## Example
//!
//! ```rust,ignore
//! #[farm_runtime::main(event_loop)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use farm_derive::main;

use anyhow::anyhow;
use std::thread::available_parallelism;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const DEFAULT_WORKER_THREADS: usize = 4;
const MAX_WORKER_THREADS: usize = 256;
/// 2 `MiB` per worker.
const DEFAULT_STACK_SIZE: usize = 2 * 1024 * 1024;
const MIN_STACK_SIZE: usize = 512 * 1024;
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Scheduler flavor of the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Everything runs on the thread that calls `block_on`.
    CurrentThread,
    /// Work-stealing pool with `worker_threads` workers.
    MultiThread,
}

/// Configuration for a Tokio runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub flavor: Flavor,
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::event_loop()
    }
}

impl RuntimeConfig {
    /// Single-threaded preset matching the cooperative UI event loop.
    #[must_use]
    pub fn event_loop() -> Self {
        Self {
            flavor: Flavor::CurrentThread,
            worker_threads: 1,
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: "farm-ui".to_owned(),
            thread_keep_alive: Duration::from_secs(10),
        }
    }

    /// Multi-threaded preset for background synchronisation.
    #[must_use]
    pub fn background() -> Self {
        let workers = std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or_else(|| {
                available_parallelism().map_or(DEFAULT_WORKER_THREADS, std::num::NonZero::get)
            });

        Self {
            flavor: Flavor::MultiThread,
            worker_threads: workers.min(MAX_WORKER_THREADS),
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: "farm-sync".to_owned(),
            thread_keep_alive: Duration::from_secs(60),
        }
    }

    #[must_use = "Customize the number of worker threads for the runtime"]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }

    #[must_use = "Customize the stack size for worker threads"]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE);
        self
    }

    #[must_use = "Customize the thread name"]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.thread_name = name;
        }
        self
    }
}

/// Builds a Tokio runtime from `config`, with I/O and timers enabled.
///
/// # Errors
///
/// Returns an error if the OS refuses to create the runtime threads.
pub fn build_runtime(config: &RuntimeConfig) -> Result<Runtime> {
    debug!(config = ?config, "Building tokio runtime");

    let mut builder = match config.flavor {
        Flavor::CurrentThread => Builder::new_current_thread(),
        Flavor::MultiThread => {
            let mut builder = Builder::new_multi_thread();
            builder
                .worker_threads(config.worker_threads.clamp(1, MAX_WORKER_THREADS))
                .thread_keep_alive(config.thread_keep_alive);
            builder
        },
    };

    builder
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE))
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_loop_is_single_threaded() {
        let config = RuntimeConfig::default();
        assert_eq!(config.flavor, Flavor::CurrentThread);
        assert_eq!(config.worker_threads, 1);
    }

    #[test]
    fn builder_values_are_clamped() {
        let config = RuntimeConfig::background().with_worker_threads(0).with_stack_size(1);
        assert_eq!(config.worker_threads, 1);
        assert_eq!(config.stack_size, MIN_STACK_SIZE);

        let config = RuntimeConfig::background().with_worker_threads(10_000);
        assert_eq!(config.worker_threads, MAX_WORKER_THREADS);
    }

    #[test]
    fn blank_thread_name_is_ignored() {
        let config = RuntimeConfig::event_loop().with_thread_name("   ");
        assert_eq!(config.thread_name, "farm-ui");
    }

    #[test]
    fn current_thread_runtime_runs_futures() {
        let runtime = build_runtime(&RuntimeConfig::event_loop()).expect("runtime");
        let value = runtime.block_on(async { 21 * 2 });
        assert_eq!(value, 42);
    }
}
