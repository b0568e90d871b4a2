//! Fixed-size worker pool running independent, indexed tasks.
//!
//! Results land in a buffer pre-sized to the number of tasks, each task
//! writing only its own slot, so output order always matches input order.
//! Task failures and panics are captured per task and reported together
//! after every task has finished.

use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

pub struct TaskRunner {
    pool: ThreadPool,
    quiet: bool,
}

impl TaskRunner {
    /// Create a pool with `threads` workers (0 = available parallelism)
    pub fn new(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("fastibs-worker-{}", i))
            .build()
            .map_err(|e| Error::config(format!("Failed to initialize thread pool: {}", e)))?;
        Ok(Self { pool, quiet: true })
    }

    /// Show a progress bar on stderr while tasks run
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.quiet = !enabled;
        self
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `task(i, &items[i])` for every item and wait for all of them.
    ///
    /// Returns the results in item order, or `Error::Tasks` describing every
    /// failed task if any returned an error or panicked.
    pub fn run<T, R, F>(&self, label: &str, items: &[T], task: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> Result<R> + Sync,
    {
        let progress = self.progress_bar(label, items.len());

        let outcomes: Vec<Result<R>> = self.pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .map(|(i, item)| {
                    let outcome = catch_unwind(AssertUnwindSafe(|| task(i, item)))
                        .unwrap_or_else(|payload| {
                            Err(Error::Panic {
                                index: i,
                                message: panic_message(payload),
                            })
                        });
                    progress.inc(1);
                    outcome
                })
                .collect()
        });

        progress.finish_and_clear();
        collect_outcomes(outcomes)
    }

    fn progress_bar(&self, label: &str, len: usize) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::with_draw_target(Some(len as u64), ProgressDrawTarget::stderr());
        if let Ok(style) =
            ProgressStyle::default_bar().template("{msg} [{bar:40}] {pos}/{len} ({elapsed})")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.set_message(label.to_string());
        pb
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn collect_outcomes<R>(outcomes: Vec<Result<R>>) -> Result<Vec<R>> {
    let total = outcomes.len();
    let mut results = Vec::with_capacity(total);
    let mut first_error = None;
    let mut failed = 0;

    for outcome in outcomes {
        match outcome {
            Ok(r) => results.push(r),
            Err(e) => {
                failed += 1;
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        None => Ok(results),
        Some(first) => Err(Error::Tasks {
            failed,
            total,
            first: Box::new(first),
        }),
    }
}
