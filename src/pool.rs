// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A fixed-size pool of scoped worker threads.  The controlling thread
//! pushes every task into a channel and closes it; workers pull tasks
//! until the channel runs dry.  The end of the scope is the only
//! synchronization point, so by the time `run` returns every task has
//! finished and every borrow it held has been released.
//!
//! Tasks are expected to carry exclusive `&mut` slices of whatever they
//! write, which is why nothing here needs a lock on the data.

use crate::error::{RenderError, Result};
use crossbeam::channel;

/// Upper bound on the default worker count.
pub const DEFAULT_WORKER_CAP: usize = 16;

/// How many workers to run and how many image rows make up one task.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TaskPool {
    workers: usize,
    rows_per_task: usize,
}

impl TaskPool {
    /// Both values must be positive.
    pub fn new(workers: usize, rows_per_task: usize) -> Result<TaskPool> {
        if workers == 0 {
            return Err(RenderError::InvalidWorkers(
                "at least one worker is required".to_string(),
            ));
        }
        if rows_per_task == 0 {
            return Err(RenderError::InvalidWorkers(
                "a task must cover at least one row".to_string(),
            ));
        }
        Ok(TaskPool {
            workers,
            rows_per_task,
        })
    }

    /// One worker, one row per task.
    pub fn single() -> TaskPool {
        TaskPool {
            workers: 1,
            rows_per_task: 1,
        }
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Rows handed to each task.
    pub fn rows_per_task(&self) -> usize {
        self.rows_per_task
    }

    /// Run `work` over every task and wait for all of them.  Tasks run
    /// in no particular order.  If any worker panics the remaining
    /// tasks are abandoned and `WorkerPanic` is returned.
    pub fn run<T, F>(&self, tasks: Vec<T>, work: F) -> Result<()>
    where
        T: Send,
        F: Fn(T) + Sync,
    {
        if tasks.is_empty() {
            return Ok(());
        }
        let workers = self.workers.min(tasks.len());
        let (sender, receiver) = channel::unbounded::<T>();
        let work = &work;

        crossbeam::scope(|spawner| {
            for _ in 0..workers {
                let receiver = receiver.clone();
                spawner.spawn(move |_| {
                    for task in receiver.iter() {
                        work(task);
                    }
                });
            }
            for task in tasks {
                if sender.send(task).is_err() {
                    break;
                }
            }
            drop(sender);
        })
        .map_err(|_| RenderError::WorkerPanic)
    }
}

impl Default for TaskPool {
    /// One worker per core, up to `DEFAULT_WORKER_CAP`, one row per task.
    fn default() -> TaskPool {
        TaskPool {
            workers: num_cpus::get().max(1).min(DEFAULT_WORKER_CAP),
            rows_per_task: 1,
        }
    }
}
