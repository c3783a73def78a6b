use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ScheduleError;
use crate::queue::Queue;
use crate::task_batch::Batch;
use crate::worker;

/// A lazily growing pool of worker threads.
///
/// No thread exists until the first batch is scheduled. Each `schedule` call
/// spawns at most one worker, and only when no worker looked idle and the
/// `threads_max` limit is not reached.
///
/// Dropping the pool (or calling [`shutdown`](ThreadPool::shutdown)) blocks
/// until every task scheduled before it has run and every worker has exited.
pub struct ThreadPool {
    queue: Arc<Queue>,
}

impl ThreadPool {
    /// Creates a pool, no thread is spawned.
    pub fn new(config: Config) -> Self {
        let config = config.resolved();
        debug!(
            stack_size = config.stack_size,
            threads_max = config.threads_max,
            "thread pool initialized"
        );
        ThreadPool {
            queue: Arc::new(Queue::new(config)),
        }
    }

    /// Schedules a batch whose tasks live for the rest of the program.
    ///
    /// On error the batch is still queued, it will run on an existing or a
    /// later worker.
    pub fn schedule(&self, batch: Batch<'static>) -> Result<(), ScheduleError> {
        // Safety: 'static tasks outlive any worker
        unsafe { self.schedule_raw(batch) }
    }

    /// Schedules a batch of borrowed tasks.
    ///
    /// An empty batch is a no-op and never spawns a thread.
    ///
    /// # Safety
    /// Every task in `batch`, and whatever its work function reads through
    /// the task pointer, must stay alive, unmoved and untouched by the caller
    /// until that work function has returned. Shutting the pool down before
    /// the tasks go out of scope establishes this. The work function runs on
    /// a worker thread, so the data it reaches must be safe to use from
    /// there.
    pub unsafe fn schedule_raw(&self, batch: Batch<'_>) -> Result<(), ScheduleError> {
        if batch.is_empty() {
            return Ok(());
        }

        self.queue.push(unsafe { batch.detach() });

        let mut idle = self.queue.idle_threads();
        if idle == 0 && self.queue.reserve_thread() {
            if let Err(err) = worker::spawn_worker(&self.queue) {
                self.queue.release_thread();
                warn!(error = %err, "could not spawn worker, batch stays queued");
                return Err(ScheduleError::Spawn(err));
            }
            idle += 1;
        }

        if idle > 0 {
            self.queue.notify_one();
        }
        Ok(())
    }

    /// Waits for all scheduled work to finish and every worker to exit.
    pub fn shutdown(self) {
        drop(self);
    }

    pub fn threads_max(&self) -> usize {
        self.queue.config.threads_max
    }

    pub fn stack_size(&self) -> usize {
        self.queue.config.stack_size
    }

    /// Number of worker threads alive right now, an advisory snapshot.
    pub fn live_threads(&self) -> usize {
        self.queue.live_threads()
    }

    /// Number of workers blocked waiting for work, an advisory snapshot.
    pub fn idle_threads(&self) -> usize {
        self.queue.idle_threads()
    }

    /// Number of queued tasks that no worker has picked up yet.
    pub fn pending(&self) -> usize {
        self.queue.pending()
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        ThreadPool::new(Config::default())
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.queue.close();

        // workers are detached, spin until the last one has seen the flag
        // and drained the queue
        loop {
            if self.queue.live_threads() == 0 {
                let leftover = self.queue.pending();
                if leftover == 0 {
                    break;
                }
                // only reachable when work functions panicked and took
                // their workers down with them
                if self.queue.reserve_thread() {
                    if let Err(err) = worker::spawn_worker(&self.queue) {
                        self.queue.release_thread();
                        warn!(leftover, error = %err, "abandoning queued tasks at shutdown");
                        break;
                    }
                }
            }
            thread::yield_now();
        }
        debug!("thread pool shut down");
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("threads_max", &self.threads_max())
            .field("live_threads", &self.live_threads())
            .field("idle_threads", &self.idle_threads())
            .finish_non_exhaustive()
    }
}
