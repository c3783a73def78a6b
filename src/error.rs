use std::io;

/// Error returned by [`ThreadPool::schedule`](crate::ThreadPool::schedule).
///
/// The batch is enqueued even when this is returned: the pool could not add
/// capacity, no work was lost. Existing or future workers will run it.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Spawning a worker thread failed.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

impl ScheduleError {
    /// Negated platform error number, `-1` when the platform did not give one.
    pub fn code(&self) -> i32 {
        match self {
            ScheduleError::Spawn(err) => err.raw_os_error().map_or(-1, |errno| -errno),
        }
    }
}
