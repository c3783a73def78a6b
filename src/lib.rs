// Lazy-Pool: allocation free thread pool with batch scheduling
// - Threads are spawned lazily, at most one per schedule call
// - Tasks are intrusive nodes owned by the caller, the pool never allocates
//   on the submission or execution path
// - Batches concatenate in O(1) and are submitted as one operation
// - Dropping the pool drains the queue and waits for every worker to exit
//
// Safety
// Tasks are linked by raw pointer. When scheduling borrowed tasks you must
// ensure:
// - Task structs live, unmoved, until their work function has returned
// - Nothing else touches a task while the pool holds it
// - No data races in your work functions
mod config;
mod error;
mod macros;
mod pool;
mod queue;
mod task;
mod task_batch;
mod worker;

pub use config::{Config, DEFAULT_STACK_SIZE, DEFAULT_THREADS_MAX, DEFAULT_THREAD_NAME};
pub use error::ScheduleError;
pub use pool::ThreadPool;
pub use task::{Task, WorkFn};
pub use task_batch::Batch;

// work function signature, receives the task that triggered it
pub type TaskFn = fn(*const Task);

// convenience function to create a pool with the default configuration
pub fn new() -> ThreadPool {
    ThreadPool::new(Config::default())
}

// create a pool bounded to `threads_max` workers
pub fn with_max_threads(threads_max: usize) -> ThreadPool {
    ThreadPool::new(Config::new().with_threads_max(threads_max))
}
