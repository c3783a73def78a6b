use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crossbeam_utils::CachePadded;

use crate::config::Config;
use crate::task::Task;
use crate::task_batch::Batch;

// Two sources of truth live here. `state` under the mutex is authoritative:
// it alone decides whether there is work and whether workers must exit.
// `live` and `idle` are advisory snapshots read without the lock, only used
// to decide if spawning another worker is worthwhile. A stale read costs at
// most one thread too many or too few, the condvar still guarantees the queue
// is drained.
pub(crate) struct Queue {
    pub(crate) config: Config,
    live: CachePadded<AtomicUsize>,
    idle: CachePadded<AtomicUsize>,
    next_thread_id: AtomicUsize,
    state: Mutex<QueueState>,
    cond: Condvar,
}

pub(crate) struct QueueState {
    work: Batch<'static>,
    done: bool,
}

impl QueueState {
    #[inline]
    pub(crate) fn pop(&mut self) -> Option<NonNull<Task>> {
        self.work.pop()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.work.is_empty()
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done
    }
}

impl Queue {
    pub(crate) fn new(config: Config) -> Self {
        Queue {
            config,
            live: CachePadded::new(AtomicUsize::new(0)),
            idle: CachePadded::new(AtomicUsize::new(0)),
            next_thread_id: AtomicUsize::new(0),
            state: Mutex::new(QueueState {
                work: Batch::new(),
                done: false,
            }),
            cond: Condvar::new(),
        }
    }

    // work functions never run under this lock, a poisoned guard still
    // holds a consistent queue
    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push(&self, batch: Batch<'static>) {
        self.lock().work.push(batch);
    }

    // blocks on the condvar, counted as idle while waiting
    pub(crate) fn wait<'a>(
        &'a self,
        guard: MutexGuard<'a, QueueState>,
    ) -> MutexGuard<'a, QueueState> {
        self.idle.fetch_add(1, Ordering::AcqRel);
        let guard = self.cond.wait(guard).unwrap_or_else(PoisonError::into_inner);
        self.idle.fetch_sub(1, Ordering::AcqRel);
        guard
    }

    pub(crate) fn notify_one(&self) {
        self.cond.notify_one();
    }

    // sets the exit flag and wakes every waiter
    pub(crate) fn close(&self) {
        self.lock().done = true;
        self.cond.notify_all();
    }

    pub(crate) fn idle_threads(&self) -> usize {
        self.idle.load(Ordering::Acquire)
    }

    pub(crate) fn live_threads(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    // claims a thread slot below `threads_max`, false when the pool is full
    pub(crate) fn reserve_thread(&self) -> bool {
        let max = self.config.threads_max;
        self.live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                (live < max).then_some(live + 1)
            })
            .is_ok()
    }

    // gives a slot back, either after a failed spawn or when a worker exits
    pub(crate) fn release_thread(&self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn next_thread_id(&self) -> usize {
        self.next_thread_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn pending(&self) -> usize {
        self.lock().work.len()
    }
}
