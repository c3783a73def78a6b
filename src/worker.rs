use std::io;
use std::sync::Arc;
use std::thread;

use tracing::{error, trace};

use crate::queue::Queue;
use crate::task::Task;

// Spawns a detached worker. The caller must have reserved a thread slot; the
// worker gives it back when it exits.
pub(crate) fn spawn_worker(queue: &Arc<Queue>) -> io::Result<()> {
    let id = queue.next_thread_id();
    let shared = Arc::clone(queue);

    let handle = thread::Builder::new()
        .name(format!("{}-{}", queue.config.thread_name, id))
        .stack_size(queue.config.stack_size)
        .spawn(move || run(&shared))?;

    // detached, shutdown tracks the live count instead of joining
    drop(handle);
    trace!(worker = id, "spawned worker thread");
    Ok(())
}

fn run(queue: &Queue) {
    let slot = SlotGuard { queue };

    loop {
        let mut state = queue.lock();
        if state.is_empty() {
            if state.is_done() {
                // released under the lock so shutdown sees the final count
                // only once the queue is observed empty
                slot.exit();
                drop(state);
                trace!("worker exiting");
                return;
            }
            // spurious wakeups fall through to an empty pop
            state = queue.wait(state);
        }

        let task = state.pop();
        drop(state);

        if let Some(task) = task {
            // Safety: the scheduling contract keeps the task alive until
            // its work function has returned
            unsafe { Task::execute(task) };
        }
    }
}

// Keeps the live count honest when a work function unwinds through the
// worker, otherwise shutdown would wait on a thread that no longer exists.
struct SlotGuard<'a> {
    queue: &'a Queue,
}

impl SlotGuard<'_> {
    fn exit(self) {
        self.queue.release_thread();
        std::mem::forget(self);
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let current = thread::current();
        error!(
            thread = current.name().unwrap_or("<unnamed>"),
            "worker lost to a panicking work function"
        );
        self.queue.release_thread();
    }
}
