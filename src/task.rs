use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::TaskFn;

/// A unit of work the pool can run.
///
/// `Task` is an intrusive node: the pool never allocates, copies or frees it.
/// Embed it as the first field of a `#[repr(C)]` struct so the work function
/// can cast the pointer it receives back to the enclosing struct (the
/// [`lp_task!`](crate::lp_task) macro does this for you).
///
/// A task must not sit in two batches at once, its link would be overwritten.
#[repr(C)]
pub struct Task {
    pub(crate) next: Option<NonNull<Task>>,
    work: TaskFn,
}

// the link is only followed by the batch or queue that exclusively owns the
// node, the work function is a plain fn pointer
unsafe impl Send for Task {}
unsafe impl Sync for Task {}

impl Task {
    /// Creates an unlinked task.
    ///
    /// # Safety
    /// `work` is called with a pointer to this task once it is scheduled. It
    /// must only read through that pointer what actually surrounds the task,
    /// e.g. a work function that casts it to `MyTask` requires the task to
    /// be the first field of a `#[repr(C)] MyTask`. Prefer [`lp_task!`] and
    /// [`lp_define_task_fn!`](crate::lp_define_task_fn), which pair the two
    /// with a type check.
    ///
    /// A bare task cannot be paired with a work function defined for a task
    /// struct without `unsafe`:
    ///
    /// ```compile_fail,E0133
    /// use lazy_pool::Task;
    ///
    /// fn work(_: *const Task) {}
    /// let task = Task::new(work);
    /// ```
    ///
    /// [`lp_task!`]: crate::lp_task
    pub const unsafe fn new(work: TaskFn) -> Self {
        Task { next: None, work }
    }

    // invokes the work function, the pool keeps no reference afterwards
    //
    // Safety: `task` must point to a live task that nothing else is mutating
    #[inline]
    pub(crate) unsafe fn execute(task: NonNull<Task>) {
        let raw = task.as_ptr();
        let work = unsafe { (*raw).work };
        work(raw);
    }
}

/// A work function defined for the task struct `T`.
///
/// Only [`lp_define_task_fn!`](crate::lp_define_task_fn) builds these, and the
/// constructor generated by [`lp_task!`](crate::lp_task) only takes the one
/// matching its own struct:
///
/// ```compile_fail,E0308
/// use lazy_pool::{lp_define_task_fn, lp_task};
///
/// lp_task! { Small { value: u8 } }
/// lp_task! { Large { values: [u64; 64] } }
///
/// lp_define_task_fn!(read_large, Large, |params| {
///     std::hint::black_box(params.values[63]);
/// });
///
/// let task = Small::new(read_large, 1);
/// ```
pub struct WorkFn<T> {
    raw: TaskFn,
    _task: PhantomData<fn(&T)>,
}

impl<T> WorkFn<T> {
    /// # Safety
    /// `raw` must only read its task pointer as a `&T` whose first field is
    /// that task, `T` being `#[repr(C)]`.
    pub const unsafe fn new_unchecked(raw: TaskFn) -> Self {
        WorkFn {
            raw,
            _task: PhantomData,
        }
    }

    pub const fn as_raw(&self) -> TaskFn {
        self.raw
    }
}

impl<T> Clone for WorkFn<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for WorkFn<T> {}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("linked", &self.next.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::Task;

    crate::lp_task! {
        Marker {
            hits: AtomicUsize,
            tag: u64,
        }
    }

    crate::lp_define_task_fn!(mark, Marker, |params| {
        params.hits.fetch_add(params.tag as usize, Ordering::SeqCst);
    });

    #[test]
    fn typed_work_fn_reads_its_own_struct() {
        let mut marker = Marker::new(mark, AtomicUsize::new(0), 7);
        let mut batch = marker.batch();
        let task = batch.pop().expect("batch holds the marker task");
        unsafe { Task::execute(task) };
        assert_eq!(marker.hits.load(Ordering::SeqCst), 7);
    }
}
