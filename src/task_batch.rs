use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::task::Task;

/// An unordered group of tasks submitted to the pool in one call.
///
/// Tasks are chained through their own `next` links, so building and merging
/// batches never allocates. The batch mutably borrows every task it holds for
/// `'a`; scheduling hands the nodes over to the pool.
///
/// Batch assembly is not synchronized, build a batch on one thread and then
/// submit it.
pub struct Batch<'a> {
    len: usize,
    head: Option<NonNull<Task>>,
    tail: Option<NonNull<Task>>,
    _tasks: PhantomData<&'a mut Task>,
}

// the batch only moves node pointers around, what the work functions do with
// their enclosing structs is covered by the scheduling contract
unsafe impl Send for Batch<'_> {}

impl<'a> Batch<'a> {
    pub const fn new() -> Self {
        Batch {
            len: 0,
            head: None,
            tail: None,
            _tasks: PhantomData,
        }
    }

    /// Builds a one element batch.
    pub fn from_task(task: &'a mut Task) -> Self {
        // Safety: the exclusive borrow is held by the batch for 'a
        unsafe { Self::from_raw(NonNull::from(task)) }
    }

    /// Builds a one element batch from a raw task pointer.
    ///
    /// Use this when the pointer must keep the provenance of the struct the
    /// task is embedded in, so the work function may read the other fields.
    ///
    /// # Safety
    /// `task` must be valid and exclusively owned by this batch for `'a`.
    pub unsafe fn from_raw(task: NonNull<Task>) -> Self {
        unsafe { (*task.as_ptr()).next = None };
        Batch {
            len: 1,
            head: Some(task),
            tail: Some(task),
            _tasks: PhantomData,
        }
    }

    /// Moves every task of `other` to the end of this batch.
    pub fn push(&mut self, other: Batch<'a>) {
        if other.len == 0 {
            return;
        }
        match self.tail {
            None => *self = other,
            Some(tail) => {
                unsafe { (*tail.as_ptr()).next = other.head };
                self.tail = other.tail;
                self.len += other.len;
            }
        }
    }

    // detaches the head task
    pub(crate) fn pop(&mut self) -> Option<NonNull<Task>> {
        let task = self.head?;
        if self.tail == Some(task) {
            self.head = None;
            self.tail = None;
        } else {
            self.head = unsafe { (*task.as_ptr()).next };
        }
        self.len -= 1;
        Some(task)
    }

    // drops the borrow so the nodes can live in the pool queue
    //
    // Safety: caller keeps every task valid until it has been executed
    pub(crate) unsafe fn detach(self) -> Batch<'static> {
        Batch {
            len: self.len,
            head: self.head,
            tail: self.tail,
            _tasks: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for Batch<'_> {
    fn default() -> Self {
        Batch::new()
    }
}

impl<'a> From<&'a mut Task> for Batch<'a> {
    fn from(task: &'a mut Task) -> Self {
        Batch::from_task(task)
    }
}

impl<'a> Extend<Batch<'a>> for Batch<'a> {
    fn extend<I: IntoIterator<Item = Batch<'a>>>(&mut self, iter: I) {
        for batch in iter {
            self.push(batch);
        }
    }
}

impl<'a> FromIterator<&'a mut Task> for Batch<'a> {
    fn from_iter<I: IntoIterator<Item = &'a mut Task>>(iter: I) -> Self {
        let mut batch = Batch::new();
        batch.extend(iter.into_iter().map(Batch::from_task));
        batch
    }
}

impl<'a> FromIterator<Batch<'a>> for Batch<'a> {
    fn from_iter<I: IntoIterator<Item = Batch<'a>>>(iter: I) -> Self {
        let mut batch = Batch::new();
        batch.extend(iter);
        batch
    }
}

impl std::fmt::Debug for Batch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: *const Task) {}

    fn noop_task() -> Task {
        // noop never reads through the pointer
        unsafe { Task::new(noop) }
    }

    fn drain(mut batch: Batch<'_>) -> Vec<*const Task> {
        let mut out = Vec::new();
        while let Some(task) = batch.pop() {
            out.push(task.as_ptr() as *const Task);
        }
        assert!(batch.is_empty());
        out
    }

    #[test]
    fn from_task_holds_one() {
        let mut task = noop_task();
        let ptr = &task as *const Task;
        let batch = Batch::from_task(&mut task);
        assert_eq!(batch.len(), 1);
        assert_eq!(drain(batch), vec![ptr]);
    }

    #[test]
    fn push_concatenates_in_order() {
        let mut tasks: Vec<Task> = (0..5).map(|_| noop_task()).collect();
        let expected: Vec<*const Task> = tasks.iter().map(|t| t as *const Task).collect();

        let (left, right) = tasks.split_at_mut(2);
        let mut a: Batch<'_> = left.iter_mut().collect();
        let b: Batch<'_> = right.iter_mut().collect();
        assert_eq!((a.len(), b.len()), (2, 3));

        a.push(b);
        assert_eq!(a.len(), 5);
        assert_eq!(drain(a), expected);
    }

    #[test]
    fn push_with_empty_sides() {
        let mut task = noop_task();
        let ptr = &task as *const Task;

        let mut batch = Batch::new();
        batch.push(Batch::new());
        assert!(batch.is_empty());

        batch.push(Batch::from_task(&mut task));
        batch.push(Batch::default());
        assert_eq!(batch.len(), 1);
        assert_eq!(drain(batch), vec![ptr]);
    }

    #[test]
    fn pop_empty_returns_none() {
        let mut batch = Batch::new();
        assert!(batch.pop().is_none());
        assert_eq!(batch.len(), 0);
    }

    #[test]
    fn relinked_task_drops_stale_next() {
        let mut first = noop_task();
        let mut second = noop_task();

        {
            let mut batch = Batch::from_task(&mut first);
            batch.push(Batch::from_task(&mut second));
            assert_eq!(drain(batch), vec![&first as *const _, &second as *const _]);
        }

        // `first` still links to `second` from the previous batch
        assert_eq!(first.next, NonNull::new(&mut second as *mut Task));
        let batch = Batch::from_task(&mut first);
        assert_eq!(batch.len(), 1);
        drop(batch);
        assert!(first.next.is_none());
    }
}
