/// Define a task struct with an embedded intrusive [`Task`](crate::Task)
///
/// The generated struct is `#[repr(C)]` with the task as its first field, so
/// the pointer handed to the work function can be cast back to the struct.
/// It gets a `new` constructor taking a work function made for this struct
/// by [`lp_define_task_fn!`] followed by the fields in declaration order, and
/// a `batch` method that wraps it in a one-task [`Batch`](crate::Batch).
///
/// # Examples
/// ```rust
/// use lazy_pool::{lp_define_task_fn, lp_task};
///
/// lp_task! {
///     SumTask {
///         input: u64,
///         result: *mut u64,
///     }
/// }
///
/// lp_define_task_fn!(sum_task, SumTask, |params| {
///     unsafe { *params.result = params.input + 1 };
/// });
///
/// let mut result = 0u64;
/// let mut task = SumTask::new(sum_task, 42, &mut result);
/// assert_eq!(task.batch().len(), 1);
/// ```
#[macro_export]
macro_rules! lp_task {
    ($struct_name:ident { $($field:ident: $field_type:ty),* $(,)? }) => {
        #[repr(C)]
        pub struct $struct_name {
            task: $crate::Task,
            $(pub $field: $field_type,)*
        }

        impl $struct_name {
            pub fn new(work: $crate::WorkFn<Self>, $($field: $field_type),*) -> Self {
                Self {
                    // work was defined for this struct, which starts with
                    // the task
                    task: unsafe { $crate::Task::new(work.as_raw()) },
                    $($field,)*
                }
            }

            pub fn batch(&mut self) -> $crate::Batch<'_> {
                let ptr = ::std::ptr::NonNull::from(self).cast::<$crate::Task>();
                // the task is the first field of a repr(C) struct and the
                // pointer covers the whole struct, borrowed for the batch
                unsafe { $crate::Batch::from_raw(ptr) }
            }
        }
    };
}

/// Define a work function for a struct made with [`lp_task!`]
///
/// The body receives `&YourStruct` recovered from the task pointer. The
/// result is a [`WorkFn<YourStruct>`](crate::WorkFn) constant, accepted only
/// by `YourStruct::new`.
///
/// # Examples
/// ```rust
/// use lazy_pool::{lp_define_task_fn, lp_task};
///
/// lp_task! {
///     SumTask {
///         input: u64,
///         result: *mut u64,
///     }
/// }
///
/// lp_define_task_fn!(sum_task, SumTask, |params| {
///     unsafe { *params.result = params.input * 2 };
/// });
///
/// let mut result = 0u64;
/// let mut task = SumTask::new(sum_task, 21, &mut result);
/// let pool = lazy_pool::new();
/// unsafe { pool.schedule_raw(task.batch()) }.unwrap();
/// pool.shutdown();
/// assert_eq!(result, 42);
/// ```
#[macro_export]
macro_rules! lp_define_task_fn {
    ($fn_name:ident, $param_type:ty, |$params:ident| $body:block) => {
        #[allow(non_upper_case_globals)]
        const $fn_name: $crate::WorkFn<$param_type> = {
            fn work(raw_task: *const $crate::Task) {
                let $params = unsafe { &*(raw_task as *const $param_type) };
                $body
            }
            // only reachable through `<$param_type>::new`, which embeds the
            // task as its first field
            unsafe { $crate::WorkFn::new_unchecked(work) }
        };
    };
}
