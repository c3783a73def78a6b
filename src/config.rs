/// Stack size given to worker threads when the config leaves it at zero.
pub const DEFAULT_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Thread limit used when the config leaves it at zero.
pub const DEFAULT_THREADS_MAX: usize = 16;

/// Worker thread name prefix used when the config leaves it empty.
pub const DEFAULT_THREAD_NAME: &str = "lp";

/// Thread pool configuration.
///
/// Zero values mean "use the default", so `Config::default()` is a valid
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Stack size of each worker thread in bytes.
    pub stack_size: usize,
    /// Upper bound on live worker threads.
    pub threads_max: usize,
    /// Prefix for worker thread names, workers are called `{prefix}-{n}`.
    pub thread_name: &'static str,
}

impl Config {
    pub const fn new() -> Self {
        Config {
            stack_size: 0,
            threads_max: 0,
            thread_name: DEFAULT_THREAD_NAME,
        }
    }

    pub const fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    pub const fn with_threads_max(mut self, threads_max: usize) -> Self {
        self.threads_max = threads_max;
        self
    }

    pub const fn with_thread_name(mut self, thread_name: &'static str) -> Self {
        self.thread_name = thread_name;
        self
    }

    // substitutes defaults for zero values
    pub(crate) fn resolved(self) -> Self {
        Config {
            stack_size: if self.stack_size == 0 {
                DEFAULT_STACK_SIZE
            } else {
                self.stack_size
            },
            threads_max: if self.threads_max == 0 {
                DEFAULT_THREADS_MAX
            } else {
                self.threads_max
            },
            thread_name: if self.thread_name.is_empty() {
                DEFAULT_THREAD_NAME
            } else {
                self.thread_name
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}
