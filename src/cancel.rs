use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared flag for aborting an in-flight extraction. Clones observe the same
/// flag, so a signal handler can cancel work running on the main thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
