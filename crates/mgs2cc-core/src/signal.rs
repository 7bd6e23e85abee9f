use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// A cancellation flag that supports interruptible waits.
///
/// Timed effects, the dispatcher worker and the CLI's attach loop sleep on
/// this instead of `thread::sleep()` so that cancellation or shutdown wakes
/// them immediately.
pub struct CancelSignal {
    cancelled: AtomicBool,
    condvar: Condvar,
    mutex: Mutex<()>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            condvar: Condvar::new(),
            mutex: Mutex::new(()),
        }
    }

    /// Set the flag and wake every waiter.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Taking the lock orders the store before any waiter's predicate check
        drop(self.mutex.lock());
        self.condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Wait for `duration` or until cancelled.
    ///
    /// Returns `true` if cancelled, `false` if the wait ran its full length.
    pub fn wait(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }

        let Ok(guard) = self.mutex.lock() else {
            // Poisoned; treat as cancelled
            return true;
        };
        match self
            .condvar
            .wait_timeout_while(guard, duration, |_| !self.is_cancelled())
        {
            Ok((_, timeout)) => !timeout.timed_out(),
            Err(_) => true,
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}
