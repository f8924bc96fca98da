//! Thread lifecycle and synchronization primitives.
//!
//! Cancellation is cooperative: [`ThreadHandle::cancel`] only flips a
//! shared flag, the spawned closure must poll [`CancelToken::is_cancelled`]
//! on its own.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use crate::foundation::atomics::{AtomicBoolCell, MemoryOrder};

/// Shared with a spawned thread so it can poll for cooperative cancellation.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBoolCell>,
}

impl CancelToken {
    /// Whether [`ThreadHandle::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(MemoryOrder::Acquire)
    }
}

/// A spawned, cooperatively cancellable worker thread.
pub struct ThreadHandle {
    join_handle: Option<JoinHandle<()>>,
    cancel_flag: Arc<AtomicBoolCell>,
    thread_id: ThreadId,
}

impl ThreadHandle {
    /// Spawn `body` on a new OS thread, handing it a [`CancelToken`] it
    /// should poll periodically.
    pub fn create<F>(body: F) -> Self
    where
        F: FnOnce(CancelToken) + Send + 'static,
    {
        let cancel_flag = Arc::new(AtomicBoolCell::new(false));
        let token = CancelToken {
            flag: Arc::clone(&cancel_flag),
        };
        let join_handle = thread::spawn(move || body(token));
        let thread_id = join_handle.thread().id();
        Self {
            join_handle: Some(join_handle),
            cancel_flag,
            thread_id,
        }
    }

    /// Request cooperative cancellation. Does not forcibly stop the thread.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, MemoryOrder::Release);
    }

    /// Whether the thread has not yet finished running.
    pub fn is_active(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Block until the thread finishes.
    pub fn join(mut self) -> std::thread::Result<()> {
        match self.join_handle.take() {
            Some(h) => h.join(),
            None => Ok(()),
        }
    }

    /// Release this handle without waiting for the thread to finish. The
    /// OS thread keeps running to completion on its own.
    pub fn detach(mut self) {
        self.join_handle.take();
    }

    /// Alias of [`Self::detach`] under a `destroy` name; a
    /// `ThreadHandle` owns no other resources that need explicit release.
    pub fn destroy(self) {
        self.detach();
    }

    /// The id of the thread this handle refers to.
    pub const fn get_id(&self) -> ThreadId {
        self.thread_id
    }
}

/// The id of the calling thread.
pub fn current_id() -> ThreadId {
    thread::current().id()
}

/// Suspend the calling thread for `duration`.
pub fn sleep(duration: Duration) {
    thread::sleep(duration);
}

/// A `Mutex` + `Condvar` pair with wait/signal/broadcast naming
/// instead of `std`'s `notify_one`/`notify_all`.
pub struct Monitor<T> {
    mutex: Mutex<T>,
    condvar: Condvar,
}

impl<T> Monitor<T> {
    /// Wrap `value` in a new monitor.
    pub const fn new(value: T) -> Self {
        Self {
            mutex: Mutex::new(value),
            condvar: Condvar::new(),
        }
    }

    /// Acquire the lock.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Release `guard` and block until [`Self::signal`] or [`Self::broadcast`]
    /// wakes this waiter, then re-acquire the lock.
    pub fn wait<'a>(&'a self, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        self.condvar
            .wait(guard)
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wake exactly one waiter.
    pub fn signal(&self) {
        self.condvar.notify_one();
    }

    /// Wake every waiter.
    pub fn broadcast(&self) {
        self.condvar.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as StdOrdering};
    use std::time::Duration;

    #[test]
    fn cancel_is_observed_cooperatively() {
        let observed = Arc::new(AtomicUsize::new(0));
        let observed_clone = Arc::clone(&observed);
        let handle = ThreadHandle::create(move |token| {
            while !token.is_cancelled() {
                thread::sleep(Duration::from_millis(1));
            }
            observed_clone.store(1, StdOrdering::SeqCst);
        });
        handle.cancel();
        handle.join().unwrap();
        assert_eq!(observed.load(StdOrdering::SeqCst), 1);
    }

    #[test]
    fn detach_does_not_block() {
        let handle = ThreadHandle::create(|_| {
            thread::sleep(Duration::from_millis(5));
        });
        handle.detach();
    }

    #[test]
    fn monitor_wakes_a_waiting_thread() {
        let monitor = Arc::new(Monitor::new(false));
        let waiter = Arc::clone(&monitor);
        let handle = thread::spawn(move || {
            let mut guard = waiter.lock();
            while !*guard {
                guard = waiter.wait(guard);
            }
        });
        thread::sleep(Duration::from_millis(5));
        *monitor.lock() = true;
        monitor.signal();
        handle.join().unwrap();
    }
}
