//! Disposable subscription handles
//!
//! Teardown must be idempotent: a component unmount can race a pending
//! network response, and both paths may call `close()`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

type Cleanup = Box<dyn FnOnce() + Send>;

/// Handle to an active topic subscription. Closing runs the registered
/// cleanup exactly once; dropping an open handle closes it.
pub struct Subscription {
    closed: AtomicBool,
    cleanup: Mutex<Option<Cleanup>>,
}

impl Subscription {
    pub fn new(cleanup: impl FnOnce() + Send + 'static) -> Self {
        Self {
            closed: AtomicBool::new(false),
            cleanup: Mutex::new(Some(Box::new(cleanup))),
        }
    }

    /// Tear down the subscription. Safe to call any number of times; the
    /// cleanup side effect runs only on the first call.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let cleanup = self
            .cleanup
            .lock()
            .expect("subscription cleanup lock poisoned")
            .take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    #[test]
    fn close_runs_cleanup_exactly_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = calls.clone();
        let sub = Subscription::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        sub.close();
        sub.close();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sub.is_closed());
    }

    #[test]
    fn drop_after_close_does_not_rerun_cleanup() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = calls.clone();
        {
            let sub = Subscription::new(move || {
                counted.fetch_add(1, Ordering::SeqCst);
            });
            sub.close();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_closes_an_open_subscription() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = calls.clone();
        {
            let _sub = Subscription::new(move || {
                counted.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_close_runs_cleanup_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = calls.clone();
        let sub = Arc::new(Subscription::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sub = sub.clone();
                std::thread::spawn(move || sub.close())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
