//! TimerPool — bookkeeping for in-flight animation timers
//!
//! Per-reel stop timers, the wheel settle timer, and the reveal game's delay
//! timers are all independently scheduled. Any of them can fire after the
//! spin or session that created them is no longer current. Every timer is
//! therefore recorded here, and starting a new spin (or ending the session)
//! cancels the whole pool so a stale callback never mutates newer state.

use std::future::Future;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Records spawned timer tasks so they can be cancelled as a group
#[derive(Default)]
pub struct TimerPool {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TimerPool {
    /// Empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a timer task and record its handle
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(fut);
        self.handles.lock().push(handle);
    }

    /// Abort every recorded timer and forget the handles
    pub fn cancel_all(&self) {
        let handles = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            handle.abort();
        }
    }

    /// Drop handles of timers that already ran to completion
    pub fn reap_finished(&self) {
        self.handles.lock().retain(|h| !h.is_finished());
    }

    /// Number of tracked timers (finished ones included until reaped)
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// Whether no timers are tracked
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }
}

impl Drop for TimerPool {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let pool = TimerPool::new();
        let fired = Arc::new(AtomicU32::new(0));

        let f = fired.clone();
        pool.spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            f.fetch_add(1, Ordering::SeqCst);
        });

        pool.cancel_all();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(pool.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timers_fire_when_not_cancelled() {
        let pool = TimerPool::new();
        let fired = Arc::new(AtomicU32::new(0));

        for i in 0..3u64 {
            let f = fired.clone();
            pool.spawn(async move {
                tokio::time::sleep(Duration::from_millis(100 * (i + 1))).await;
                f.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 3);

        pool.reap_finished();
        assert!(pool.is_empty());
    }
}
