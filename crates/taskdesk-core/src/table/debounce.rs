//! Trailing-edge debouncing on the tokio timer.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Delay between the last search keystroke and the search being applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Runs only the last of a burst of calls, once `delay` passes without a new one.
///
/// Each [`Debouncer::call`] aborts the pending timer and arms a new one.
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `action`, cancelling whatever was scheduled before.
    pub fn call<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action().await;
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Drop the pending call, if any, without running it.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn push_later(
        calls: &Arc<Mutex<Vec<String>>>,
        value: &str,
    ) -> impl FnOnce() -> futures::future::Ready<()> + Send + 'static {
        let calls = calls.clone();
        let value = value.to_string();
        move || {
            calls.lock().unwrap().push(value);
            futures::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_trailing_call_fires() {
        let debouncer = Debouncer::default();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for query in ["t", "ta", "tas", "task"] {
            debouncer.call(push_later(&calls, query));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(calls.lock().unwrap().is_empty());

        tokio::time::sleep(SEARCH_DEBOUNCE).await;
        assert_eq!(*calls.lock().unwrap(), vec!["task".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let counter = count.clone();
            debouncer.call(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(80)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_call() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let calls = Arc::new(Mutex::new(Vec::new()));
        debouncer.call(push_later(&calls, "never"));
        assert!(debouncer.is_pending());
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(calls.lock().unwrap().is_empty());
    }
}
