use std::time::Duration;

/// Cooperative scheduler over the tokio runtime.
///
/// Callbacks typically push a message onto the owning actor's mailbox,
/// so the work itself always runs on that actor's serialized context.
pub struct Timers;

/// Cancellation handle for a scheduled task. Dropping it does NOT
/// cancel; cancel() does, idempotently.
#[derive(Debug)]
pub struct Handle(tokio::task::AbortHandle);

impl Handle {
    pub fn cancel(&self) {
        self.0.abort();
    }
}

impl Timers {
    /// run `f` once after `delay`
    pub fn once<F>(delay: Duration, f: F) -> Handle
    where
        F: FnOnce() + Send + 'static,
    {
        Handle(
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                f();
            })
            .abort_handle(),
        )
    }

    /// run `f` every `period`, first firing one period from now
    pub fn every<F>(period: Duration, mut f: F) -> Handle
    where
        F: FnMut() + Send + 'static,
    {
        Handle(
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(period).await;
                    f();
                }
            })
            .abort_handle(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn one_shot_fires_once() {
        let count = Arc::new(AtomicU32::new(0));
        let inner = count.clone();
        let _handle = Timers::once(Duration::from_millis(100), move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing() {
        let count = Arc::new(AtomicU32::new(0));
        let inner = count.clone();
        let handle = Timers::once(Duration::from_millis(100), move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_repeats_until_cancelled() {
        let count = Arc::new(AtomicU32::new(0));
        let inner = count.clone();
        let handle = Timers::every(Duration::from_millis(100), move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.cancel();
        let seen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
        assert_eq!(seen, 3);
    }
}
