use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

const TICK: Duration = Duration::from_secs(1);

/// One-second countdown that runs `on_reveal` when it reaches zero.
///
/// The remaining seconds are published on a watch channel for the host to
/// render. Dropping or cancelling the countdown aborts its task, so at most
/// one countdown per item is ever alive.
pub struct RevealCountdown {
    remaining: watch::Receiver<u32>,
    task: JoinHandle<()>,
}

impl RevealCountdown {
    /// Must be called from within a tokio runtime.
    pub fn start<F>(secs: u32, on_reveal: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = watch::channel(secs);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TICK);
            // The first tick completes immediately.
            ticker.tick().await;
            let mut left = secs;
            while left > 0 {
                ticker.tick().await;
                left -= 1;
                tx.send_replace(left);
            }
            on_reveal.await;
        });
        Self {
            remaining: rx,
            task,
        }
    }

    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for RevealCountdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Future<Output = ()> + Send + 'static) {
        let fired = Arc::new(AtomicUsize::new(0));
        let inner = fired.clone();
        let on_reveal = async move {
            inner.fetch_add(1, Ordering::SeqCst);
        };
        (fired, on_reveal)
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_then_reveals() {
        let (fired, on_reveal) = counter();
        let countdown = RevealCountdown::start(3, on_reveal);
        let mut rx = countdown.subscribe();
        assert_eq!(countdown.remaining(), 3);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 2);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(countdown.remaining(), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(countdown.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_reveal() {
        let (fired, on_reveal) = counter();
        let countdown = RevealCountdown::start(2, on_reveal);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        drop(countdown);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_does_not_stack() {
        let (fired, first) = counter();
        let mut countdown = RevealCountdown::start(7, first);
        tokio::time::sleep(Duration::from_secs(5)).await;
        let inner = fired.clone();
        countdown = RevealCountdown::start(7, async move {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(countdown.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_reveals_immediately() {
        let (fired, on_reveal) = counter();
        let countdown = RevealCountdown::start(0, on_reveal);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(countdown.remaining(), 0);
    }
}
