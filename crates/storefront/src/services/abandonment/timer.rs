//! Cancellable delayed tasks.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Owns a spawned task and aborts it when dropped.
///
/// Dropping the guard is the only way a scheduled callback is released, so a
/// callback cannot outlive whatever owns its guard.
#[derive(Debug)]
pub struct TimerGuard {
    handle: JoinHandle<()>,
}

impl TimerGuard {
    /// Spawn `task` on `runtime`.
    pub fn spawn<F>(runtime: &Handle, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: runtime.spawn(task),
        }
    }

    /// Whether the task has completed or been aborted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the task now.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;

    fn flag_after(delay: Duration, flag: &Arc<AtomicBool>) -> impl Future<Output = ()> + use<> {
        let flag = Arc::clone(flag);
        async move {
            tokio::time::sleep(delay).await;
            flag.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_when_kept() {
        let fired = Arc::new(AtomicBool::new(false));
        let guard = TimerGuard::spawn(&Handle::current(), flag_after(Duration::from_secs(5), &fired));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(fired.load(Ordering::SeqCst));
        assert!(guard.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let fired = Arc::new(AtomicBool::new(false));
        let guard = TimerGuard::spawn(&Handle::current(), flag_after(Duration::from_secs(5), &fired));
        guard.cancel();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
