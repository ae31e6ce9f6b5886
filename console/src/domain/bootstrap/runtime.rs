//! Runtime dependencies for the bootstrapper: sleeping, time, and teardown.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tokio::sync::watch;

/// Async sleeping abstraction for retry backoff.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend execution for `duration`.
    ///
    /// ```rust,no_run
    /// use async_trait::async_trait;
    /// use bloodbank_console::domain::bootstrap::Sleeper;
    /// use std::sync::Mutex;
    /// use std::time::Duration;
    ///
    /// #[derive(Default)]
    /// struct CountingSleeper {
    ///     calls: Mutex<u32>,
    /// }
    ///
    /// #[async_trait]
    /// impl Sleeper for CountingSleeper {
    ///     async fn sleep(&self, _duration: Duration) {
    ///         *self.calls.lock().expect("calls mutex") += 1;
    ///     }
    /// }
    /// ```
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Teardown signal for the page that owns a bootstrap or a list view.
///
/// Clones share the same signal. Once torn down, the lifecycle stays torn
/// down; pending fetches and backoff waits observe it and stop.
///
/// # Examples
/// ```
/// use bloodbank_console::domain::bootstrap::PageLifecycle;
///
/// let lifecycle = PageLifecycle::new();
/// let observer = lifecycle.clone();
/// lifecycle.teardown();
/// assert!(observer.is_torn_down());
/// ```
#[derive(Debug, Clone)]
pub struct PageLifecycle {
    signal: Arc<watch::Sender<bool>>,
}

impl Default for PageLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl PageLifecycle {
    /// A live lifecycle.
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            signal: Arc::new(signal),
        }
    }

    /// Mark the page as gone.
    pub fn teardown(&self) {
        self.signal.send_replace(true);
    }

    /// Whether teardown has happened.
    pub fn is_torn_down(&self) -> bool {
        *self.signal.borrow()
    }

    /// Resolve once teardown happens.
    pub async fn torn_down(&self) {
        let mut receiver = self.signal.subscribe();
        if receiver.wait_for(|gone| *gone).await.is_err() {
            // The sender lives in `self`, so the channel cannot close here.
            std::future::pending::<()>().await;
        }
    }
}

/// Runtime helpers used by the bootstrapper.
pub struct BootstrapRuntime {
    /// Async sleep implementation.
    pub sleeper: Arc<dyn Sleeper>,
    /// Clock used to timestamp state transitions.
    pub clock: Arc<dyn Clock>,
}

impl Default for BootstrapRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            clock: Arc::new(DefaultClock),
        }
    }
}
