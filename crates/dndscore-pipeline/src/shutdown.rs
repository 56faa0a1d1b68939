//! Cooperative cancellation for in-flight passages

use std::sync::Arc;
use tokio::sync::watch;

/// Trigger side of the shutdown signal
///
/// Clones share the same signal. Triggering is permanent.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Create an untriggered handle
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether shutdown was requested
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribe to the signal
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Receive side of the shutdown signal
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Whether shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is requested
    ///
    /// Never resolves if every handle is dropped without triggering.
    pub async fn wait(&mut self) {
        if self.rx.wait_for(|triggered| *triggered).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_wakes_waiters() {
        let handle = ShutdownHandle::new();
        let mut signal = handle.subscribe();
        assert!(!signal.is_shutdown());

        let trigger = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.trigger();
        });

        tokio::time::timeout(Duration::from_secs(1), signal.wait())
            .await
            .unwrap();
        assert!(handle.is_triggered());
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_trigger() {
        let handle = ShutdownHandle::new();
        handle.trigger();

        let mut signal = handle.subscribe();
        assert!(signal.is_shutdown());
        tokio::time::timeout(Duration::from_millis(100), signal.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_handle_never_resolves() {
        let handle = ShutdownHandle::new();
        let mut signal = handle.subscribe();
        drop(handle);

        let waited = tokio::time::timeout(Duration::from_millis(20), signal.wait()).await;
        assert!(waited.is_err());
    }
}
