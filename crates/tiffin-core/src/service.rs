//! Service lifecycle state.
//!
//! The HTTP server publishes its state through a [`ServiceHandle`]. The
//! readiness endpoint reads it, and `tiffin serve` waits on it to report
//! startup or fail fast when the listener cannot bind.
//!
//! ```rust
//! use tiffin_core::{ServiceHandle, ServiceState};
//!
//! let handle = ServiceHandle::new("tiffin-api");
//! assert_eq!(handle.state(), ServiceState::Stopped);
//!
//! handle.set_state(ServiceState::Starting);
//! handle.set_state(ServiceState::Ready);
//! assert!(handle.state().is_ready());
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

use crate::error::{Error, Result};

/// Lifecycle state of a service.
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceState {
    /// Not started.
    Stopped,
    /// Loading the snapshot and binding the listener.
    Starting,
    /// Serving requests.
    Ready,
    /// Draining in-flight requests.
    Stopping,
    /// Could not start.
    Failed(String),
}

impl ServiceState {
    /// Returns `true` if the service is serving requests.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns `true` for Stopped and Failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed(_))
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Starting => write!(f, "starting"),
            Self::Ready => write!(f, "ready"),
            Self::Stopping => write!(f, "stopping"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Shared, cloneable handle to a service's state.
///
/// State changes are broadcast to subscribers via a watch channel.
#[derive(Clone)]
pub struct ServiceHandle {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    tx: watch::Sender<ServiceState>,
    started_at: Instant,
}

impl ServiceHandle {
    /// Creates a handle in [`ServiceState::Stopped`].
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(ServiceState::Stopped);
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                tx,
                started_at: Instant::now(),
            }),
        }
    }

    /// Service name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current state.
    pub fn state(&self) -> ServiceState {
        self.inner.tx.borrow().clone()
    }

    /// Updates the state and notifies subscribers.
    pub fn set_state(&self, state: ServiceState) {
        tracing::info!(service = %self.inner.name, %state, "Service state changed");
        self.inner.tx.send_replace(state);
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ServiceState> {
        self.inner.tx.subscribe()
    }

    /// Waits until Ready, Failed, or `timeout`.
    ///
    /// A failed start or a timeout is reported as [`Error::Config`], since
    /// both usually come from the bind address.
    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let mut rx = self.subscribe();
        let wait = async {
            loop {
                let state = rx.borrow_and_update().clone();
                match state {
                    ServiceState::Ready => return Ok(()),
                    ServiceState::Failed(reason) => {
                        return Err(Error::config(format!(
                            "Service '{}' failed to start: {reason}",
                            self.inner.name
                        )));
                    }
                    _ => {}
                }
                if rx.changed().await.is_err() {
                    return Err(Error::config(format!(
                        "Service '{}' state channel closed",
                        self.inner.name
                    )));
                }
            }
        };
        match tokio::time::timeout(timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(Error::config(format!(
                "Service '{}' not ready after {timeout:?} (state: {})",
                self.inner.name,
                self.state()
            ))),
        }
    }

    /// Time since the handle was created.
    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(ServiceState::Ready.to_string(), "ready");
        assert_eq!(
            ServiceState::Failed("port in use".into()).to_string(),
            "failed: port in use"
        );
    }

    #[test]
    fn test_clone_shares_state() {
        let a = ServiceHandle::new("api");
        let b = a.clone();
        a.set_state(ServiceState::Ready);
        assert!(b.state().is_ready());
        b.set_state(ServiceState::Stopping);
        assert_eq!(a.state(), ServiceState::Stopping);
        assert!(!a.state().is_terminal());
    }

    #[tokio::test]
    async fn test_wait_ready_after_transition() {
        let handle = ServiceHandle::new("api");
        let h = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            h.set_state(ServiceState::Starting);
            h.set_state(ServiceState::Ready);
        });
        handle.wait_ready(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_ready_times_out() {
        let handle = ServiceHandle::new("slow");
        handle.set_state(ServiceState::Starting);
        let err = handle
            .wait_ready(Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err.category(), "config");
        assert!(err.to_string().contains("not ready after"));
        assert!(err.to_string().contains("state: starting"));
    }

    #[tokio::test]
    async fn test_wait_ready_reports_failure() {
        let handle = ServiceHandle::new("broken");
        handle.set_state(ServiceState::Failed("bind failed".into()));
        let err = handle
            .wait_ready(Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("failed to start: bind failed"));
    }
}
