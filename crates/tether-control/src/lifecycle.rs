//! Lifecycle controller.
//!
//! The controller synthesizes the three lifecycle operations of a facade on
//! top of its dependency store. The status lives in the store's bundle, so
//! commands see it in the bundle they are handed and the controller never
//! keeps a second copy.
//!
//! # Close sequence
//!
//! ```text
//!   close(options)
//!     │
//!     ├─ status != OPEN ──────────────▶ Ready(Ok)       (no-op)
//!     │
//!     ├─ OPEN → CLOSING                  (before the reply is returned)
//!     │
//!     ├─ override(deps, options)
//!     │     ├─ Ok  ─▶ CLOSING → CLOSED
//!     │     └─ Err ─▶ stays CLOSING, error returned to the caller
//!     │
//!     └─ no override ─────────────────▶ CLOSING → CLOSED
//! ```

use std::fmt;
use std::sync::Arc;

use tether_core::Status;
use tether_store::DependencyStore;

use crate::callable::{CloseFn, HealthCheck, Reply};
use crate::error::Result;
use crate::options::CloseOptions;

/// Names of the synthesized lifecycle operations.
pub const LIFECYCLE_OPERATIONS: &[&str] = &[CLOSE, IS_HEALTHY, STATUS];

pub(crate) const CLOSE: &str = "close";
pub(crate) const IS_HEALTHY: &str = "is_healthy";
pub(crate) const STATUS: &str = "status";

/// The lifecycle contract shared by facades and values decorated with one.
pub trait Lifecycle {
    /// The current status. Never suspends, never fails.
    fn status(&self) -> Status;

    /// Begin closing the wrapped client.
    ///
    /// The status is `CLOSING` by the time this returns, even if the reply
    /// is still pending. Calling `close` again in any state other than
    /// `OPEN` returns a ready, successful reply without invoking the close
    /// override a second time.
    fn close(&self, options: CloseOptions) -> Reply<()>;

    /// Whether the wrapped client is usable.
    ///
    /// Always `false` once closing has begun; the health check override is
    /// only consulted while the status is `OPEN`.
    fn is_healthy(&self) -> Reply<bool>;
}

/// Drives the `OPEN → CLOSING → CLOSED` state machine for one facade.
pub struct LifecycleController<C> {
    store: Arc<dyn DependencyStore<C>>,
    on_close: Option<CloseFn<C>>,
    health_check: Option<HealthCheck<C>>,
}

impl<C> LifecycleController<C> {
    /// Create a controller over `store`.
    #[must_use]
    pub fn new(
        store: Arc<dyn DependencyStore<C>>,
        on_close: Option<CloseFn<C>>,
        health_check: Option<HealthCheck<C>>,
    ) -> Self {
        Self {
            store,
            on_close,
            health_check,
        }
    }

    /// Returns true if a close override was supplied.
    #[must_use]
    pub const fn has_close_override(&self) -> bool {
        self.on_close.is_some()
    }

    /// Returns true if a health check override was supplied.
    #[must_use]
    pub const fn has_health_check(&self) -> bool {
        self.health_check.is_some()
    }
}

fn finish_close<C>(store: &dyn DependencyStore<C>) -> Result<()> {
    store.transition(Status::Closing, Status::Closed)?;
    Ok(())
}

impl<C> Lifecycle for LifecycleController<C>
where
    C: Send + Sync + 'static,
{
    fn status(&self) -> Status {
        self.store.status()
    }

    fn close(&self, options: CloseOptions) -> Reply<()> {
        match self.store.transition(Status::Open, Status::Closing) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(status = %self.store.status(), "Close already requested");
                return Reply::ok(());
            }
            Err(err) => return Reply::Ready(Err(err.into())),
        }

        let Some(on_close) = &self.on_close else {
            return Reply::Ready(finish_close(&*self.store));
        };

        // Read after the transition so the override sees CLOSING.
        let deps = self.store.get();
        let store = Arc::clone(&self.store);
        on_close
            .invoke(CLOSE, deps, options)
            .and_then(move |()| finish_close(&*store))
    }

    fn is_healthy(&self) -> Reply<bool> {
        let deps = self.store.get();
        if !deps.status().is_open() {
            return Reply::ok(false);
        }

        match &self.health_check {
            Some(check) => check.invoke(IS_HEALTHY, deps, ()),
            None => Reply::ok(true),
        }
    }
}

impl<C> fmt::Debug for LifecycleController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleController")
            .field("status", &self.store.get().status())
            .field("has_close_override", &self.has_close_override())
            .field("has_health_check", &self.has_health_check())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tether_core::DependencySpec;
    use tether_store::SharedStore;

    use super::*;
    use crate::callable::Callable;
    use crate::error::ControlError;

    fn store() -> Arc<dyn DependencyStore<&'static str>> {
        Arc::new(SharedStore::seed(DependencySpec::new().client("conn")).unwrap())
    }

    #[test]
    fn close_without_override_is_ready() {
        let controller = LifecycleController::new(store(), None, None);
        assert_eq!(controller.status(), Status::Open);

        let reply = controller.close(CloseOptions::new());
        assert!(reply.is_ready());
        assert!(reply.try_ready().unwrap().is_ok());
        assert_eq!(controller.status(), Status::Closed);
    }

    #[test]
    fn sync_close_override_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let on_close = Callable::sync(move |deps, _options| {
            assert_eq!(deps.status(), Status::Closing);
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let controller = LifecycleController::new(store(), Some(on_close), None);

        assert!(controller.close(CloseOptions::new()).try_ready().unwrap().is_ok());
        assert!(controller.close(CloseOptions::new()).try_ready().unwrap().is_ok());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.status(), Status::Closed);
    }

    #[test]
    fn failing_close_stays_closing() {
        let on_close = Callable::sync(|_deps, _options| Err(anyhow::anyhow!("flush failed")));
        let controller = LifecycleController::new(store(), Some(on_close), None);

        let err = controller
            .close(CloseOptions::new())
            .try_ready()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, ControlError::Command { ref name, .. } if name == "close"));
        assert_eq!(controller.status(), Status::Closing);

        // No recovery: a second close is a no-op
        assert!(controller.close(CloseOptions::new()).try_ready().unwrap().is_ok());
        assert_eq!(controller.status(), Status::Closing);
    }

    #[test]
    fn health_defaults_to_true_while_open() {
        let controller = LifecycleController::new(store(), None, None);
        assert!(controller.is_healthy().try_ready().unwrap().unwrap());
    }

    #[test]
    fn health_check_not_consulted_after_close() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let check = Callable::sync(move |_deps, ()| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        });
        let controller = LifecycleController::new(store(), None, Some(check));

        assert!(controller.is_healthy().try_ready().unwrap().unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let _ = controller.close(CloseOptions::new()).try_ready();
        assert!(!controller.is_healthy().try_ready().unwrap().unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn operation_names() {
        assert_eq!(LIFECYCLE_OPERATIONS, &["close", "is_healthy", "status"]);
    }
}
