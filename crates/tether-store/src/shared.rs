//! In-process dependency store.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tether_core::{CoreError, Dependencies, DependencyPatch, DependencySpec, Result, Status};

use crate::DependencyStore;

/// A dependency store holding the current bundle behind a lock.
///
/// Reads clone the `Arc` under a read guard; writes build the next bundle
/// and swap it under a write guard.
pub struct SharedStore<C> {
    current: RwLock<Arc<Dependencies<C>>>,
}

impl<C> SharedStore<C> {
    /// Create a store holding an already committed bundle.
    #[must_use]
    pub fn new(deps: Dependencies<C>) -> Self {
        Self {
            current: RwLock::new(Arc::new(deps)),
        }
    }

    /// Validate `spec` and create a store with an `OPEN` bundle.
    ///
    /// # Errors
    ///
    /// Returns the validation error of [`DependencySpec::into_dependencies`].
    pub fn seed(spec: DependencySpec<C>) -> Result<Self> {
        spec.into_dependencies(Status::Open).map(Self::new)
    }

    fn swap(
        &self,
        next: impl FnOnce(&Dependencies<C>) -> Result<Option<Dependencies<C>>>,
    ) -> Result<()> {
        let mut current = self.current.write();
        if let Some(deps) = next(&**current)? {
            *current = Arc::new(deps);
        }
        Ok(())
    }
}

impl<C> DependencyStore<C> for SharedStore<C>
where
    C: Send + Sync,
{
    fn get(&self) -> Arc<Dependencies<C>> {
        Arc::clone(&self.current.read())
    }

    fn set(&self, deps: Option<DependencySpec<C>>) -> Result<()> {
        let spec =
            deps.ok_or_else(|| CoreError::InvalidArgument("dependencies are required".into()))?;
        spec.validate()?;

        self.swap(|current| {
            if current.shares_contents(&spec) {
                return Ok(None);
            }
            tracing::debug!(spec = ?spec, "Replacing dependencies");
            spec.into_dependencies(current.status()).map(Some)
        })
    }

    fn update(&self, patch: DependencyPatch<C>) -> Result<()> {
        self.swap(|current| {
            tracing::debug!(patch = ?patch, "Merging dependencies");
            current.merged(patch).map(Some)
        })
    }

    fn set_client(&self, client: Option<Arc<C>>) -> Result<()> {
        let client = client.ok_or_else(|| CoreError::InvalidArgument("client is required".into()))?;

        self.swap(|current| {
            if Arc::ptr_eq(current.client(), &client) {
                return Ok(None);
            }
            tracing::debug!("Swapping client");
            current
                .merged(DependencyPatch::new().shared_client(client))
                .map(Some)
        })
    }

    fn transition(&self, from: Status, to: Status) -> Result<bool> {
        Status::validate_transition(from, to)?;

        let mut current = self.current.write();
        if current.status() != from {
            return Ok(false);
        }
        *current = Arc::new(current.with_status(to));
        tracing::debug!(%from, %to, "Status transition");
        Ok(true)
    }
}

impl<C> fmt::Debug for SharedStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStore")
            .field("current", &*self.current.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Conn(&'static str);

    fn store() -> SharedStore<Conn> {
        SharedStore::seed(
            DependencySpec::new()
                .client(Conn("primary"))
                .extra("database", "orders"),
        )
        .unwrap()
    }

    #[test]
    fn seed_starts_open() {
        let store = store();
        assert_eq!(store.status(), Status::Open);
        assert_eq!(*store.client(), Conn("primary"));
    }

    #[test]
    fn seed_requires_client() {
        let result = SharedStore::<Conn>::seed(DependencySpec::new());
        assert!(matches!(result, Err(CoreError::MissingClient)));
    }

    #[test]
    fn set_none_is_invalid_argument() {
        let store = store();
        let before = store.get();

        assert!(matches!(store.set(None), Err(CoreError::InvalidArgument(_))));
        assert!(Arc::ptr_eq(&before, &store.get()));
    }

    #[test]
    fn set_without_client_is_rejected() {
        let store = store();
        let before = store.get();

        let result = store.set(Some(DependencySpec::new()));
        assert!(matches!(result, Err(CoreError::MissingClient)));
        assert!(Arc::ptr_eq(&before, &store.get()));
    }

    #[test]
    fn set_replaces_wholesale() {
        let store = store();
        store
            .set(Some(DependencySpec::new().client(Conn("replica"))))
            .unwrap();

        let deps = store.get();
        assert_eq!(**deps.client(), Conn("replica"));
        assert!(!deps.contains_key("database"));
    }

    #[test]
    fn set_same_bundle_is_noop() {
        let store = store();
        let before = store.get();

        store.set(Some(before.to_spec())).unwrap();
        assert!(Arc::ptr_eq(&before, &store.get()));
    }

    #[test]
    fn set_keeps_status() {
        let store = store();
        assert!(store.transition(Status::Open, Status::Closing).unwrap());

        store
            .set(Some(DependencySpec::new().client(Conn("replica"))))
            .unwrap();
        assert_eq!(store.status(), Status::Closing);
    }

    #[test]
    fn update_does_not_touch_earlier_snapshot() {
        let store = store();
        let before = store.get();

        store
            .update(DependencyPatch::new().extra("database", "invoices"))
            .unwrap();

        assert_eq!(before.get::<&str>("database"), Some(&"orders"));
        assert_eq!(store.get().get::<&str>("database"), Some(&"invoices"));
        assert!(!Arc::ptr_eq(&before, &store.get()));
    }

    #[test]
    fn update_rejects_reserved_key() {
        let store = store();
        let result = store.update(DependencyPatch::new().extra("close", ()));
        assert!(matches!(result, Err(CoreError::ReservedKey(key)) if key == "close"));
    }

    #[test]
    fn set_client_none_is_invalid_argument() {
        let store = store();
        assert!(matches!(
            store.set_client(None),
            Err(CoreError::InvalidArgument(_))
        ));
        assert_eq!(*store.client(), Conn("primary"));
    }

    #[test]
    fn set_client_same_client_is_noop() {
        let store = store();
        let before = store.get();

        store.set_client(Some(store.client())).unwrap();
        assert!(Arc::ptr_eq(&before, &store.get()));
    }

    #[test]
    fn set_client_keeps_extras() {
        let store = store();
        store.set_client(Some(Arc::new(Conn("replica")))).unwrap();

        let deps = store.get();
        assert_eq!(**deps.client(), Conn("replica"));
        assert_eq!(deps.get::<&str>("database"), Some(&"orders"));
    }

    #[test]
    fn transition_is_compare_and_set() {
        let store = store();

        assert!(store.transition(Status::Open, Status::Closing).unwrap());
        // Second caller loses the race
        assert!(!store.transition(Status::Open, Status::Closing).unwrap());
        assert!(store.transition(Status::Closing, Status::Closed).unwrap());
        assert_eq!(store.status(), Status::Closed);
    }

    #[test]
    fn transition_rejects_backward_moves() {
        let store = store();
        let result = store.transition(Status::Closing, Status::Open);
        assert!(matches!(result, Err(CoreError::InvalidTransition { .. })));
        assert_eq!(store.status(), Status::Open);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_transition_has_one_winner() {
        let store = Arc::new(store());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.transition(Status::Open, Status::Closing).unwrap() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(store.status(), Status::Closing);
    }
}
