//! Dependency storage for tether.
//!
//! This crate owns the current dependency bundle of a facade. Every write
//! builds a new [`Dependencies`] snapshot and swaps it in under a lock, so a
//! reader never observes a half-applied update and a snapshot obtained
//! earlier stays consistent.
//!
//! # Example
//!
//! ```
//! use tether_core::{DependencyPatch, DependencySpec, Status};
//! use tether_store::{DependencyStore, SharedStore};
//!
//! let store = SharedStore::seed(DependencySpec::new().client(42_u32)).unwrap();
//!
//! let before = store.get();
//! store.update(DependencyPatch::new().extra("retries", 3_u8)).unwrap();
//!
//! assert!(!before.contains_key("retries"));
//! assert_eq!(store.get().get::<u8>("retries"), Some(&3));
//! assert_eq!(store.status(), Status::Open);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod shared;

pub use shared::SharedStore;
pub use tether_core::{CoreError, Result};

use std::sync::Arc;

use tether_core::{Dependencies, DependencyPatch, DependencySpec, Status};

/// The storage trait for a facade's dependency bundle.
///
/// This trait abstracts the storage layer so a facade can be built on a
/// custom store (e.g. one that mirrors swaps elsewhere).
pub trait DependencyStore<C>: Send + Sync {
    /// Get the most recently committed bundle.
    fn get(&self) -> Arc<Dependencies<C>>;

    /// Replace the bundle wholesale, keeping the current status.
    ///
    /// `None` stands for an absent value. Setting a spec that shares the
    /// current bundle's client and extras is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `deps` is `None`,
    /// `CoreError::MissingClient` if the spec has no client, or
    /// `CoreError::ReservedKey` if it carries a reserved key.
    fn set(&self, deps: Option<DependencySpec<C>>) -> Result<()>;

    /// Shallow-merge `patch` into a new bundle.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ReservedKey` if the patch carries a reserved key.
    fn update(&self, patch: DependencyPatch<C>) -> Result<()>;

    /// Replace only the client.
    ///
    /// A no-op if `client` is the current client.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `client` is `None`.
    fn set_client(&self, client: Option<Arc<C>>) -> Result<()>;

    /// Atomically move the status from `from` to `to`.
    ///
    /// Returns `Ok(false)` without writing if the current status is not `from`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if `from → to` is not part of
    /// the state machine.
    fn transition(&self, from: Status, to: Status) -> Result<bool>;

    /// The current client.
    fn client(&self) -> Arc<C> {
        Arc::clone(self.get().client())
    }

    /// The current lifecycle status.
    fn status(&self) -> Status {
        self.get().status()
    }
}
