//! Dependency bundles.
//!
//! A [`Dependencies`] value is an immutable snapshot of everything a command
//! needs: the wrapped client, opaque extra payloads keyed by name, and the
//! lifecycle [`Status`] at the time the snapshot was committed.
//!
//! Bundles are never mutated in place. Every change produces a new bundle
//! that shares unchanged parts (client, extras map) with its predecessor, so
//! a reader holding an older snapshot keeps a consistent view.
//!
//! [`DependencySpec`] is the unvalidated input shape used to seed or replace
//! a bundle, and [`DependencyPatch`] is a partial update.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::status::Status;

/// An opaque extra payload carried in a bundle.
pub type Extra = Arc<dyn Any + Send + Sync>;

type Extras = Arc<BTreeMap<String, Extra>>;

/// Keys that may never appear among a bundle's extras.
///
/// `client` has its own typed slot; the others name the synthesized
/// lifecycle operations.
pub const RESERVED_KEYS: &[&str] = &["client", "close", "is_healthy", "status"];

/// Returns true if `key` is reserved for the client slot or a lifecycle accessor.
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

fn check_keys<'a>(keys: impl IntoIterator<Item = &'a String>) -> Result<()> {
    match keys.into_iter().find(|key| is_reserved_key(key)) {
        Some(key) => Err(CoreError::ReservedKey(key.clone())),
        None => Ok(()),
    }
}

/// A committed dependency bundle.
pub struct Dependencies<C> {
    client: Arc<C>,
    extras: Extras,
    status: Status,
}

impl<C> Dependencies<C> {
    /// The wrapped client handle.
    #[must_use]
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// The lifecycle status recorded with this snapshot.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Get an extra payload by key, downcast to `T`.
    ///
    /// Returns `None` if the key is absent or holds a different type.
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.extras
            .get(key)
            .and_then(|extra| (**extra).downcast_ref::<T>())
    }

    /// Get an extra payload by key without downcasting.
    #[must_use]
    pub fn get_raw(&self, key: &str) -> Option<&Extra> {
        self.extras.get(key)
    }

    /// Returns true if an extra payload exists under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.extras.contains_key(key)
    }

    /// Names of all extra payloads, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.extras.keys().map(String::as_str)
    }

    /// A copy of this bundle with a different status.
    ///
    /// The client and extras are shared with `self`.
    #[must_use]
    pub fn with_status(&self, status: Status) -> Self {
        Self {
            client: Arc::clone(&self.client),
            extras: Arc::clone(&self.extras),
            status,
        }
    }

    /// Shallow-merge `patch` into a new bundle.
    ///
    /// Keys in the patch override matching keys in `self`. `self` is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ReservedKey` if the patch carries a reserved key.
    pub fn merged(&self, patch: DependencyPatch<C>) -> Result<Self> {
        check_keys(patch.extras.keys())?;

        let extras = if patch.extras.is_empty() {
            Arc::clone(&self.extras)
        } else {
            let mut merged = (*self.extras).clone();
            merged.extend(patch.extras);
            Arc::new(merged)
        };

        Ok(Self {
            client: patch.client.unwrap_or_else(|| Arc::clone(&self.client)),
            extras,
            status: self.status,
        })
    }

    /// The user-facing part of this bundle, without lifecycle metadata.
    ///
    /// The returned spec shares the client and extras with `self`.
    #[must_use]
    pub fn to_spec(&self) -> DependencySpec<C> {
        DependencySpec {
            client: Some(Arc::clone(&self.client)),
            extras: Arc::clone(&self.extras),
        }
    }

    /// Returns true if `spec` refers to the very same client and extras as
    /// this bundle.
    #[must_use]
    pub fn shares_contents(&self, spec: &DependencySpec<C>) -> bool {
        spec.client
            .as_ref()
            .is_some_and(|client| Arc::ptr_eq(client, &self.client))
            && Arc::ptr_eq(&spec.extras, &self.extras)
    }
}

impl<C> Clone for Dependencies<C> {
    fn clone(&self) -> Self {
        self.with_status(self.status)
    }
}

impl<C> fmt::Debug for Dependencies<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("keys", &self.extras.keys().collect::<Vec<_>>())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Unvalidated dependency input.
///
/// The client slot may be empty here; validation happens when the spec is
/// committed through [`DependencySpec::into_dependencies`].
pub struct DependencySpec<C> {
    client: Option<Arc<C>>,
    extras: Extras,
}

impl<C> DependencySpec<C> {
    /// Create an empty spec.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: None,
            extras: Arc::new(BTreeMap::new()),
        }
    }

    /// Set the client.
    #[must_use]
    pub fn client(self, client: C) -> Self {
        self.shared_client(Arc::new(client))
    }

    /// Set a client that is already shared.
    #[must_use]
    pub fn shared_client(mut self, client: Arc<C>) -> Self {
        self.client = Some(client);
        self
    }

    /// Add an extra payload.
    #[must_use]
    pub fn extra<T: Any + Send + Sync>(self, key: impl Into<String>, value: T) -> Self {
        self.shared_extra(key, Arc::new(value))
    }

    /// Add an extra payload that is already shared.
    #[must_use]
    pub fn shared_extra(mut self, key: impl Into<String>, value: Extra) -> Self {
        Arc::make_mut(&mut self.extras).insert(key.into(), value);
        self
    }

    /// Returns true if a client has been set.
    #[must_use]
    pub const fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Check the spec without consuming it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingClient` if no client is set, or
    /// `CoreError::ReservedKey` if an extra uses a reserved key.
    pub fn validate(&self) -> Result<()> {
        if self.client.is_none() {
            return Err(CoreError::MissingClient);
        }
        check_keys(self.extras.keys())
    }

    /// Validate and commit the spec as a bundle with the given status.
    ///
    /// # Errors
    ///
    /// See [`DependencySpec::validate`].
    pub fn into_dependencies(self, status: Status) -> Result<Dependencies<C>> {
        self.validate()?;
        let client = self.client.ok_or(CoreError::MissingClient)?;
        Ok(Dependencies {
            client,
            extras: self.extras,
            status,
        })
    }
}

impl<C> Default for DependencySpec<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for DependencySpec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencySpec")
            .field("has_client", &self.client.is_some())
            .field("keys", &self.extras.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A partial update to a bundle.
pub struct DependencyPatch<C> {
    client: Option<Arc<C>>,
    extras: BTreeMap<String, Extra>,
}

impl<C> DependencyPatch<C> {
    /// Create an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: None,
            extras: BTreeMap::new(),
        }
    }

    /// Replace the client.
    #[must_use]
    pub fn client(self, client: C) -> Self {
        self.shared_client(Arc::new(client))
    }

    /// Replace the client with one that is already shared.
    #[must_use]
    pub fn shared_client(mut self, client: Arc<C>) -> Self {
        self.client = Some(client);
        self
    }

    /// Insert or override an extra payload.
    #[must_use]
    pub fn extra<T: Any + Send + Sync>(self, key: impl Into<String>, value: T) -> Self {
        self.shared_extra(key, Arc::new(value))
    }

    /// Insert or override an extra payload that is already shared.
    #[must_use]
    pub fn shared_extra(mut self, key: impl Into<String>, value: Extra) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.client.is_none() && self.extras.is_empty()
    }
}

impl<C> Default for DependencyPatch<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for DependencyPatch<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyPatch")
            .field("replaces_client", &self.client.is_some())
            .field("keys", &self.extras.keys().collect::<Vec<_>>())
            .finish()
    }
}
