//! Attaching a facade's lifecycle to another value.
//!
//! [`Managed`] pairs an arbitrary base value with a facade. It derefs to the
//! base, so the base's own API stays available, and implements
//! [`Lifecycle`] by delegating to the facade.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tether_core::Status;

use crate::callable::Reply;
use crate::facade::Facade;
use crate::lifecycle::Lifecycle;
use crate::options::CloseOptions;

/// A base value decorated with a facade's lifecycle.
pub struct Managed<B, C> {
    base: B,
    facade: Facade<C>,
}

impl<B, C> Managed<B, C> {
    pub(crate) const fn new(base: B, facade: Facade<C>) -> Self {
        Self { base, facade }
    }

    /// The decorated value.
    #[must_use]
    pub const fn base(&self) -> &B {
        &self.base
    }

    /// The facade providing the lifecycle.
    #[must_use]
    pub const fn facade(&self) -> &Facade<C> {
        &self.facade
    }

    /// Split back into the base value and the facade.
    #[must_use]
    pub fn into_parts(self) -> (B, Facade<C>) {
        (self.base, self.facade)
    }
}

impl<B, C> Deref for Managed<B, C> {
    type Target = B;

    fn deref(&self) -> &B {
        &self.base
    }
}

impl<B, C> DerefMut for Managed<B, C> {
    fn deref_mut(&mut self) -> &mut B {
        &mut self.base
    }
}

impl<B, C> Lifecycle for Managed<B, C>
where
    C: Send + Sync + 'static,
{
    fn status(&self) -> Status {
        self.facade.status()
    }

    fn close(&self, options: CloseOptions) -> Reply<()> {
        self.facade.close(options)
    }

    fn is_healthy(&self) -> Reply<bool> {
        self.facade.is_healthy()
    }
}

impl<B: fmt::Debug, C> fmt::Debug for Managed<B, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Managed")
            .field("base", &self.base)
            .field("facade", &self.facade)
            .finish()
    }
}
