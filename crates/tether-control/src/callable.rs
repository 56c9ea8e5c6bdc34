//! User-supplied functions and their replies.
//!
//! A [`Callable`] is a command, close override, or health check: a function
//! that receives the current dependency bundle plus one argument. It is
//! either synchronous or asynchronous, and invoking it yields a [`Reply`]
//! that keeps that distinction: a synchronous callable always produces
//! [`Reply::Ready`], never a deferred value.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::sync::Arc;

use futures::future::{self, BoxFuture, Either};
use serde_json::Value;
use tether_core::Dependencies;

use crate::error::{ControlError, Result};
use crate::options::CloseOptions;

type SyncFn<C, A, R> = dyn Fn(Arc<Dependencies<C>>, A) -> anyhow::Result<R> + Send + Sync;
type AsyncFn<C, A, R> =
    dyn Fn(Arc<Dependencies<C>>, A) -> BoxFuture<'static, anyhow::Result<R>> + Send + Sync;

/// A user command: JSON arguments in, JSON result out.
pub type Command<C> = Callable<C, Value, Value>;

/// A close override, invoked once when the facade starts closing.
pub type CloseFn<C> = Callable<C, CloseOptions, ()>;

/// A health check override, invoked only while the facade is `OPEN`.
pub type HealthCheck<C> = Callable<C, (), bool>;

/// A function of the current dependency bundle and one argument.
pub enum Callable<C, A, R> {
    /// Runs to completion on the caller's stack.
    Sync(Arc<SyncFn<C, A, R>>),
    /// Returns a future the caller drives.
    Async(Arc<AsyncFn<C, A, R>>),
}

impl<C, A, R> Callable<C, A, R> {
    /// Wrap a synchronous function.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Arc<Dependencies<C>>, A) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    /// Wrap an asynchronous function.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<Dependencies<C>>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        Self::Async(Arc::new(
            move |deps: Arc<Dependencies<C>>, arg: A| -> BoxFuture<'static, anyhow::Result<R>> {
                Box::pin(f(deps, arg))
            },
        ))
    }

    /// Returns true if invoking this callable yields a pending reply.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

impl<C, A, R> Callable<C, A, R>
where
    R: Send + 'static,
{
    /// Invoke with `deps`, tagging failures with `name`.
    pub(crate) fn invoke(&self, name: &str, deps: Arc<Dependencies<C>>, arg: A) -> Reply<R> {
        match self {
            Self::Sync(f) => {
                Reply::Ready(f(deps, arg).map_err(|source| ControlError::command(name, source)))
            }
            Self::Async(f) => {
                let pending = f(deps, arg);
                let name = name.to_owned();
                Reply::Pending(Box::pin(async move {
                    pending
                        .await
                        .map_err(|source| ControlError::command(name, source))
                }))
            }
        }
    }
}

impl<C, A, R> Clone for Callable<C, A, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(f) => Self::Sync(Arc::clone(f)),
            Self::Async(f) => Self::Async(Arc::clone(f)),
        }
    }
}

impl<C, A, R> fmt::Debug for Callable<C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Callable::Sync"),
            Self::Async(_) => f.write_str("Callable::Async"),
        }
    }
}

/// The outcome of invoking a facade operation.
///
/// `Ready` carries a result that was produced synchronously; `Pending`
/// carries a future that must be awaited. Either variant can be awaited.
#[must_use = "a pending reply does nothing unless awaited"]
pub enum Reply<T> {
    /// The operation already completed.
    Ready(Result<T>),
    /// The operation completes when the future resolves.
    Pending(BoxFuture<'static, Result<T>>),
}

impl<T> Reply<T> {
    /// A successful, already completed reply.
    pub const fn ok(value: T) -> Self {
        Self::Ready(Ok(value))
    }

    /// Returns true if the reply completed synchronously.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns true if the reply must be awaited.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Take a synchronous result, or get the pending reply back.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` if the reply is pending.
    pub fn try_ready(self) -> std::result::Result<Result<T>, Self> {
        match self {
            Self::Ready(result) => Ok(result),
            pending @ Self::Pending(_) => Err(pending),
        }
    }
}

impl<T> Reply<T>
where
    T: Send + 'static,
{
    /// Chain a synchronous step after a successful result.
    ///
    /// A ready reply stays ready; a pending reply runs `f` once its future
    /// resolves.
    pub fn and_then<U, F>(self, f: F) -> Reply<U>
    where
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        match self {
            Self::Ready(result) => Reply::Ready(result.and_then(f)),
            Self::Pending(pending) => Reply::Pending(Box::pin(async move { pending.await.and_then(f) })),
        }
    }
}

impl<T> IntoFuture for Reply<T> {
    type Output = Result<T>;
    type IntoFuture = Either<future::Ready<Result<T>>, BoxFuture<'static, Result<T>>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Ready(result) => Either::Left(future::ready(result)),
            Self::Pending(pending) => Either::Right(pending),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Reply<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}
