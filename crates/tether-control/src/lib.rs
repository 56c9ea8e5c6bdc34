//! Lifecycle-managed client facades.
//!
//! This crate wraps an arbitrary client handle together with a dictionary of
//! commands into a [`Facade`]. Each command receives the current dependency
//! bundle as its first argument. The facade adds three lifecycle operations
//! through the [`Lifecycle`] trait: `close`, `is_healthy` and `status`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          Facade                          │
//! │  ┌────────────────┐   ┌──────────────────────────────┐   │
//! │  │ BoundCommands  │   │     LifecycleController      │   │
//! │  │ (user commands)│   │  close / is_healthy / status │   │
//! │  └───────┬────────┘   └──────────────┬───────────────┘   │
//! └──────────┼───────────────────────────┼───────────────────┘
//!            │ read                      │ read + transition
//!            ▼                           ▼
//!     ┌─────────────────────────────────────────────┐
//!     │   DependencyStore (client, extras, status)  │
//!     └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use serde_json::json;
//! use tether_control::{Callable, CloseOptions, Definition, DependencySpec, Lifecycle, Status};
//!
//! # async fn example() -> Result<(), tether_control::ControlError> {
//! let facade = Definition::new()
//!     .kind("echo")
//!     .dependencies(DependencySpec::new().client(()))
//!     .command("echo", Callable::sync(|_deps, args| Ok(args)))
//!     .build()?;
//!
//! assert_eq!(facade.status(), Status::Open);
//! assert_eq!(facade.call("echo", json!("hi")).await?, json!("hi"));
//!
//! facade.close(CloseOptions::new()).await?;
//! assert_eq!(facade.status(), Status::Closed);
//! assert!(!facade.is_healthy().await?);
//! # Ok(())
//! # }
//! ```
//!
//! # Synchronous and asynchronous functions
//!
//! Commands and overrides are [`Callable`]s, either synchronous or
//! asynchronous. Invoking one yields a [`Reply`]: synchronous callables
//! always produce [`Reply::Ready`], which can be read without an executor
//! via [`Reply::try_ready`]. Both variants can be awaited.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod callable;
pub mod definition;
pub mod error;
pub mod facade;
pub mod lifecycle;
pub mod managed;
pub mod options;

pub use callable::{Callable, CloseFn, Command, HealthCheck, Reply};
pub use definition::Definition;
pub use error::{ControlError, Result};
pub use facade::{BoundCommand, Facade};
pub use lifecycle::{Lifecycle, LifecycleController, LIFECYCLE_OPERATIONS};
pub use managed::Managed;
pub use options::CloseOptions;

// Re-export commonly used types from dependencies for convenience
pub use tether_core::{Dependencies, DependencyPatch, DependencySpec, Status};
pub use tether_store::{DependencyStore, SharedStore};
