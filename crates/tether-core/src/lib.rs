//! Core types for tether.
//!
//! This crate provides the foundational types shared by the tether crates:
//!
//! - **Status**: the `OPEN → CLOSING → CLOSED` lifecycle state machine
//! - **Dependencies**: the immutable dependency bundle handed to every command
//! - **Error types**: validation errors shared across crates
//!
//! # Example
//!
//! ```
//! use tether_core::{DependencySpec, Status};
//!
//! let deps = DependencySpec::new()
//!     .client(String::from("postgres://localhost/app"))
//!     .extra("schema", "public")
//!     .into_dependencies(Status::Open)
//!     .unwrap();
//!
//! assert_eq!(deps.client().as_str(), "postgres://localhost/app");
//! assert_eq!(deps.get::<&str>("schema"), Some(&"public"));
//! assert_eq!(deps.status(), Status::Open);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod deps;
pub mod error;
pub mod status;

pub use deps::{is_reserved_key, Dependencies, DependencyPatch, DependencySpec, Extra, RESERVED_KEYS};
pub use error::{CoreError, Result};
pub use status::Status;
