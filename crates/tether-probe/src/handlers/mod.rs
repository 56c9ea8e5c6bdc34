//! HTTP request handlers.

pub mod commands;
pub mod health;
pub mod status;
