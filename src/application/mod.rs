//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod services;
pub mod views;

pub use error::{ApplicationError, ApplicationResult, IoResultExt};
pub use views::{normalize, View};
