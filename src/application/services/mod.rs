//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, PyramidApi)
//! but are themselves concrete structs, not traits.

mod pyramid;
mod session;

pub use pyramid::{PyramidReport, PyramidService};
pub use session::SessionService;
