//! Core types and refresh wiring for the Omrin waste collection integration.

/// Refresh coordinator owning the session, cached key, and last summary.
pub mod coordinator;
/// Domain models shared by the provider and the host.
pub mod model;
/// Traits describing the provider interface.
pub mod ports;
/// Pure lookups over a fetched calendar.
pub mod query;
/// Sensor entities derived from a collection summary.
pub mod sensor;
/// Session and configuration values constructed once at startup.
pub mod session;
/// Per-category and per-day answers computed from a calendar.
pub mod summary;

pub use coordinator::*;
pub use model::*;
pub use ports::*;
pub use query::*;
pub use sensor::*;
pub use session::*;
pub use summary::*;
