//! Shared data model and store/queue ports for the code review orchestrator.
//!
//! This crate holds no I/O: every other crate in the workspace depends on it
//! for the wire-level shapes (`RequestRecord`, `TaskRecord`, `Rule`, ...) and
//! for the narrow port traits (`RequestStore`, `TaskStore`, ...) that decouple
//! the pipeline from any particular store/queue backend.

pub mod errors;
pub mod model;
pub mod ports;
pub mod targets;

pub use errors::{OrchestratorError, OrchestratorResult};
pub use model::*;
pub use ports::*;
