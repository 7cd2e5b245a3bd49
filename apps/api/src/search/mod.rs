//! Search lifecycle: the job store facade the service exposes, and the coordinator that
//! drives a search against it from the client side.

pub mod backend;
pub mod coordinator;
pub mod handlers;
pub mod ingest;
pub mod job_source;
pub mod store;
pub mod wire;

pub use backend::{BackendError, HttpSearchBackend, SearchBackend};
pub use coordinator::{CoordinatorError, SearchCoordinator, SearchPhase, SearchState};
