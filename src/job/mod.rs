//! Job lifecycle: data model, store and the controlling state machine.

pub mod controller;
pub mod store;
pub mod types;

pub use controller::JobController;
pub use store::{InMemoryJobStore, JobStore};
pub use types::{Job, JobId, JobStatus};
