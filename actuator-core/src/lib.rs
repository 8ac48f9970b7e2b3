//! Orchestration core for dbactuator.
//!
//! Given a request payload mapping atom job names to parameters, this crate
//! resolves each name against a registry of implementations, binds and
//! validates parameters up front, and executes the jobs strictly in order
//! with fail-fast semantics.
//!
//! # Architecture
//!
//! - [`RequestPayload`] - decoded payload, job name to raw parameters
//! - [`JobRegistry`] - name to factory table, built once at startup
//! - [`AtomJob`] - the capability set every atomic job implements
//! - [`JobManager`] - load (atomic) then run (sequential, fail-fast)
//! - [`JobRun`] - per-job run record for reporting
//!
//! Loading is strictly separated from running: execution never starts
//! against a partially resolved plan. Already-completed jobs are never
//! rolled back after a later failure; recovery is an operational concern.

mod context;
mod error;
mod job;
mod manager;
mod payload;
mod registry;
mod types;

pub use context::ExecutionContext;
pub use error::ActuatorError;
pub use job::{AtomJob, JobFactory, NoopJob};
pub use manager::JobManager;
pub use payload::{PayloadFormat, RequestPayload};
pub use registry::JobRegistry;
pub use types::{JobRun, JobStatus, ManagerState};

// Re-export async_trait for convenience when implementing AtomJob
pub use async_trait::async_trait;
