//! Concrete atomic job implementations for dbactuator.
//!
//! Each job type implements the [`AtomJob`](actuator_core::AtomJob)
//! capability set: typed parameters with structural validation at bind
//! time, and a single-shot run against the execution context.
//!
//! # Job types
//!
//! - `os_init` - prepare the data/backup directory layout
//! - `install` - lay down an instance directory and render its config
//! - `replicaset_init` - write the replica set manifest
//! - `backup` - archive an instance via the selected backup strategy
//! - `restore` - put an archive's files back into an instance directory
//! - `remove` - tear down an instance directory
//!
//! Registration is an explicit startup step; nothing self-registers at
//! import time.

mod backup;
mod common;
mod install;
mod os_init;
mod remove;
mod replicaset_init;
mod restore;
mod strategy;

pub use backup::BackupJob;
pub use install::InstallJob;
pub use os_init::OsInitJob;
pub use remove::RemoveJob;
pub use replicaset_init::ReplicaSetInitJob;
pub use restore::RestoreJob;
pub use strategy::{backup_executor, BackupExecutor, BackupReport};

use actuator_core::{ActuatorError, JobRegistry};

/// Job name constants for type-safe references.
pub mod job_names {
    pub const OS_INIT: &str = "os_init";
    pub const INSTALL: &str = "install";
    pub const REPLICASET_INIT: &str = "replicaset_init";
    pub const BACKUP: &str = "backup";
    pub const RESTORE: &str = "restore";
    pub const REMOVE: &str = "remove";
}

/// Build the registry with every supported job factory.
///
/// A duplicate name here is a programming error and surfaces as a
/// configuration failure at startup.
pub fn default_registry() -> Result<JobRegistry, ActuatorError> {
    let mut registry = JobRegistry::new();
    registry.register(job_names::OS_INIT, || Box::new(OsInitJob::default()))?;
    registry.register(job_names::INSTALL, || Box::new(InstallJob::default()))?;
    registry.register(job_names::REPLICASET_INIT, || {
        Box::new(ReplicaSetInitJob::default())
    })?;
    registry.register(job_names::BACKUP, || Box::new(BackupJob::default()))?;
    registry.register(job_names::RESTORE, || Box::new(RestoreJob::default()))?;
    registry.register(job_names::REMOVE, || Box::new(RemoveJob::default()))?;
    Ok(registry)
}
