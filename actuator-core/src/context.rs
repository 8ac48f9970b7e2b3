//! Execution context shared with every atom job.

use std::path::{Path, PathBuf};

/// Read-only identifying and environment bundle for one invocation.
///
/// The identifiers are opaque correlation fields threaded through for
/// logging; they carry no orchestration semantics. The directories are
/// established once before any job is loaded and are never mutated
/// afterwards.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    request_id: String,
    root_id: String,
    node_id: String,
    version_id: String,
    working_dir: PathBuf,
    data_dir: PathBuf,
    backup_dir: PathBuf,
}

impl ExecutionContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        request_id: impl Into<String>,
        root_id: impl Into<String>,
        node_id: impl Into<String>,
        version_id: impl Into<String>,
        working_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            root_id: root_id.into(),
            node_id: node_id.into(),
            version_id: version_id.into(),
            working_dir: working_dir.into(),
            data_dir: data_dir.into(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }
}
