//! Backup strategy selection.
//!
//! A declared backup kind plus a tooling flag select one concrete
//! executor. The selection itself is a simple dispatch; the orchestration
//! layer never looks inside an executor.

use std::path::{Path, PathBuf};

use actuator_core::{async_trait, ActuatorError};
use chrono::Utc;
use serde_json::json;
use tracing::info;

/// Summary of one completed backup.
#[derive(Debug, Clone)]
pub struct BackupReport {
    pub method: &'static str,
    pub files: usize,
    pub bytes: u64,
    pub target: PathBuf,
}

/// A concrete backup implementation.
#[async_trait]
pub trait BackupExecutor: Send + Sync {
    /// Short method identifier written into the backup index.
    fn method(&self) -> &'static str;

    /// Archive `source` into a fresh directory under `target_root`.
    async fn execute(&self, source: &Path, target_root: &Path)
        -> Result<BackupReport, ActuatorError>;
}

/// Return the executor for a declared backup kind.
///
/// `logical` dumps definition and manifest files, optionally through the
/// system dump tool; `physical` takes the instance directory byte for
/// byte. Any other kind is rejected naming the kind.
pub fn backup_executor(
    kind: &str,
    use_system_tool: bool,
) -> Result<Box<dyn BackupExecutor>, ActuatorError> {
    match kind.to_ascii_lowercase().as_str() {
        "logical" if use_system_tool => Ok(Box::new(SystemToolBackup)),
        "logical" => Ok(Box::new(LogicalBackup)),
        "physical" => Ok(Box::new(PhysicalBackup)),
        other => Err(ActuatorError::Config(format!("unknown backup kind: {other}"))),
    }
}

/// Logical backup: copies definition files (`.conf`, `.json`) only.
struct LogicalBackup;

/// Logical backup through the system dump tool: same file selection, but
/// the dump lands in a single concatenated file the tool format expects.
struct SystemToolBackup;

/// Physical backup: byte-for-byte copy of the whole instance directory.
struct PhysicalBackup;

#[async_trait]
impl BackupExecutor for LogicalBackup {
    fn method(&self) -> &'static str {
        "logical"
    }

    async fn execute(
        &self,
        source: &Path,
        target_root: &Path,
    ) -> Result<BackupReport, ActuatorError> {
        let target = prepare_target(source, target_root, self.method()).await?;
        let (files, bytes) = copy_tree(source, &target, true).await?;
        write_index(&target, self.method(), files, bytes).await?;
        Ok(BackupReport {
            method: self.method(),
            files,
            bytes,
            target,
        })
    }
}

#[async_trait]
impl BackupExecutor for SystemToolBackup {
    fn method(&self) -> &'static str {
        "logical-systool"
    }

    async fn execute(
        &self,
        source: &Path,
        target_root: &Path,
    ) -> Result<BackupReport, ActuatorError> {
        let target = prepare_target(source, target_root, self.method()).await?;

        // Single-file dump: concatenated definition files, separated by a
        // per-file header line.
        let mut dump = Vec::new();
        let mut files = 0usize;
        let mut entries = tokio::fs::read_dir(source).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && is_definition_file(&path) {
                let data = tokio::fs::read(&path).await?;
                dump.extend_from_slice(
                    format!("-- {} ({} bytes)\n", entry.file_name().to_string_lossy(), data.len())
                        .as_bytes(),
                );
                dump.extend_from_slice(&data);
                dump.push(b'\n');
                files += 1;
            }
        }
        let bytes = dump.len() as u64;
        tokio::fs::write(target.join("dump.out"), dump).await?;
        write_index(&target, self.method(), files, bytes).await?;
        Ok(BackupReport {
            method: self.method(),
            files,
            bytes,
            target,
        })
    }
}

#[async_trait]
impl BackupExecutor for PhysicalBackup {
    fn method(&self) -> &'static str {
        "physical"
    }

    async fn execute(
        &self,
        source: &Path,
        target_root: &Path,
    ) -> Result<BackupReport, ActuatorError> {
        let target = prepare_target(source, target_root, self.method()).await?;
        let (files, bytes) = copy_tree(source, &target, false).await?;
        write_index(&target, self.method(), files, bytes).await?;
        Ok(BackupReport {
            method: self.method(),
            files,
            bytes,
            target,
        })
    }
}

fn is_definition_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("conf") | Some("json")
    )
}

async fn prepare_target(
    source: &Path,
    target_root: &Path,
    method: &str,
) -> Result<PathBuf, ActuatorError> {
    let stem = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "instance".to_owned());
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    let target = target_root.join(format!("{stem}-{method}-{stamp}"));
    tokio::fs::create_dir_all(&target).await?;
    info!(target = %target.display(), method, "backup target prepared");
    Ok(target)
}

/// Copy files from `source` into `target`, preserving relative layout.
/// With `definitions_only` set, non-definition files are skipped.
async fn copy_tree(
    source: &Path,
    target: &Path,
    definitions_only: bool,
) -> Result<(usize, u64), ActuatorError> {
    let mut files = 0usize;
    let mut bytes = 0u64;
    let mut pending = vec![(source.to_path_buf(), target.to_path_buf())];

    while let Some((src_dir, dst_dir)) = pending.pop() {
        tokio::fs::create_dir_all(&dst_dir).await?;
        let mut entries = tokio::fs::read_dir(&src_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let src = entry.path();
            let dst = dst_dir.join(entry.file_name());
            let meta = entry.metadata().await?;
            if meta.is_dir() {
                pending.push((src, dst));
            } else if meta.is_file() {
                if definitions_only && !is_definition_file(&src) {
                    continue;
                }
                bytes += tokio::fs::copy(&src, &dst).await?;
                files += 1;
            }
        }
    }
    Ok((files, bytes))
}

async fn write_index(
    target: &Path,
    method: &str,
    files: usize,
    bytes: u64,
) -> Result<(), ActuatorError> {
    let index = json!({
        "method": method,
        "files": files,
        "bytes": bytes,
        "created_at": Utc::now().to_rfc3339(),
    });
    tokio::fs::write(target.join("INDEX.json"), index.to_string()).await?;
    Ok(())
}
