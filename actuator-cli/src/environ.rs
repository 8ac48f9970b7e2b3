//! Process environment preparation: working, data and backup directories.

use std::path::PathBuf;

use actuator_core::ActuatorError;

pub const DATA_DIR_ENV: &str = "DBACTUATOR_DATA_DIR";
pub const BACKUP_DIR_ENV: &str = "DBACTUATOR_BACKUP_DIR";

/// Directories established once before any job loads; read-only for the
/// rest of the process.
#[derive(Debug, Clone)]
pub struct Environ {
    pub working_dir: PathBuf,
    pub data_dir: PathBuf,
    pub backup_dir: PathBuf,
}

/// Resolve and create the directory layout.
///
/// Precedence per directory: CLI flag, then environment variable, then a
/// default under the working directory. A path that exists but is not a
/// directory is a configuration error.
pub fn prepare(
    data_dir: Option<PathBuf>,
    backup_dir: Option<PathBuf>,
) -> Result<Environ, ActuatorError> {
    let working_dir = std::env::current_dir()
        .map_err(|e| ActuatorError::Config(format!("cannot resolve working directory: {e}")))?;

    let data_dir = resolve_dir(data_dir, DATA_DIR_ENV, working_dir.join("data"))?;
    let backup_dir = resolve_dir(backup_dir, BACKUP_DIR_ENV, working_dir.join("backup"))?;

    Ok(Environ {
        working_dir,
        data_dir,
        backup_dir,
    })
}

fn resolve_dir(
    flag: Option<PathBuf>,
    env_var: &str,
    default: PathBuf,
) -> Result<PathBuf, ActuatorError> {
    let dir = flag
        .or_else(|| std::env::var_os(env_var).map(PathBuf::from))
        .unwrap_or(default);

    if dir.exists() && !dir.is_dir() {
        return Err(ActuatorError::Config(format!(
            "{} exists but is not a directory",
            dir.display()
        )));
    }
    std::fs::create_dir_all(&dir)
        .map_err(|e| ActuatorError::Config(format!("cannot create {}: {e}", dir.display())))?;
    Ok(dir)
}
