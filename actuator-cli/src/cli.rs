//! Command-line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Atomic database lifecycle jobs: decode a payload, validate every job
/// up front, then run them in order with fail-fast semantics.
#[derive(Debug, Parser)]
#[command(name = "dbactuator")]
pub struct Cli {
    /// Request (ticket) id, for log correlation.
    #[arg(short = 'U', long, default_value = "")]
    pub uid: String,

    /// Workflow root id, for log correlation.
    #[arg(short = 'R', long, default_value = "")]
    pub root_id: String,

    /// Workflow node id, for log correlation.
    #[arg(short = 'N', long, default_value = "")]
    pub node_id: String,

    /// Workflow version id, for log correlation.
    #[arg(short = 'V', long, default_value = "")]
    pub version_id: String,

    /// Request payload, encoded per --payload-format.
    #[arg(short = 'p', long)]
    pub payload: Option<String>,

    /// Payload encoding: base64 or raw.
    #[arg(short = 'm', long, default_value = "base64")]
    pub payload_format: String,

    /// Read the payload from a JSON file instead (testing convenience;
    /// --payload wins when both are given).
    #[arg(short = 'f', long)]
    pub payload_file: Option<PathBuf>,

    /// Explicit comma-separated job list, e.g. "install,replicaset_init".
    /// When absent, all resolvable payload keys run in payload order.
    #[arg(short = 'A', long)]
    pub atom_job_list: Option<String>,

    /// Data directory; defaults to ./data under the working directory,
    /// or DBACTUATOR_DATA_DIR.
    #[arg(short = 'D', long)]
    pub data_dir: Option<PathBuf>,

    /// Backup directory; defaults to ./backup under the working
    /// directory, or DBACTUATOR_BACKUP_DIR.
    #[arg(short = 'B', long)]
    pub backup_dir: Option<PathBuf>,

    /// Log level filter when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Introspection helpers; never execute jobs.
    Debug {
        #[command(subcommand)]
        action: DebugAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum DebugAction {
    /// List registered atom job names, one per line.
    List,
    /// Print a job's parameter representation as JSON: its bound values
    /// when a payload is given, its defaults otherwise.
    Param {
        /// Atom job name to describe.
        job: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_invocation() {
        let cli = Cli::try_parse_from([
            "dbactuator",
            "-U",
            "123",
            "-p",
            "eyJ9",
            "-A",
            "install,backup",
        ])
        .unwrap();
        assert_eq!(cli.uid, "123");
        assert_eq!(cli.payload.as_deref(), Some("eyJ9"));
        assert_eq!(cli.atom_job_list.as_deref(), Some("install,backup"));
        assert_eq!(cli.payload_format, "base64");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_debug_subcommands() {
        let cli = Cli::try_parse_from(["dbactuator", "debug", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Debug {
                action: DebugAction::List
            })
        ));

        let cli = Cli::try_parse_from(["dbactuator", "debug", "param", "install"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Debug {
                action: DebugAction::Param { ref job }
            }) if job == "install"
        ));
    }
}
