//! dbactuator entry point.
//!
//! One invocation decodes a payload, loads and validates every requested
//! atom job, then runs them in order. The `debug` subcommand lists job
//! names or prints one job's parameter representation without executing
//! anything. All failures surface here as a message plus a nonzero exit:
//! 1 before any job executed, 2 when a job failed partway through.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::Parser;
use tracing::{error, info};

use actuator_core::{ActuatorError, ExecutionContext, JobManager, PayloadFormat};
use actuator_jobs::default_registry;

mod cli;
mod environ;
mod introspect;
mod tracing_setup;

use cli::{Cli, Command};

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    tracing_setup::install_tracing(&args.log_level);

    if let Err(e) = run(args).await {
        error!(error = %e, "dbactuator failed");
        eprintln!("{e}");
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(err: &ActuatorError) -> i32 {
    if err.is_pre_execution() {
        1
    } else {
        2
    }
}

async fn run(args: Cli) -> Result<(), ActuatorError> {
    let format: PayloadFormat = args.payload_format.parse()?;
    let registry = default_registry()?;
    let (payload, format) = resolve_payload(&args, format)?;

    if let Some(Command::Debug { action }) = &args.command {
        // introspection never touches the filesystem, so no directory
        // preparation here
        let working_dir = std::env::current_dir().map_err(|e| {
            ActuatorError::Config(format!("cannot resolve working directory: {e}"))
        })?;
        let ctx = ExecutionContext::new(
            &args.uid,
            &args.root_id,
            &args.node_id,
            &args.version_id,
            working_dir.clone(),
            working_dir.join("data"),
            working_dir.join("backup"),
        );
        return introspect::run(action, registry, ctx, payload.as_deref(), format);
    }

    let environ = environ::prepare(args.data_dir.clone(), args.backup_dir.clone())?;
    let ctx = ExecutionContext::new(
        &args.uid,
        &args.root_id,
        &args.node_id,
        &args.version_id,
        environ.working_dir,
        environ.data_dir,
        environ.backup_dir,
    );

    let raw = payload.ok_or_else(|| {
        ActuatorError::Config("no payload given, pass --payload or --payload-file".to_owned())
    })?;

    let mut manager = JobManager::new(ctx, registry, &raw, format, args.atom_job_list.as_deref())?;
    manager.load_atom_jobs()?;
    manager.run_atom_jobs().await?;

    info!(
        jobs = manager.run_report().len(),
        state = %manager.state(),
        "invocation finished"
    );
    Ok(())
}

/// The payload blob to decode: `--payload` as given, or the payload file's
/// contents wrapped in base64. File contents always come back with the
/// base64 format, whatever --payload-format said.
fn resolve_payload(
    args: &Cli,
    format: PayloadFormat,
) -> Result<(Option<String>, PayloadFormat), ActuatorError> {
    if args.payload.is_some() {
        return Ok((args.payload.clone(), format));
    }
    match &args.payload_file {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|e| {
                ActuatorError::Config(format!("cannot read payload file {}: {e}", path.display()))
            })?;
            info!(file = %path.display(), "using payload file");
            Ok((Some(STANDARD.encode(bytes)), PayloadFormat::Base64))
        }
        None => Ok((None, format)),
    }
}
