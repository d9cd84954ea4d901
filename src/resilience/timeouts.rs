//! Timeout enforcement for external commands.
//!
//! # Responsibilities
//! - Run probe and switch commands with a hard deadline
//! - Kill the child process when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from spawn errors

use std::process::Output;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time;

/// An external command could not produce output.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

/// Run `command` to completion, killing it if `timeout` elapses first.
pub async fn output_with_timeout(
    command: &mut Command,
    timeout: Duration,
) -> Result<Output, CommandError> {
    let program = command.as_std().get_program().to_string_lossy().into_owned();
    command.kill_on_drop(true);

    match time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(CommandError::Spawn { program, source }),
        Err(_) => Err(CommandError::TimedOut { program, timeout }),
    }
}
