//! Executable validation.
//!
//! Validation is stricter than a bare probe: the candidate is run with its
//! proof-of-life arguments (e.g. `-version`) and must exit with status zero.

use crate::process::{Launcher, ProbeOutput, ProbeResult};
use std::io;
use std::time::Duration;

/// Why a candidate executable was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The process could not be started (missing, not executable, ...).
    #[error("{0}")]
    Launch(#[source] io::Error),

    /// The process ran but did not exit with status zero.
    #[error("exited with {}{}", describe_code(*code), describe_stderr(stderr))]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// The process outlived the configured probe timeout.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    match stderr.trim().lines().last() {
        Some(line) if !line.is_empty() => format!(": {line}"),
        _ => String::new(),
    }
}

/// Run `program args...` and require a zero exit status.
///
/// Returns the captured output on success.
pub fn validate(
    launcher: &dyn Launcher,
    program: &str,
    args: &[String],
) -> Result<ProbeOutput, ValidationError> {
    let argv: Vec<String> = std::iter::once(program.to_string())
        .chain(args.iter().cloned())
        .collect();

    match launcher.probe(&argv) {
        ProbeResult::Completed(output) if output.success() => Ok(output),
        ProbeResult::Completed(output) => Err(ValidationError::NonZeroExit {
            code: output.code,
            stderr: output.stderr,
        }),
        ProbeResult::Failed(err) => Err(ValidationError::Launch(err)),
        ProbeResult::TimedOut(timeout) => Err(ValidationError::TimedOut(timeout)),
    }
}

/// Boolean form of [`validate`].
pub fn is_valid_exe(launcher: &dyn Launcher, program: &str, args: &[String]) -> bool {
    validate(launcher, program, args).is_ok()
}
