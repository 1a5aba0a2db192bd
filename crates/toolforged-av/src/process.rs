//! Subprocess probing.
//!
//! A probe runs a command line to completion with stdin closed and both output
//! streams captured, and reports whether the process could be run at all. It
//! does not judge the exit status; see [`crate::validate`] for that.

use std::io;
use std::process::{Command, Output, Stdio};
use std::time::Duration;

/// Output captured from a probe that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutput {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ProbeOutput {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for ProbeOutput {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Outcome of a probe.
#[derive(Debug)]
pub enum ProbeResult {
    /// The process ran to completion, whatever its exit status.
    Completed(ProbeOutput),
    /// The process could not be spawned or waited on.
    Failed(io::Error),
    /// A probe timeout was configured and the process (or something still
    /// holding its output pipes) outlived it.
    TimedOut(Duration),
}

impl ProbeResult {
    /// True when the process was spawned and ran to completion.
    pub fn ok(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The spawn or wait error, if any.
    pub fn error(&self) -> Option<&io::Error> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Captured output, if the process completed.
    pub fn output(&self) -> Option<&ProbeOutput> {
        match self {
            Self::Completed(output) => Some(output),
            _ => None,
        }
    }
}

/// Something that can run a probe command line.
///
/// The resolver only talks to the OS through this trait, so tests can swap in
/// a scripted implementation.
pub trait Launcher: Send + Sync {
    /// Run `argv` (program followed by its arguments) and report the outcome.
    fn probe(&self, argv: &[String]) -> ProbeResult;
}

/// [`Launcher`] that spawns real processes.
///
/// On Windows the child gets no console window and its own process group, so
/// a Ctrl+C in the parent's console is not delivered to it. On Unix the child
/// is placed in its own process group for the same reason, and a probe that
/// times out has that whole group killed.
///
/// Probes block the calling thread on a private current-thread runtime, so
/// they must not be issued from inside another tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct SystemLauncher {
    timeout: Option<Duration>,
}

impl SystemLauncher {
    /// Launcher that waits for probes without a time limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Launcher that kills probes running longer than `timeout`.
    ///
    /// `None` waits indefinitely.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// The configured probe timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Launcher for SystemLauncher {
    fn probe(&self, argv: &[String]) -> ProbeResult {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => return ProbeResult::Failed(err),
        };

        let result = runtime.block_on(run(argv, self.timeout));

        #[cfg(feature = "tracing")]
        log_result(argv, &result);

        result
    }
}

#[cfg(feature = "tracing")]
fn log_result(argv: &[String], result: &ProbeResult) {
    match result {
        ProbeResult::Completed(output) => {
            tracing::debug!("probe {:?} exited with code {:?}", argv, output.code);
        }
        ProbeResult::Failed(err) => tracing::debug!("probe {:?} failed: {}", argv, err),
        ProbeResult::TimedOut(t) => tracing::debug!("probe {:?} timed out after {:?}", argv, t),
    }
}

/// Run `argv` with a [`SystemLauncher`] that has no timeout.
pub fn probe(argv: &[String]) -> ProbeResult {
    SystemLauncher::new().probe(argv)
}

async fn run(argv: &[String], timeout: Option<Duration>) -> ProbeResult {
    let mut cmd = match build_command(argv) {
        Ok(cmd) => tokio::process::Command::from(cmd),
        Err(err) => return ProbeResult::Failed(err),
    };
    cmd.kill_on_drop(true);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => return ProbeResult::Failed(err),
    };

    let Some(timeout) = timeout else {
        return match child.wait_with_output().await {
            Ok(output) => ProbeResult::Completed(output.into()),
            Err(err) => ProbeResult::Failed(err),
        };
    };

    // The child leads its own process group, so its pid is the group id.
    let group = child.id();

    // `wait_with_output` also waits for both pipes to close, so a background
    // grandchild holding them keeps this pending until the deadline.
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => ProbeResult::Completed(output.into()),
        Ok(Err(err)) => ProbeResult::Failed(err),
        Err(_elapsed) => {
            // Dropping the future already killed the direct child.
            kill_process_group(group);
            ProbeResult::TimedOut(timeout)
        }
    }
}

fn build_command(argv: &[String]) -> io::Result<Command> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    configure_launch(&mut cmd);
    Ok(cmd)
}

#[cfg(unix)]
fn configure_launch(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(windows)]
fn configure_launch(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn configure_launch(_cmd: &mut Command) {}

/// SIGKILL every process left in the probe's group.
#[cfg(unix)]
fn kill_process_group(group: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pgid) = group.and_then(|id| i32::try_from(id).ok()) else {
        return;
    };

    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        // Group already empty.
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("failed to kill process group {}: {}", pgid, _err);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_group: Option<u32>) {}
