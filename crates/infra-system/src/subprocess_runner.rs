// Subprocess runner implementation
// reason: tokio::process so callers on the runtime never block a worker thread
use async_trait::async_trait;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};

use hostkit_core::domain::CommandSpec;
use hostkit_core::port::process_runner::{ProcessError, ProcessRunner};

/// Subprocess runner
///
/// Spawns `argv[0]` directly with the remaining arguments; there is no shell
/// in between. Stdout and stderr are captured into separate buffers and
/// stdin is closed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    /// Create a new subprocess runner
    ///
    /// # Example
    /// ```ignore
    /// let runner = SubprocessRunner::new();
    /// let stdout = runner.run(&CommandSpec::new(["git", "rev-parse", "HEAD"])?).await?;
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Translate a CommandSpec into a tokio command
    ///
    /// A set environment replaces the caller's wholesale (no merge).
    fn build_command(spec: &CommandSpec) -> Command {
        let mut command = Command::new(spec.program());
        command
            .args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = spec.cwd() {
            command.current_dir(dir);
        }

        if let Some(env) = spec.env() {
            command.env_clear().envs(env);
        }

        command
    }

    /// Spawn child process and wait for both pipes to drain
    async fn spawn_and_wait(spec: &CommandSpec) -> Result<Output, ProcessError> {
        let child = Self::build_command(spec)
            .spawn()
            .map_err(|source| ProcessError::SpawnFailed {
                program: spec.program().to_string(),
                source,
            })?;

        Ok(child.wait_with_output().await?)
    }

    /// Map process output to the success/failure contract
    fn build_result(spec: &CommandSpec, output: Output) -> Result<Vec<u8>, ProcessError> {
        if output.status.success() {
            return Ok(output.stdout);
        }

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        Err(ProcessError::ProcessFailed {
            command: spec.argv().to_vec(),
            exit_code: exit_code(output.status),
            output: combined,
        })
    }
}

/// Numeric exit code; `-signo` when the child died from a signal
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

#[async_trait]
impl ProcessRunner for SubprocessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<Vec<u8>, ProcessError> {
        let started = Instant::now();

        info!(
            program = %spec.program(),
            args = ?spec.args(),
            cwd = ?spec.cwd(),
            inherit_env = spec.env().is_none(),
            "Starting subprocess"
        );

        let output = Self::spawn_and_wait(spec).await?;
        let code = exit_code(output.status);

        info!(
            program = %spec.program(),
            exit_code = code,
            duration_ms = started.elapsed().as_millis() as u64,
            "Subprocess completed"
        );
        debug!(
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "Subprocess output captured"
        );

        Self::build_result(spec, output)
    }
}
