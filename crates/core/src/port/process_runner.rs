// Process Runner Port
// Abstraction for running an external command to completion

use crate::domain::CommandSpec;
use async_trait::async_trait;
use thiserror::Error;

/// Process execution errors
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error while waiting for child: {0}")]
    Io(#[from] std::io::Error),

    /// The child ran and exited non-zero
    ///
    /// `output` is stdout followed by stderr. On unix a child killed by a
    /// signal reports `-signo` as its exit code.
    #[error("Command {command:?} returned non-zero exit status {exit_code}")]
    ProcessFailed {
        command: Vec<String>,
        exit_code: i32,
        output: Vec<u8>,
    },
}

impl ProcessError {
    /// Exit code when the child ran and failed
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessError::ProcessFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Combined stdout and stderr when the child ran and failed
    pub fn output(&self) -> Option<&[u8]> {
        match self {
            ProcessError::ProcessFailed { output, .. } => Some(output.as_slice()),
            _ => None,
        }
    }

    pub fn output_lossy(&self) -> Option<String> {
        self.output()
            .map(|out| String::from_utf8_lossy(out).into_owned())
    }
}

/// Process Runner trait
///
/// Implementations:
/// - SubprocessRunner: spawns the program directly (no shell)
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the command and wait for it to exit
    ///
    /// Returns stdout when the exit code is 0; stderr is discarded on
    /// that path.
    ///
    /// # Errors
    /// - ProcessError::SpawnFailed if the program cannot be started
    /// - ProcessError::Io if waiting on the child fails
    /// - ProcessError::ProcessFailed if the exit code is non-zero
    async fn run(&self, spec: &CommandSpec) -> Result<Vec<u8>, ProcessError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit 0 with this stdout
        Succeed(Vec<u8>),
        /// Exit non-zero with this combined output
        Fail { exit_code: i32, output: Vec<u8> },
    }

    /// Mock Process Runner for testing
    pub struct MockProcessRunner {
        behavior: Arc<Mutex<MockBehavior>>,
        calls: Arc<Mutex<Vec<CommandSpec>>>,
    }

    impl MockProcessRunner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success(stdout: impl Into<Vec<u8>>) -> Self {
            Self::new(MockBehavior::Succeed(stdout.into()))
        }

        pub fn new_fail(exit_code: i32, output: impl Into<Vec<u8>>) -> Self {
            Self::new(MockBehavior::Fail {
                exit_code,
                output: output.into(),
            })
        }

        pub fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for MockProcessRunner {
        async fn run(&self, spec: &CommandSpec) -> Result<Vec<u8>, ProcessError> {
            self.calls.lock().unwrap().push(spec.clone());

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Succeed(stdout) => Ok(stdout),
                MockBehavior::Fail { exit_code, output } => Err(ProcessError::ProcessFailed {
                    command: spec.argv().to_vec(),
                    exit_code,
                    output,
                }),
            }
        }
    }
}
