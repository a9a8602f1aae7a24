// Command Domain Model

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::error::{DomainError, Result};

/// Description of an external command to run.
///
/// The argument vector is handed to the OS as-is: no shell is involved, so
/// arguments are never re-split or re-quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    argv: Vec<String>,
    cwd: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl CommandSpec {
    /// Create a command spec from an argv-style vector
    ///
    /// `argv[0]` is the program; the child inherits the caller's working
    /// directory and environment until told otherwise.
    ///
    /// # Errors
    /// - DomainError::EmptyCommand if `argv` is empty
    ///
    /// # Example
    /// ```
    /// use hostkit_core::CommandSpec;
    ///
    /// let spec = CommandSpec::new(["git", "status", "--short"]).unwrap();
    /// assert_eq!(spec.program(), "git");
    /// assert_eq!(spec.args(), ["status", "--short"]);
    /// ```
    pub fn new<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        if argv.is_empty() {
            return Err(DomainError::EmptyCommand);
        }

        Ok(Self {
            argv,
            cwd: None,
            env: None,
        })
    }

    /// Run the child in `dir` instead of the caller's working directory
    pub fn with_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Replace the child's environment with exactly `env`
    ///
    /// No variable of the caller leaks through; an empty map yields an
    /// empty environment.
    pub fn with_env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            env.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Go back to inheriting the caller's full environment
    pub fn inherit_env(mut self) -> Self {
        self.env = None;
        self
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Working directory, `None` when inherited
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Exact child environment, `None` when inherited
    pub fn env(&self) -> Option<&HashMap<String, String>> {
        self.env.as_ref()
    }
}

/// Parse a `KEY=VALUE` assignment
///
/// The value may itself contain `=`; only the first one splits.
pub fn parse_env_assignment(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(DomainError::InvalidEnvAssignment(raw.to_string())),
    }
}
