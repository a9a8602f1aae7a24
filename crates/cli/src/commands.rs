//! Command handlers
//!
//! Handlers take the ports as trait objects so tests can drive them with
//! the mocks from `hostkit_core`.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Serialize, Serializer};

use hostkit_core::domain::parse_env_assignment;
use hostkit_core::port::{HttpFetcher, ProcessError, ProcessRunner};
use hostkit_core::{classify_address, AddressFamily, CommandSpec, HttpRequestSpec};

/// Exit status used when the CLI itself reports a negative outcome
pub const EXIT_FAILURE: i32 = 1;

/// How the child environment is built for `exec`
#[derive(Debug, Clone, Default)]
pub struct EnvOptions {
    /// Start from an empty environment instead of the caller's
    pub clear: bool,
    /// `KEY=VALUE` assignments applied on top
    pub assignments: Vec<String>,
}

/// Parameters of the `fetch` subcommand
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub host: String,
    pub port: u16,
    pub method: String,
    pub path: String,
    pub key_file: Option<String>,
    pub cert_file: Option<String>,
    pub timeout: Duration,
}

/// Result of a subcommand, rendered as text or JSON
#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Report {
    Exec {
        success: bool,
        exit_code: i32,
        #[serde(serialize_with = "lossy_utf8")]
        output: Vec<u8>,
    },
    Fetch {
        url: String,
        #[serde(serialize_with = "lossy_utf8_opt")]
        body: Option<Vec<u8>>,
    },
    IsIp {
        results: Vec<AddressReport>,
    },
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AddressReport {
    pub address: String,
    pub family: Option<AddressFamily>,
}

fn lossy_utf8<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

fn lossy_utf8_opt<S: Serializer>(
    bytes: &Option<Vec<u8>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match bytes {
        Some(bytes) => lossy_utf8(bytes, serializer),
        None => serializer.serialize_none(),
    }
}

impl Report {
    /// Process exit status for this report
    ///
    /// A failed child's code is passed through when it fits a process exit
    /// status; signal deaths (negative codes) map to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Report::Exec { exit_code, .. } => match *exit_code {
                0 => 0,
                code @ 1..=255 => code,
                _ => EXIT_FAILURE,
            },
            Report::Fetch { body, .. } => {
                if body.is_some() {
                    0
                } else {
                    EXIT_FAILURE
                }
            }
            Report::IsIp { results } => {
                if results.iter().all(|r| r.family.is_some()) {
                    0
                } else {
                    EXIT_FAILURE
                }
            }
        }
    }

    /// Human-readable rendering: payloads go to stdout untouched, status
    /// lines go to stderr
    pub fn write_text(&self, out: &mut impl Write, err: &mut impl Write) -> Result<()> {
        match self {
            Report::Exec {
                success: true,
                output,
                ..
            } => out.write_all(output)?,
            Report::Exec {
                exit_code, output, ..
            } => {
                err.write_all(output)?;
                writeln!(
                    err,
                    "{}",
                    format!("✗ Command exited with status {}", exit_code).red().bold()
                )?;
            }
            Report::Fetch {
                body: Some(body), ..
            } => out.write_all(body)?,
            Report::Fetch { url, body: None } => {
                writeln!(err, "{}", format!("✗ No response from {}", url).red().bold())?;
            }
            Report::IsIp { results } => {
                for result in results {
                    match result.family {
                        Some(family) => writeln!(
                            out,
                            "{}  {}",
                            result.address,
                            family.to_string().green()
                        )?,
                        None => writeln!(out, "{}  {}", result.address, "invalid".red())?,
                    }
                }
            }
        }
        Ok(())
    }

    pub fn write_json(&self, out: &mut impl Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)?;
        Ok(())
    }
}

/// Expand `~` in a user-supplied path
fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

/// Build the exact child environment, or `None` to inherit untouched
fn build_env(options: &EnvOptions) -> Result<Option<HashMap<String, String>>> {
    if !options.clear && options.assignments.is_empty() {
        return Ok(None);
    }

    let mut env: HashMap<String, String> = if options.clear {
        HashMap::new()
    } else {
        std::env::vars().collect()
    };

    for raw in &options.assignments {
        let (key, value) = parse_env_assignment(raw)?;
        env.insert(key, value);
    }

    Ok(Some(env))
}

/// `hostkit exec`
///
/// # Errors
/// Only when the command could not be run at all (empty argv, bad env
/// assignment, spawn failure). A non-zero exit is a report, not an error.
pub async fn exec(
    runner: &dyn ProcessRunner,
    argv: Vec<String>,
    cwd: Option<String>,
    env: &EnvOptions,
) -> Result<Report> {
    let mut spec = CommandSpec::new(argv)?;
    if let Some(dir) = cwd {
        spec = spec.with_cwd(expand_path(&dir));
    }
    if let Some(env) = build_env(env)? {
        spec = spec.with_env(env);
    }

    match runner.run(&spec).await {
        Ok(stdout) => Ok(Report::Exec {
            success: true,
            exit_code: 0,
            output: stdout,
        }),
        Err(ProcessError::ProcessFailed {
            exit_code, output, ..
        }) => Ok(Report::Exec {
            success: false,
            exit_code,
            output,
        }),
        Err(e) => Err(e).with_context(|| format!("Failed to run {}", spec.program())),
    }
}

/// `hostkit fetch`
pub async fn fetch(fetcher: &dyn HttpFetcher, options: FetchOptions) -> Report {
    let mut spec = HttpRequestSpec::new(options.host, options.port)
        .with_method(options.method)
        .with_path(options.path)
        .with_timeout(options.timeout);
    spec.key_file = options.key_file.as_deref().map(expand_path);
    spec.cert_file = options.cert_file.as_deref().map(expand_path);

    let body = fetcher.fetch(&spec).await;

    Report::Fetch {
        url: spec.url(),
        body,
    }
}

/// `hostkit is-ip`
pub fn is_ip(addresses: Vec<String>) -> Report {
    let results = addresses
        .into_iter()
        .map(|address| AddressReport {
            family: classify_address(&address),
            address,
        })
        .collect();

    Report::IsIp { results }
}
