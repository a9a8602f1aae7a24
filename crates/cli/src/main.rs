//! Hostkit CLI - run commands, probe HTTP endpoints, check addresses

mod commands;
mod logging;

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use commands::{EnvOptions, FetchOptions, Report};
use hostkit_core::constants::{DEFAULT_HTTP_METHOD, DEFAULT_HTTP_PATH, DEFAULT_HTTP_TIMEOUT_SECS};
use hostkit_infra_http::ReqwestFetcher;
use hostkit_infra_system::SubprocessRunner;

#[derive(Parser)]
#[command(name = "hostkit")]
#[command(about = "Hostkit server utilities", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Log format (pretty or json)
    #[arg(long, env = "HOSTKIT_LOG_FORMAT", default_value = "pretty", global = true)]
    log_format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command (no shell) and print its output
    Exec {
        /// Working directory for the command
        #[arg(long)]
        cwd: Option<String>,

        /// Start the command with an empty environment
        #[arg(long)]
        clear_env: bool,

        /// Environment assignment KEY=VALUE (repeatable)
        #[arg(long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Program and arguments
        #[arg(required = true, last = true)]
        argv: Vec<String>,
    },

    /// Issue one HTTP request and print the body of a 200 response
    Fetch {
        /// Server host name or IP address
        #[arg(long)]
        host: String,

        /// Server port
        #[arg(long)]
        port: u16,

        /// HTTP method
        #[arg(long, default_value = DEFAULT_HTTP_METHOD)]
        method: String,

        /// Request path
        #[arg(long, default_value = DEFAULT_HTTP_PATH)]
        path: String,

        /// PEM client key (HTTPS only together with --cert-file)
        #[arg(long, env = "HOSTKIT_KEY_FILE")]
        key_file: Option<String>,

        /// PEM client certificate (HTTPS only together with --key-file)
        #[arg(long, env = "HOSTKIT_CERT_FILE")]
        cert_file: Option<String>,

        /// Request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
        timeout_secs: u64,
    },

    /// Check whether each argument is an IPv4 or IPv6 address
    IsIp {
        /// Candidate addresses
        #[arg(required = true)]
        addresses: Vec<String>,
    },
}

async fn dispatch(command: Commands) -> Result<Report> {
    match command {
        Commands::Exec {
            cwd,
            clear_env,
            env,
            argv,
        } => {
            let runner = SubprocessRunner::new();
            let env = EnvOptions {
                clear: clear_env,
                assignments: env,
            };
            commands::exec(&runner, argv, cwd, &env).await
        }

        Commands::Fetch {
            host,
            port,
            method,
            path,
            key_file,
            cert_file,
            timeout_secs,
        } => {
            let fetcher = ReqwestFetcher::new();
            let options = FetchOptions {
                host,
                port,
                method,
                path,
                key_file,
                cert_file,
                timeout: Duration::from_secs(timeout_secs),
            };
            Ok(commands::fetch(&fetcher, options).await)
        }

        Commands::IsIp { addresses } => Ok(commands::is_ip(addresses)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(logging::LogFormat::from_name(&cli.log_format))?;
    debug!("Hostkit CLI v{}", hostkit_core::VERSION);

    let report = dispatch(cli.command).await?;

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Text => report.write_text(&mut out, &mut stderr.lock())?,
        OutputFormat::Json => report.write_json(&mut out)?,
    }
    out.flush()?;

    let code = report.exit_code();
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exec_keeps_argv_verbatim() {
        let cli = Cli::try_parse_from([
            "hostkit", "exec", "--env", "A=1", "--clear-env", "--", "git", "log", "--oneline",
        ])
        .unwrap();

        match cli.command {
            Commands::Exec {
                clear_env,
                env,
                argv,
                cwd,
            } => {
                assert!(clear_env);
                assert_eq!(env, vec!["A=1".to_string()]);
                assert_eq!(argv, vec!["git", "log", "--oneline"]);
                assert!(cwd.is_none());
            }
            _ => panic!("expected exec"),
        }
    }

    #[test]
    fn test_parse_exec_requires_argv() {
        assert!(Cli::try_parse_from(["hostkit", "exec"]).is_err());
    }

    #[test]
    fn test_parse_fetch_defaults() {
        let cli =
            Cli::try_parse_from(["hostkit", "fetch", "--host", "localhost", "--port", "9090"])
                .unwrap();

        assert_eq!(cli.format, OutputFormat::Text);
        match cli.command {
            Commands::Fetch {
                method,
                path,
                timeout_secs,
                ..
            } => {
                assert_eq!(method, "GET");
                assert_eq!(path, "/");
                assert_eq!(timeout_secs, 1);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_parse_is_ip_with_json_format() {
        let cli = Cli::try_parse_from(["hostkit", "is-ip", "::1", "--format", "json"]).unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::IsIp { ref addresses } if addresses == &["::1"]));
    }
}
