// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Command must name at least the program to run")]
    EmptyCommand,

    #[error("Invalid environment assignment (expected KEY=VALUE): {0}")]
    InvalidEnvAssignment(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
