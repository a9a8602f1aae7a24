// Domain Layer - Value types and pure validation

pub mod address;
pub mod command;
pub mod error;
pub mod http_request;

// Re-exports
pub use address::{classify_address, is_ip_address, AddressFamily};
pub use command::{parse_env_assignment, CommandSpec};
pub use error::DomainError;
pub use http_request::HttpRequestSpec;
