// Hostkit Core - Domain Types & Ports
// NO infrastructure dependencies (hexagonal layout)

pub mod constants;
pub mod domain;
pub mod port;

pub use domain::{
    classify_address, is_ip_address, AddressFamily, CommandSpec, DomainError, HttpRequestSpec,
};
pub use port::{FetchFailure, HttpFetcher, ProcessError, ProcessRunner};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
