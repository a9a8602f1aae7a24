// Port Layer - Interfaces for external dependencies

pub mod http_fetcher;
pub mod process_runner;

// Re-exports
pub use http_fetcher::{FetchFailure, HttpFetcher};
pub use process_runner::{ProcessError, ProcessRunner};
