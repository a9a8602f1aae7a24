// HTTP Fetcher Port
// One request over one connection; failures collapse to absence

use crate::domain::HttpRequestSpec;
use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Why a fetch produced no body
///
/// Only visible through `try_fetch`. `fetch` deliberately folds every
/// variant into `None`, so callers of `fetch` cannot tell a 404 from a
/// refused connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Client credentials unusable: {0}")]
    Credentials(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Unexpected HTTP status {0}")]
    Status(u16),
}

/// HTTP Fetcher trait
///
/// Implementations:
/// - ReqwestFetcher: reqwest client built per call (rustls for HTTPS)
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Perform the request and return the body of a 200 response
    ///
    /// # Errors
    /// - FetchFailure::Status for any status other than 200
    /// - every other variant for faults before a status was read
    async fn try_fetch(&self, spec: &HttpRequestSpec) -> Result<Vec<u8>, FetchFailure>;

    /// Body of a 200 response, `None` for anything else
    ///
    /// Non-200 statuses and transport faults are indistinguishable here.
    async fn fetch(&self, spec: &HttpRequestSpec) -> Option<Vec<u8>> {
        match self.try_fetch(spec).await {
            Ok(body) => Some(body),
            Err(failure) => {
                warn!(
                    url = %spec.url(),
                    method = %spec.method,
                    reason = %failure,
                    "HTTP fetch returned no body"
                );
                None
            }
        }
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock HTTP Fetcher for testing
    pub struct MockHttpFetcher {
        response: Arc<Mutex<Result<Vec<u8>, FetchFailure>>>,
        calls: Arc<Mutex<Vec<HttpRequestSpec>>>,
    }

    impl MockHttpFetcher {
        pub fn new(response: Result<Vec<u8>, FetchFailure>) -> Self {
            Self {
                response: Arc::new(Mutex::new(response)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_ok(body: impl Into<Vec<u8>>) -> Self {
            Self::new(Ok(body.into()))
        }

        pub fn new_failure(failure: FetchFailure) -> Self {
            Self::new(Err(failure))
        }

        pub fn calls(&self) -> Vec<HttpRequestSpec> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpFetcher for MockHttpFetcher {
        async fn try_fetch(&self, spec: &HttpRequestSpec) -> Result<Vec<u8>, FetchFailure> {
            self.calls.lock().unwrap().push(spec.clone());
            self.response.lock().unwrap().clone()
        }
    }
}
