// HTTP fetcher implementation
// reason: reqwest with rustls so PEM client certificates work without OpenSSL
use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client, Identity, Method, StatusCode, Url};
use std::error::Error as StdError;
use std::path::Path;
use tracing::debug;

use hostkit_core::domain::HttpRequestSpec;
use hostkit_core::port::http_fetcher::{FetchFailure, HttpFetcher};

/// HTTP fetcher backed by a throwaway reqwest client
///
/// Every call builds its own client with pooling disabled, so exactly one
/// connection serves exactly one request. The client is owned by the call
/// and dropped on every return path, which closes the connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestFetcher;

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self
    }

    /// Read the PEM key and certificate into a single client identity
    async fn load_identity(key_file: &Path, cert_file: &Path) -> Result<Identity, FetchFailure> {
        let mut pem = read_pem(key_file).await?;
        pem.push(b'\n');
        pem.extend_from_slice(&read_pem(cert_file).await?);

        Identity::from_pem(&pem).map_err(|e| FetchFailure::Credentials(error_chain(&e)))
    }

    /// One-shot client: direct connection, no redirects, no idle connections kept
    ///
    /// With a client identity the server certificate is not validated: the
    /// key and certificate are only passed through, and the servers on the
    /// other end present certificates from their own private CA.
    async fn build_client(spec: &HttpRequestSpec) -> Result<Client, FetchFailure> {
        let mut builder = Client::builder()
            .no_proxy()
            .redirect(Policy::none())
            .pool_max_idle_per_host(0)
            .timeout(spec.timeout);

        if let Some((key_file, cert_file)) = spec.client_identity() {
            builder = builder
                .identity(Self::load_identity(key_file, cert_file).await?)
                .danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| FetchFailure::Transport(error_chain(&e)))
    }

    fn parse_target(spec: &HttpRequestSpec) -> Result<(Method, Url), FetchFailure> {
        let method = Method::from_bytes(spec.method.as_bytes())
            .map_err(|_| FetchFailure::InvalidRequest(format!("method {:?}", spec.method)))?;

        if !spec.has_origin_form_path() {
            return Err(FetchFailure::InvalidRequest(format!(
                "path {:?} is an absolute URL",
                spec.path
            )));
        }

        let raw_url = spec.url();
        let url = Url::parse(&raw_url)
            .map_err(|e| FetchFailure::InvalidRequest(format!("url {raw_url}: {e}")))?;

        Ok((method, url))
    }
}

async fn read_pem(path: &Path) -> Result<Vec<u8>, FetchFailure> {
    tokio::fs::read(path)
        .await
        .map_err(|e| FetchFailure::Credentials(format!("{}: {}", path.display(), e)))
}

fn transport_failure(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::Transport(error_chain(&err))
    }
}

/// Render an error with all of its sources, outermost first
fn error_chain(err: &dyn StdError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn try_fetch(&self, spec: &HttpRequestSpec) -> Result<Vec<u8>, FetchFailure> {
        let (method, url) = Self::parse_target(spec)?;
        let client = Self::build_client(spec).await?;

        debug!(
            method = %method,
            url = %url,
            tls = spec.uses_tls(),
            timeout_ms = spec.timeout.as_millis() as u64,
            "Sending HTTP request"
        );

        let response = client
            .request(method, url)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        debug!(status = status.as_u16(), "HTTP response received");

        if status != StatusCode::OK {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(transport_failure)?;
        Ok(body.to_vec())
    }
}
