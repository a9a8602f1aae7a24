// HTTP request Domain Model

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::address::{classify_address, AddressFamily};
use crate::constants::{DEFAULT_HTTP_METHOD, DEFAULT_HTTP_PATH, DEFAULT_HTTP_TIMEOUT_SECS};

/// A single HTTP or HTTPS request
///
/// TLS is used only when BOTH a key file and a certificate file are set;
/// either one alone leaves the request on plain HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequestSpec {
    pub host: String,
    pub port: u16,
    pub method: String,
    /// Origin-form request target (`/path?query`); absolute URLs are rejected
    pub path: String,
    pub key_file: Option<PathBuf>,
    pub cert_file: Option<PathBuf>,
    pub timeout: Duration,
}

impl HttpRequestSpec {
    /// `GET /` against `host:port` with the default one second timeout
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            method: DEFAULT_HTTP_METHOD.to_string(),
            path: DEFAULT_HTTP_PATH.to_string(),
            key_file: None,
            cert_file: None,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Authenticate with a PEM client key and certificate (switches to HTTPS)
    pub fn with_client_cert(
        mut self,
        key_file: impl Into<PathBuf>,
        cert_file: impl Into<PathBuf>,
    ) -> Self {
        self.key_file = Some(key_file.into());
        self.cert_file = Some(cert_file.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Key and certificate paths, only when both are present
    pub fn client_identity(&self) -> Option<(&Path, &Path)> {
        match (&self.key_file, &self.cert_file) {
            (Some(key), Some(cert)) => Some((key.as_path(), cert.as_path())),
            _ => None,
        }
    }

    pub fn uses_tls(&self) -> bool {
        self.client_identity().is_some()
    }

    pub fn scheme(&self) -> &'static str {
        if self.uses_tls() {
            "https"
        } else {
            "http"
        }
    }

    /// False when the path is an absolute URL such as `http://other/x`
    pub fn has_origin_form_path(&self) -> bool {
        self.path.starts_with('/') || !self.path.contains("://")
    }

    /// Absolute URL for this request
    ///
    /// IPv6 literals are bracketed and a missing leading `/` is added.
    pub fn url(&self) -> String {
        let host = match classify_address(&self.host) {
            Some(AddressFamily::Ipv6) => format!("[{}]", self.host),
            _ => self.host.clone(),
        };

        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!("{}://{}:{}{}", self.scheme(), host, self.port, path)
    }
}
