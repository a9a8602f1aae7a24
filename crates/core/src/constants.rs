// Shared defaults (no magic values in adapters)

/// Default HTTP request timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 1;

/// Default HTTP method when a caller does not name one
pub const DEFAULT_HTTP_METHOD: &str = "GET";

/// Default request path
pub const DEFAULT_HTTP_PATH: &str = "/";
