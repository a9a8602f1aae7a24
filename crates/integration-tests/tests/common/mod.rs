//! Minimal TCP servers for exercising the HTTP fetcher end to end

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::pem::PemObject;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::server::WebPkiClientVerifier;
use tokio_rustls::rustls::{RootCertStore, ServerConfig};
use tokio_rustls::TlsAcceptor;

/// First byte of a TLS record carrying a handshake (ClientHello)
pub const TLS_HANDSHAKE_RECORD: u8 = 0x16;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

/// Port that nothing listens on
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Read until the end of the request head; returns the request line
async fn read_request_line<S: AsyncRead + Unpin>(
    stream: &mut S,
    mut head: Vec<u8>,
) -> Option<String> {
    let mut buf = [0u8; 4096];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        head.extend_from_slice(&buf[..n]);
    }

    let text = String::from_utf8_lossy(&head);
    text.lines().next().map(str::to_string)
}

/// Block until the peer closes its side
async fn wait_for_peer_close<S: AsyncRead + Unpin>(stream: &mut S) {
    let mut buf = [0u8; 1024];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(_) => continue,
        }
    }
}

fn response(status: u16, reason: &str, body: &str) -> String {
    // No "Connection: close": releasing the connection is the client's job.
    format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nContent-Type: text/plain\r\n\r\n{body}",
        body.len()
    )
}

/// HTTP server handling ONE connection at a time
///
/// After answering, it waits for the client to close before accepting the
/// next connection, so a client that leaks its connection stalls every
/// later request.
pub struct SequentialServer {
    pub port: u16,
    requests: Arc<Mutex<Vec<String>>>,
}

impl SequentialServer {
    /// Routes: `GET /x` -> 200 "hello", `GET /missing` -> 404, `GET /boom` -> 500,
    /// anything else -> 200 with the request line echoed back
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let Some(line) = read_request_line(&mut stream, Vec::new()).await else {
                    continue;
                };
                seen.lock().unwrap().push(line.clone());

                let reply = match line.as_str() {
                    "GET /x HTTP/1.1" => response(200, "OK", "hello"),
                    "GET /missing HTTP/1.1" => response(404, "Not Found", "nothing here"),
                    "GET /boom HTTP/1.1" => response(500, "Internal Server Error", "boom"),
                    other => response(200, "OK", other),
                };

                if stream.write_all(reply.as_bytes()).await.is_err() {
                    continue;
                }
                wait_for_peer_close(&mut stream).await;
            }
        });

        Self { port, requests }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Records the first bytes every client sends
///
/// Plain HTTP requests get a 200 "plain"; anything else (a TLS
/// ClientHello) is dropped after being recorded.
pub struct WireProbe {
    pub port: u16,
    first_bytes: Arc<Mutex<Vec<u8>>>,
}

impl WireProbe {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let first_bytes = Arc::new(Mutex::new(Vec::new()));
        let seen = first_bytes.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let seen = seen.clone();

                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let n = match stream.read(&mut buf).await {
                        Ok(n) if n > 0 => n,
                        _ => return,
                    };
                    seen.lock().unwrap().push(buf[0]);

                    if buf[0] == TLS_HANDSHAKE_RECORD {
                        return;
                    }

                    if read_request_line(&mut stream, buf[..n].to_vec())
                        .await
                        .is_some()
                    {
                        let reply = response(200, "OK", "plain");
                        let _ = stream.write_all(reply.as_bytes()).await;
                        wait_for_peer_close(&mut stream).await;
                    }
                });
            }
        });

        Self { port, first_bytes }
    }

    pub fn first_bytes(&self) -> Vec<u8> {
        self.first_bytes.lock().unwrap().clone()
    }
}

fn pem_certs(name: &str) -> Vec<CertificateDer<'static>> {
    CertificateDer::pem_file_iter(fixture(name))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// HTTPS server that insists on a client certificate
///
/// Presents `server.crt` (issued by the test CA, which no public root store
/// trusts) and only completes the handshake for client certificates issued
/// by `ca.crt`. Every request gets a 200 "secret".
pub struct TlsServer {
    pub port: u16,
    client_authenticated: Arc<Mutex<Vec<bool>>>,
}

impl TlsServer {
    pub async fn start() -> Self {
        let provider = Arc::new(ring::default_provider());

        let mut roots = RootCertStore::empty();
        for cert in pem_certs("ca.crt") {
            roots.add(cert).unwrap();
        }
        let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
            .build()
            .unwrap();

        let key = PrivateKeyDer::from_pem_file(fixture("server.key")).unwrap();
        let config = ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_client_cert_verifier(verifier)
            .with_single_cert(pem_certs("server.crt"), key)
            .unwrap();
        let acceptor = TlsAcceptor::from(Arc::new(config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let client_authenticated = Arc::new(Mutex::new(Vec::new()));
        let seen = client_authenticated.clone();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let acceptor = acceptor.clone();
                let seen = seen.clone();

                tokio::spawn(async move {
                    let Ok(mut tls) = acceptor.accept(stream).await else {
                        return;
                    };
                    let presented = tls
                        .get_ref()
                        .1
                        .peer_certificates()
                        .is_some_and(|certs| !certs.is_empty());
                    seen.lock().unwrap().push(presented);

                    if read_request_line(&mut tls, Vec::new()).await.is_some() {
                        let reply = response(200, "OK", "secret");
                        let _ = tls.write_all(reply.as_bytes()).await;
                        let _ = tls.flush().await;
                        wait_for_peer_close(&mut tls).await;
                    }
                });
            }
        });

        Self {
            port,
            client_authenticated,
        }
    }

    /// One entry per completed handshake: did the client present a certificate
    pub fn client_authenticated(&self) -> Vec<bool> {
        self.client_authenticated.lock().unwrap().clone()
    }
}
