// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blocking HTTP transport.
//
// The rest of the crate only needs three request shapes: a multipart image
// upload, an authorised GET, and an OPTIONS capability probe. They sit behind
// the `Transport` trait so the pool and client can be exercised without a
// network.

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, multipart};
use reqwest::header::{ALLOW, AUTHORIZATION};
use tracing::{debug, instrument};

use verifai_core::config::ServiceConfig;
use verifai_core::error::{Result, VerifaiError};

/// Multipart field name the Verifai services read the image from.
pub const FILE_FIELD: &str = "file";

/// Status line and body of an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking request primitives used by the endpoint pool and the client.
///
/// Transport-level failures come back as `VerifaiError::Network` or
/// `VerifaiError::Timeout`; any HTTP status is a successful exchange.
pub trait Transport: Send + Sync {
    /// POST `image` as a single multipart file field.
    fn post_image(&self, url: &str, image: &[u8]) -> Result<HttpReply>;

    /// GET `url`, optionally with an `Authorization` header value.
    fn get(&self, url: &str, authorization: Option<&str>) -> Result<HttpReply>;

    /// Send an OPTIONS request and return the `Allow` header, if any.
    fn allowed_methods(&self, url: &str) -> Result<Option<String>>;
}

/// `reqwest`-backed transport honouring the TLS and timeout settings of a
/// [`ServiceConfig`].
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()
            .map_err(|e| VerifaiError::Config(format!("failed to build HTTP client: {e}")))?;
        debug!(
            ssl_verify = config.ssl_verify,
            timeout_secs = config.request_timeout_secs,
            "HTTP transport ready"
        );
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, image), fields(image_len = image.len()))]
    fn post_image(&self, url: &str, image: &[u8]) -> Result<HttpReply> {
        let (mime, file_name) = sniff_image_type(image);
        let part = multipart::Part::bytes(image.to_vec())
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| VerifaiError::Config(format!("invalid MIME type {mime}: {e}")))?;
        let form = multipart::Form::new().part(FILE_FIELD, part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .map_err(|e| map_reqwest_error(url, e))?;
        read_reply(url, response)
    }

    #[instrument(skip(self, authorization))]
    fn get(&self, url: &str, authorization: Option<&str>) -> Result<HttpReply> {
        let mut request = self.client.get(url);
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        let response = request.send().map_err(|e| map_reqwest_error(url, e))?;
        read_reply(url, response)
    }

    #[instrument(skip(self))]
    fn allowed_methods(&self, url: &str) -> Result<Option<String>> {
        let response = self
            .client
            .request(Method::OPTIONS, url)
            .send()
            .map_err(|e| map_reqwest_error(url, e))?;
        // Servers may split the list over several `Allow` lines. A value that
        // is not text joins as an empty entry, which the parser rejects.
        let values: Vec<&str> = response
            .headers()
            .get_all(ALLOW)
            .iter()
            .map(|value| value.to_str().unwrap_or(""))
            .collect();
        let allow = (!values.is_empty()).then(|| values.join(", "));
        debug!(status = response.status().as_u16(), allow = ?allow, "OPTIONS answered");
        Ok(allow)
    }
}

fn read_reply(url: &str, response: reqwest::blocking::Response) -> Result<HttpReply> {
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .map_err(|e| map_reqwest_error(url, e))?
        .to_vec();
    debug!(status, body_len = body.len(), "response received");
    Ok(HttpReply { status, body })
}

fn map_reqwest_error(url: &str, err: reqwest::Error) -> VerifaiError {
    if err.is_timeout() {
        VerifaiError::Timeout(format!("{url}: {err}"))
    } else {
        VerifaiError::Network(format!("{url}: {err}"))
    }
}

/// Guess the MIME type and a matching file name from magic bytes.
pub fn sniff_image_type(data: &[u8]) -> (&'static str, &'static str) {
    match data {
        [0xFF, 0xD8, 0xFF, ..] => ("image/jpeg", "image.jpg"),
        [0x89, b'P', b'N', b'G', ..] => ("image/png", "image.png"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
            ("image/webp", "image.webp")
        }
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => {
            ("image/tiff", "image.tiff")
        }
        _ => ("application/octet-stream", "image"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    use super::*;
    use crate::probe;

    /// Accept a single connection on a loopback port, answer it with
    /// `response`, and hand back the raw request.
    fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/ocr/", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            request
        });
        (url, handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        while !request_complete(&data) {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn request_complete(data: &[u8]) -> bool {
        let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&data[..end]).to_ascii_lowercase();
        if head.contains("transfer-encoding: chunked") {
            return data.ends_with(b"0\r\n\r\n");
        }
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        data.len() >= end + 4 + length
    }

    // Loopback traffic must not be routed through a proxy from the
    // environment.
    fn transport() -> HttpTransport {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        HttpTransport { client }
    }

    const OK: &str = "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok";

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(sniff_image_type(&[0xFF, 0xD8, 0xFF, 0xE0]).0, "image/jpeg");
        assert_eq!(
            sniff_image_type(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]).1,
            "image.png"
        );
        assert_eq!(sniff_image_type(b"RIFF\0\0\0\0WEBPVP8 ").0, "image/webp");
        assert_eq!(sniff_image_type(b"??").0, "application/octet-stream");
    }

    #[test]
    fn reply_success_range() {
        let ok = HttpReply {
            status: 204,
            body: Vec::new(),
        };
        let bad = HttpReply {
            status: 401,
            body: Vec::new(),
        };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }

    #[test]
    fn builds_with_verification_disabled() {
        let config = ServiceConfig {
            ssl_verify: false,
            ..Default::default()
        };
        assert!(HttpTransport::new(&config).is_ok());
    }

    #[test]
    fn image_upload_is_multipart_file_field() {
        let (url, server) = serve_once(OK);
        let reply = transport()
            .post_image(&url, &[0xFF, 0xD8, 0xFF, 0xE0, b'j', b'p', b'g'])
            .unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, b"ok");

        let request = server.join().unwrap();
        let lower = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /api/ocr/ HTTP/1.1"), "{request}");
        assert!(lower.contains("content-type: multipart/form-data; boundary="));
        assert!(request.contains(r#"name="file"; filename="image.jpg""#), "{request}");
        assert!(lower.contains("content-type: image/jpeg"));
    }

    #[test]
    fn get_sends_authorization() {
        let (url, server) = serve_once(OK);
        let reply = transport().get(&url, Some("Token t0k3n")).unwrap();
        assert!(reply.is_success());

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /api/ocr/ HTTP/1.1"), "{request}");
        assert!(request.to_ascii_lowercase().contains("authorization: token t0k3n"));
    }

    #[test]
    fn error_status_is_still_a_reply() {
        let (url, server) = serve_once(
            "HTTP/1.1 502 Bad Gateway\r\nContent-Length: 3\r\nConnection: close\r\n\r\nbad",
        );
        let reply = transport().get(&url, None).unwrap();
        server.join().unwrap();
        assert_eq!(reply.status, 502);
        assert!(!reply.is_success());
    }

    #[test]
    fn allow_lines_are_joined() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nAllow: OPTIONS\r\nAllow: POST\r\n\
             Content-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let transport = transport();
        let allow = transport.allowed_methods(&url).unwrap();
        let request = server.join().unwrap();

        assert!(request.starts_with("OPTIONS /api/ocr/ HTTP/1.1"), "{request}");
        assert_eq!(allow.as_deref(), Some("OPTIONS, POST"));
        let methods = probe::parse_allow_header(allow.as_deref().unwrap()).unwrap();
        assert!(probe::is_service_capability_set(&methods));
    }

    #[test]
    fn missing_allow_header_is_none() {
        let (url, server) = serve_once(OK);
        assert_eq!(transport().allowed_methods(&url).unwrap(), None);
        server.join().unwrap();
    }

    #[test]
    fn refused_connection_is_network_error() {
        let url = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}/", listener.local_addr().unwrap())
        };
        let err = transport().get(&url, None).unwrap_err();
        assert!(matches!(err, VerifaiError::Network(_)), "{err:?}");
        assert!(err.is_transient());
    }
}
