//! HTTP transport seam
//!
//! The client talks to the forge through [`HttpTransport`] so the request and
//! error policy can be exercised without a network.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Multipart field carrying the file contents
pub const ATTACHMENT_FIELD: &str = "attachment";

/// Multipart field carrying the optional label
pub const LABEL_FIELD: &str = "name";

/// Content type of uploaded files
pub const OCTET_STREAM: &str = "application/octet-stream";

/// File sent as a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartUpload {
    /// File on disk
    pub path: PathBuf,
    /// File name announced to the server
    pub file_name: String,
    /// Optional label, sent as a second field
    pub label: Option<String>,
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body
    Empty,
    /// JSON document
    Json(Value),
    /// Multipart file upload
    Multipart(MultipartUpload),
}

/// Outgoing request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Value of a header, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response as seen by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body text
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    /// Build from an error, keeping every cause in its source chain
    pub fn from_chain(context: &str, err: &(dyn std::error::Error + 'static)) -> Self {
        let mut message = format!("{}: {}", context, err);
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self(message)
    }
}

/// Capability to send one HTTP request
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the status and body
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by `reqwest`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a default client
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a transport around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn multipart_form(upload: &MultipartUpload) -> Result<Form, TransportError> {
        let content = tokio::fs::read(&upload.path).await.map_err(|e| {
            TransportError(format!("failed to read {}: {}", upload.path.display(), e))
        })?;

        let part = Part::bytes(content)
            .file_name(upload.file_name.clone())
            .mime_str(OCTET_STREAM)
            .map_err(|e| TransportError(format!("failed to create multipart: {}", e)))?;

        let mut form = Form::new().part(ATTACHMENT_FIELD, part);
        if let Some(label) = &upload.label {
            form = form.text(LABEL_FIELD, label.clone());
        }
        Ok(form)
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(upload) => {
                builder.multipart(Self::multipart_form(upload).await?)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_chain("request failed", &e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::from_chain("failed to read response body", &e))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(201, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let request = HttpRequest {
            method: Method::GET,
            url: "https://example.com".to_string(),
            headers: vec![("Authorization".to_string(), "token abc".to_string())],
            body: RequestBody::Empty,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(request.header("authorization"), Some("token abc"));
        assert_eq!(request.header("accept"), None);
    }

    #[derive(Debug, Error)]
    #[error("connection refused")]
    struct Refused;

    #[derive(Debug, Error)]
    #[error("tcp connect error")]
    struct Connect(#[source] Refused);

    #[derive(Debug, Error)]
    #[error("error sending request")]
    struct Sending(#[source] Connect);

    #[test]
    fn test_transport_error_keeps_source_chain() {
        let err = TransportError::from_chain("request failed", &Sending(Connect(Refused)));
        assert_eq!(
            err.to_string(),
            "request failed: error sending request: tcp connect error: connection refused"
        );
    }

    #[tokio::test]
    async fn test_multipart_form_missing_file() {
        let upload = MultipartUpload {
            path: PathBuf::from("/nonexistent/file.bin"),
            file_name: "file.bin".to_string(),
            label: None,
        };
        let err = ReqwestTransport::multipart_form(&upload).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/file.bin"));
    }
}
