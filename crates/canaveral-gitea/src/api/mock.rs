//! Scripted transport for tests

use std::sync::Mutex;

use reqwest::Method;

use super::transport::{HttpRequest, HttpResponse, HttpTransport, RequestBody, TransportError};

/// File received through a multipart request
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub url: String,
    pub file_name: String,
    pub label: Option<String>,
    pub content: Vec<u8>,
}

struct Route {
    method: Method,
    suffix: String,
    response: Result<HttpResponse, TransportError>,
}

/// Transport answering from a route table and recording every request
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
    uploads: Mutex<Vec<ReceivedUpload>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method` requests whose URL ends with `suffix`
    pub fn route(self, method: Method, suffix: &str, status: u16, body: &str) -> Self {
        self.routes.lock().unwrap().push(Route {
            method,
            suffix: suffix.to_string(),
            response: Ok(HttpResponse::new(status, body)),
        });
        self
    }

    /// Fail `method` requests whose URL ends with `suffix` without a response
    pub fn fail(self, method: Method, suffix: &str, message: &str) -> Self {
        self.routes.lock().unwrap().push(Route {
            method,
            suffix: suffix.to_string(),
            response: Err(TransportError(message.to_string())),
        });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    /// `METHOD url` of every request, in order
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url))
            .collect()
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if let RequestBody::Multipart(upload) = &request.body {
            let content = std::fs::read(&upload.path)
                .map_err(|e| TransportError(format!("failed to read upload: {}", e)))?;
            self.uploads.lock().unwrap().push(ReceivedUpload {
                url: request.url.clone(),
                file_name: upload.file_name.clone(),
                label: upload.label.clone(),
                content,
            });
        }

        let response = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.method == request.method && request.url.ends_with(&r.suffix))
            .map(|r| r.response.clone())
            .unwrap_or_else(|| Ok(HttpResponse::new(599, "no route")));

        self.requests.lock().unwrap().push(request);
        response
    }
}
