//! The HTTP seam under `ApiClient`.
//!
//! `ApiClient` builds `HttpRequest` values and hands them to a `Transport`.
//! `ReqwestTransport` is the production implementation; tests supply
//! scripted transports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Method};
use serde_json::Value;
use tracing::debug;

use super::ApiError;
use crate::models::Upload;

/// HTTP request timeout in seconds.
/// 15s gives a cold-started backend time to answer without hanging the UI.
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub enum Part {
    Text { name: String, value: String },
    File { name: String, upload: Upload },
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Vec<Part>),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the API base, e.g. `/auth/login`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub bearer: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            bearer: None,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, parts: Vec<Part>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Flatten a serializable filter struct into query pairs. Nulls are
    /// skipped, scalars are stringified.
    pub fn query_from(mut self, params: &Value) -> Self {
        if let Value::Object(map) = params {
            for (key, value) in map {
                let rendered = match value {
                    Value::Null => continue,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                self.query.push((key.clone(), rendered));
            }
        }
        self
    }

    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request. Only transport-level problems are errors;
    /// every HTTP status comes back as a response.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `Transport` over `reqwest`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn build_form(parts: Vec<Part>) -> Result<multipart::Form, ApiError> {
        let mut form = multipart::Form::new();
        for part in parts {
            form = match part {
                Part::Text { name, value } => form.text(name, value),
                Part::File { name, upload } => {
                    let file = multipart::Part::bytes(upload.bytes)
                        .file_name(upload.file_name)
                        .mime_str(&upload.mime_type)?;
                    form.part(name, file)
                }
            };
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = self.url(&request.path);
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self.client.request(request.method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref token) = request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(parts) => builder.multipart(Self::build_form(parts)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_from_skips_nulls() {
        let request = HttpRequest::new(Method::GET, "/jobs")
            .query_from(&json!({"page": 2, "search": "rust", "featured": true, "location": null}));
        let mut query = request.query.clone();
        query.sort();
        assert_eq!(
            query,
            vec![
                ("featured".to_string(), "true".to_string()),
                ("page".to_string(), "2".to_string()),
                ("search".to_string(), "rust".to_string()),
            ]
        );
    }

    #[test]
    fn test_url_joining() {
        let transport = ReqwestTransport::new("https://api.example.com/").expect("client");
        assert_eq!(transport.base_url(), "https://api.example.com");
        assert_eq!(transport.url("/auth/me"), "https://api.example.com/auth/me");
        assert_eq!(transport.url("jobs"), "https://api.example.com/jobs");
    }

    #[test]
    fn test_status_success_range() {
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(401, "").is_success());
    }
}
