//! Request/response abstraction shared by the archive clients.
//!
//! Clients never talk to `reqwest` directly. They build an [`HttpRequest`] and
//! hand it to whatever [`Transport`] they were constructed with:
//!
//! ```text
//! NasaExoplanetArchive<T> ──┐
//!                           ├──► T: Transport ──► HttpTransport   (live)
//! EsaSky<T> ────────────────┘                └─► ReplayTransport (fixtures)
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::QueryResult;

pub mod http;

pub use http::HttpTransport;

/// HTTP method of an outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// An outgoing request: target URL plus query/form parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            params: Vec::new(),
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Append several parameters, preserving their order.
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// First value of the named parameter.
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A response body together with its status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The "perform request" capability injected into every client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return its response. Implementations make a single
    /// attempt; retries are the caller's business.
    async fn send(&self, request: &HttpRequest) -> QueryResult<HttpResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &HttpRequest) -> QueryResult<HttpResponse> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn send(&self, request: &HttpRequest) -> QueryResult<HttpResponse> {
        (**self).send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_keeps_param_order() {
        let request = HttpRequest::get("https://example.org/api")
            .param("table", "koi")
            .params([("select", "*"), ("where", "kepid=10601284")]);

        assert_eq!(request.method, Method::Get);
        assert_eq!(
            request.params,
            vec![
                ("table".to_string(), "koi".to_string()),
                ("select".to_string(), "*".to_string()),
                ("where".to_string(), "kepid=10601284".to_string()),
            ]
        );
        assert_eq!(request.param_value("where"), Some("kepid=10601284"));
        assert_eq!(request.param_value("order"), None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::ok("x").is_success());
        assert!(!HttpResponse {
            status: 404,
            body: String::new()
        }
        .is_success());
    }
}
