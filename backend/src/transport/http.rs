//! Live transport backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{HttpRequest, HttpResponse, Method, Transport};
use crate::config::ClientConfig;
use crate::error::{ErrorContext, QueryError, QueryResult};

/// Performs real network calls.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport using the timeout and user agent from `config`.
    pub fn new(config: &ClientConfig) -> QueryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                QueryError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> QueryResult<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let builder = match request.method {
            Method::Get => self.client.get(&request.url).query(&request.params),
            Method::Post => self.client.post(&request.url).form(&request.params),
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(QueryError::Http {
                status: status.as_u16(),
                message: body.trim().to_string(),
                context: ErrorContext::new("send").with_details(format!("url={}", request.url)),
            });
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}
