//! Fixture-backed [`Transport`].

use std::env;

use async_trait::async_trait;
use tracing::{debug, info};

use super::key::canonical_key;
use super::store::FixtureStore;
use crate::config::DEFAULT_GENERATE_ENV_VAR;
use crate::error::{ErrorContext, QueryError, QueryResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Transport};

/// Whether unseen requests may be recorded against the live service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateMode {
    /// Unseen requests fail with [`QueryError::MissingFixture`].
    Disabled,
    /// Unseen requests go to the live transport and are recorded.
    Enabled,
    /// Enabled while the named environment variable is set (to any value).
    /// Checked on every unseen request.
    FromEnv(String),
}

impl GenerateMode {
    pub fn is_enabled(&self) -> bool {
        match self {
            GenerateMode::Disabled => false,
            GenerateMode::Enabled => true,
            GenerateMode::FromEnv(var) => env::var_os(var).is_some(),
        }
    }

    fn hint(&self) -> String {
        match self {
            GenerateMode::FromEnv(var) => format!("set {} to record it", var),
            _ => "regenerate the fixtures to record it".to_string(),
        }
    }
}

impl Default for GenerateMode {
    fn default() -> Self {
        GenerateMode::FromEnv(DEFAULT_GENERATE_ENV_VAR.to_string())
    }
}

/// How requests are grouped into fixture tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureGroup {
    /// Group by the value of a request parameter (the archive's `table`).
    Param(String),
    /// Put every request under one fixed name.
    Fixed(String),
    /// Group by a parameter when present, otherwise use the fixed name.
    /// Lets one store serve an API endpoint and a TAP endpoint side by side.
    ParamOr { param: String, fallback: String },
}

impl Default for FixtureGroup {
    fn default() -> Self {
        FixtureGroup::Param("table".to_string())
    }
}

/// Replays recorded responses instead of calling the network.
///
/// Lookup goes request -> canonical key -> index position -> fixture file.
/// Unseen requests either fail or, in generate mode, are sent through the
/// live transport once and recorded at the next free position.
pub struct ReplayTransport<'s, L = HttpTransport> {
    store: &'s FixtureStore,
    endpoints: Vec<String>,
    group: FixtureGroup,
    generate: GenerateMode,
    live: Option<L>,
}

impl<'s> ReplayTransport<'s, HttpTransport> {
    /// Replay requests sent to `endpoint` from `store`. Generation follows the
    /// default environment variable and has no live transport until one is
    /// attached with [`with_live`](Self::with_live).
    pub fn new(store: &'s FixtureStore, endpoint: impl Into<String>) -> Self {
        Self {
            store,
            endpoints: vec![endpoint.into()],
            group: FixtureGroup::default(),
            generate: GenerateMode::default(),
            live: None,
        }
    }
}

impl<'s, L: Transport> ReplayTransport<'s, L> {
    /// Accept requests to an additional endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.push(endpoint.into());
        self
    }

    pub fn with_group(mut self, group: FixtureGroup) -> Self {
        self.group = group;
        self
    }

    pub fn with_generate_mode(mut self, generate: GenerateMode) -> Self {
        self.generate = generate;
        self
    }

    /// Transport used to record unseen requests in generate mode.
    pub fn with_live<M: Transport>(self, live: M) -> ReplayTransport<'s, M> {
        ReplayTransport {
            store: self.store,
            endpoints: self.endpoints,
            group: self.group,
            generate: self.generate,
            live: Some(live),
        }
    }

    fn check_endpoint(&self, request: &HttpRequest) -> QueryResult<()> {
        if self.endpoints.iter().any(|e| *e == request.url) {
            return Ok(());
        }
        Err(QueryError::configuration_with_context(
            format!(
                "request to unexpected endpoint {} (expected one of: {})",
                request.url,
                self.endpoints.join(", ")
            ),
            ErrorContext::new("replay"),
        ))
    }

    fn group_name<'r>(&'r self, request: &'r HttpRequest) -> QueryResult<&'r str> {
        let name = match &self.group {
            FixtureGroup::Fixed(name) => name.as_str(),
            FixtureGroup::ParamOr { param, fallback } => {
                request.param_value(param).unwrap_or(fallback.as_str())
            }
            FixtureGroup::Param(param) => request.param_value(param).ok_or_else(|| {
                QueryError::configuration_with_context(
                    format!("request has no '{}' parameter to group fixtures by", param),
                    ErrorContext::new("replay").with_details(format!("url={}", request.url)),
                )
            })?,
        };

        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(QueryError::configuration_with_context(
                format!("'{}' cannot be used as a fixture name", name),
                ErrorContext::new("replay"),
            ));
        }
        Ok(name)
    }

    async fn record(&self, table: &str, key: String, request: &HttpRequest) -> QueryResult<usize> {
        let live = self.live.as_ref().ok_or_else(|| {
            QueryError::configuration_with_context(
                "generate mode is enabled but no live transport is attached",
                ErrorContext::new("replay").with_table(table),
            )
        })?;

        let response = live.send(request).await?;

        // Reload after the network call so the index on disk stays the
        // single source of truth.
        let mut index = self.store.load_index()?;
        let position = index.append(table, key);
        let path = self.store.write_fixture(table, position, &response.body)?;
        self.store.save_index(&index)?;

        info!(table, position, path = %path.display(), "recorded new fixture");
        Ok(position)
    }
}

#[async_trait]
impl<'s, L: Transport> Transport for ReplayTransport<'s, L> {
    async fn send(&self, request: &HttpRequest) -> QueryResult<HttpResponse> {
        self.check_endpoint(request)?;
        let table = self.group_name(request)?;
        let key = canonical_key(&request.params);

        let index = self.store.load_index()?;
        let position = match index.position(table, &key) {
            Some(position) => {
                debug!(table, position, "replaying fixture");
                position
            }
            None if self.generate.is_enabled() => self.record(table, key, request).await?,
            None => {
                return Err(QueryError::missing_fixture(
                    format!("unexpected request; {}", self.generate.hint()),
                    ErrorContext::new("replay")
                        .with_table(table)
                        .with_details(format!("key={}", key)),
                ));
            }
        };

        let body = self.store.read_fixture(table, position)?;
        Ok(HttpResponse::ok(body))
    }
}

#[cfg(test)]
#[path = "interceptor_tests.rs"]
mod interceptor_tests;
