//! Error types for archive queries and fixture replay.
//!
//! Every failure carries an [`ErrorContext`] describing which operation,
//! service and table were involved, so a failing test or CLI run points at the
//! offending request without extra logging.

use std::fmt;
use std::path::Path;

/// Result type for query and replay operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Structured context for query errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "query_criteria", "replay")
    pub operation: Option<String>,
    /// The remote service involved (e.g., "nasa_exoplanet_archive", "esasky")
    pub service: Option<String>,
    /// The table or catalog involved
    pub table: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the service name.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set the table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add details, after any already present.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        self.details = Some(match self.details.take() {
            Some(existing) => format!("{}, {}", existing, details),
            None => details,
        });
        self
    }

    fn is_empty(&self) -> bool {
        self.operation.is_none()
            && self.service.is_none()
            && self.table.is_none()
            && self.details.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref service) = self.service {
            parts.push(format!("service={}", service));
        }
        if let Some(ref table) = self.table {
            parts.push(format!("table={}", table));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for archive queries and fixture replay.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Misconfigured client or harness: unexpected endpoint, missing
    /// parameter, unreadable configuration. Never recovered.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// A request had no recorded fixture and response generation is off.
    #[error("Missing fixture: {message} {context}")]
    MissingFixture {
        message: String,
        context: ErrorContext,
    },

    /// Fixture or configuration file I/O failed.
    #[error("I/O error on {path}: {source} {context}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
        context: ErrorContext,
    },

    /// The HTTP layer failed before a response was received.
    #[error("Transport error: {message} {context}")]
    Transport {
        message: String,
        context: ErrorContext,
    },

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message} {context}")]
    Http {
        status: u16,
        message: String,
        context: ErrorContext,
    },

    /// A response body or user input could not be parsed.
    #[error("Parse error: {message} {context}")]
    Parse {
        message: String,
        context: ErrorContext,
    },

    /// The requested table no longer exists or was replaced.
    #[error("Invalid table: {message} {context}")]
    InvalidTable {
        message: String,
        context: ErrorContext,
    },

    /// The query arguments are invalid.
    #[error("Invalid query: {message} {context}")]
    InvalidQuery {
        message: String,
        context: ErrorContext,
    },
}

impl QueryError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a configuration error with context.
    pub fn configuration_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Configuration {
            message: message.into(),
            context,
        }
    }

    /// Create a missing fixture error with context.
    pub fn missing_fixture(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::MissingFixture {
            message: message.into(),
            context,
        }
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
            context: ErrorContext::default(),
        }
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create an invalid table error.
    pub fn invalid_table(message: impl Into<String>) -> Self {
        Self::InvalidTable {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// The structured context of this error.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Configuration { context, .. }
            | Self::MissingFixture { context, .. }
            | Self::Io { context, .. }
            | Self::Transport { context, .. }
            | Self::Http { context, .. }
            | Self::Parse { context, .. }
            | Self::InvalidTable { context, .. }
            | Self::InvalidQuery { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Configuration { context, .. }
            | Self::MissingFixture { context, .. }
            | Self::Io { context, .. }
            | Self::Transport { context, .. }
            | Self::Http { context, .. }
            | Self::Parse { context, .. }
            | Self::InvalidTable { context, .. }
            | Self::InvalidQuery { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add or update the service in the error context.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.context_mut().service = Some(service.into());
        self
    }

    /// Add or update the table in the error context.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.context_mut().table = Some(table.into());
        self
    }

    /// Append to the details in the error context.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let context = self.context_mut();
        *context = std::mem::take(context).with_details(details);
        self
    }
}

fn transport_details(url: Option<&url::Url>, timeout: bool) -> ErrorContext {
    let mut context = ErrorContext::default();
    if let Some(url) = url {
        context = context.with_details(format!("url={}", url));
    }
    if timeout {
        context = context.with_details("timeout");
    }
    context
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        QueryError::Transport {
            message: err.to_string(),
            context: transport_details(err.url(), err.is_timeout()),
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::parse(format!("JSON error: {}", err))
    }
}
