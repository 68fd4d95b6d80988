//! Request payloads for the legacy API and the TAP service.

use crate::error::{QueryError, QueryResult};

/// Output format requested from both endpoints.
pub const FORMAT: &str = "ipac";

/// Column selection and filters for [`query_criteria`](super::NasaExoplanetArchive::query_criteria).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCriteria {
    select: String,
    where_clause: Option<String>,
    order: Option<String>,
    extra: Vec<(String, String)>,
}

impl Default for QueryCriteria {
    fn default() -> Self {
        Self {
            select: "*".to_string(),
            where_clause: None,
            order: None,
            extra: Vec::new(),
        }
    }
}

impl QueryCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comma separated column list, or `*`.
    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = select.into();
        self
    }

    /// Select the given columns, joined with commas.
    pub fn select_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.select = columns
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self
    }

    pub fn where_clause(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Extra API parameter (e.g. `kepid`, `quarter`, `kelt_field`).
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.extra.push((key.into(), value.to_string()));
        self
    }

    pub fn selected(&self) -> &str {
        &self.select
    }
}

/// Which endpoint a payload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Api,
    Tap,
}

/// Parameters of a request that has not been sent yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPayload {
    pub route: Route,
    pub params: Vec<(String, String)>,
}

impl QueryPayload {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Legacy API payload: every criterion is its own parameter.
    pub fn api(table: &str, criteria: &QueryCriteria) -> Self {
        let mut params = vec![
            ("table".to_string(), table.to_string()),
            ("select".to_string(), criteria.select.clone()),
        ];
        if let Some(ref clause) = criteria.where_clause {
            params.push(("where".to_string(), clause.clone()));
        }
        if let Some(ref order) = criteria.order {
            params.push(("order".to_string(), order.clone()));
        }
        params.push(("format".to_string(), FORMAT.to_string()));
        params.extend(criteria.extra.iter().cloned());

        Self {
            route: Route::Api,
            params,
        }
    }

    /// TAP payload: the criteria are folded into one ADQL statement.
    pub fn tap(table: &str, criteria: &QueryCriteria) -> QueryResult<Self> {
        if let Some((key, _)) = criteria.extra.first() {
            return Err(QueryError::invalid_query(format!(
                "parameter '{}' is only supported by legacy API tables, not TAP table '{}'",
                key, table
            )));
        }

        let mut adql = format!("select {} from {}", criteria.select, table);
        if let Some(ref clause) = criteria.where_clause {
            adql.push_str(&format!(" where {}", clause));
        }
        if let Some(ref order) = criteria.order {
            adql.push_str(&format!(" order by {}", order));
        }
        Ok(Self::adql(adql))
    }

    /// Raw ADQL statement for the TAP sync endpoint.
    pub fn adql(query: impl Into<String>) -> Self {
        Self {
            route: Route::Tap,
            params: vec![
                ("query".to_string(), query.into()),
                ("format".to_string(), FORMAT.to_string()),
            ],
        }
    }
}

/// Quote a string literal for ADQL (`'` doubled).
pub fn adql_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
