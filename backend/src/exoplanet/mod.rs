//! NASA Exoplanet Archive client.
//!
//! The archive serves two interfaces:
//!
//! - the legacy `nph-nstedAPI` endpoint, where each criterion is a separate
//!   query parameter (`table`, `select`, `where`, ...);
//! - the TAP sync endpoint, which takes a single ADQL statement.
//!
//! [`NasaExoplanetArchive::query_criteria`] picks the interface per table:
//! tables listed by the TAP service go through TAP, everything else through
//! the legacy API. Both return IPAC text, parsed into a [`Table`].

use parking_lot::RwLock;
use qtty::Degrees;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::coords::SkyPosition;
use crate::error::{ErrorContext, QueryError, QueryResult};
use crate::table::{ipac, Table};
use crate::transport::{HttpRequest, Transport};

pub mod payload;

pub use payload::{adql_string, QueryCriteria, QueryPayload, Route};

const SERVICE: &str = "nasa_exoplanet_archive";

/// Tables retired by the archive and the tables that replaced them.
const REPLACED_TABLES: &[(&str, &str)] = &[
    ("exoplanets", "ps"),
    ("compositepars", "pscomppars"),
    ("exomultpars", "ps"),
];

/// Tables keyed by host star rather than planet name.
const STELLAR_TABLES: &[&str] = &["stellarhosts"];

/// Client for the NASA Exoplanet Archive.
pub struct NasaExoplanetArchive<T> {
    transport: T,
    url_api: String,
    url_tap: String,
    tap_tables: RwLock<Option<Vec<String>>>,
}

impl<T: Transport> NasaExoplanetArchive<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            url_api: config.exoplanet.url_api.clone(),
            url_tap: config.exoplanet.url_tap.clone(),
            tap_tables: RwLock::new(None),
        }
    }

    /// Preset the TAP table list instead of asking the service for it.
    pub fn with_tap_tables<I, S>(self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.tap_tables.write() = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Tables served by the TAP endpoint. Fetched once, then cached.
    pub async fn get_tap_tables(&self) -> QueryResult<Vec<String>> {
        if let Some(tables) = self.tap_tables.read().as_ref() {
            return Ok(tables.clone());
        }

        let payload = QueryPayload::adql("select table_name from TAP_SCHEMA.tables");
        let table = self.send(&payload, "get_tap_tables").await?;
        let names: Vec<String> = table
            .column("table_name")
            .ok_or_else(|| {
                QueryError::parse("TAP_SCHEMA.tables response has no table_name column")
                    .with_service(SERVICE)
            })?
            .values
            .iter()
            .filter(|v| !v.is_empty())
            .cloned()
            .collect();

        *self.tap_tables.write() = Some(names.clone());
        Ok(names)
    }

    /// Build the payload `query_criteria` would send, without sending it.
    pub async fn query_criteria_payload(
        &self,
        table: &str,
        criteria: &QueryCriteria,
    ) -> QueryResult<QueryPayload> {
        let table = table.trim().to_lowercase();
        check_table(&table)?;

        if self.get_tap_tables().await?.iter().any(|t| *t == table) {
            QueryPayload::tap(&table, criteria)
        } else {
            Ok(QueryPayload::api(&table, criteria))
        }
    }

    /// Query `table` with the given column selection and filters.
    pub async fn query_criteria(&self, table: &str, criteria: &QueryCriteria) -> QueryResult<Table> {
        let payload = self.query_criteria_payload(table, criteria).await?;
        self.send(&payload, "query_criteria")
            .await
            .map_err(|e| e.with_table(table))
    }

    /// Look up a single planet (or star, for stellar tables) by name.
    pub async fn query_object(&self, name: &str, table: &str, select: &str) -> QueryResult<Table> {
        let table = table.trim().to_lowercase();
        check_table(&table)?;

        let name = self.regularize_object_name(name).await?;
        let column = if STELLAR_TABLES.contains(&table.as_str()) {
            "hostname"
        } else {
            "pl_name"
        };
        let criteria = QueryCriteria::new()
            .select(select)
            .where_clause(format!("{} = {}", column, adql_string(&name)));

        let payload = QueryPayload::tap(&table, &criteria)?;
        self.send(&payload, "query_object")
            .await
            .map_err(|e| e.with_table(table))
    }

    /// Objects within `radius` of `position`, via an ADQL cone search.
    pub async fn query_region(
        &self,
        table: &str,
        position: SkyPosition,
        radius: Degrees,
        select: &str,
    ) -> QueryResult<Table> {
        let table = table.trim().to_lowercase();
        check_table(&table)?;
        if !radius.value().is_finite() || radius.value() < 0.0 {
            return Err(QueryError::invalid_query(format!(
                "search radius must be a non-negative angle, got {} deg",
                radius.value()
            )));
        }

        let criteria = QueryCriteria::new().select(select).where_clause(format!(
            "contains(point('icrs',ra,dec),circle('icrs',{},{},{}))=1",
            position.ra().value(),
            position.dec().value(),
            radius.value()
        ));

        let payload = QueryPayload::tap(&table, &criteria)?;
        self.send(&payload, "query_region")
            .await
            .map_err(|e| e.with_table(table))
    }

    /// Known aliases of a system, default name first.
    pub async fn query_aliastable(&self, name: &str) -> QueryResult<Vec<String>> {
        let payload = QueryPayload {
            route: Route::Api,
            params: vec![
                ("table".to_string(), "aliastable".to_string()),
                ("objname".to_string(), name.trim().to_string()),
                ("format".to_string(), payload::FORMAT.to_string()),
            ],
        };
        let table = self.send(&payload, "query_aliastable").await?;
        if table.is_empty() {
            return Ok(Vec::new());
        }

        let aliases = table.column("aliasdis").ok_or_else(|| {
            QueryError::parse("alias table response has no aliasdis column").with_service(SERVICE)
        })?;
        Ok(aliases
            .values
            .iter()
            .filter(|v| !v.is_empty())
            .cloned()
            .collect())
    }

    /// Map a planet or system name to the archive's default name.
    ///
    /// The alias service resolves both systems ("kepler 2" -> "HAT-P-7") and
    /// planets ("kepler 1 b" -> "TrES-2 b"). Names the service does not know,
    /// or rejects, are returned as given.
    pub async fn regularize_object_name(&self, name: &str) -> QueryResult<String> {
        let name = name.trim();
        let aliases = match self.query_aliastable(name).await {
            Ok(aliases) => aliases,
            Err(QueryError::InvalidQuery { message, .. }) => {
                debug!(name, %message, "alias lookup rejected");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        match aliases.into_iter().next() {
            Some(default) => {
                debug!(from = name, to = %default, "regularized object name");
                Ok(default)
            }
            None => {
                warn!(service = SERVICE, "No aliases found for name: '{}'", name);
                Ok(name.to_string())
            }
        }
    }

    /// Deprecated: planet lookups on the retired `exoplanets` table.
    #[deprecated(note = "the exoplanets table was replaced by ps; use query_object")]
    pub async fn query_planet(&self, name: &str) -> QueryResult<Table> {
        warn!(
            service = SERVICE,
            "query_planet is deprecated and will be removed; use query_object"
        );
        let criteria =
            QueryCriteria::new().where_clause(format!("pl_name = {}", adql_string(name.trim())));
        self.query_criteria("exoplanets", &criteria).await
    }

    /// Deprecated: host star lookups on the retired `exoplanets` table.
    #[deprecated(note = "the exoplanets table was replaced by ps; use query_object")]
    pub async fn query_star(&self, name: &str) -> QueryResult<Table> {
        warn!(
            service = SERVICE,
            "query_star is deprecated and will be removed; use query_object"
        );
        let criteria = QueryCriteria::new()
            .where_clause(format!("pl_hostname = {}", adql_string(name.trim())));
        self.query_criteria("exoplanets", &criteria).await
    }

    async fn send(&self, payload: &QueryPayload, operation: &str) -> QueryResult<Table> {
        // TAP sync takes the ADQL as a form body; the legacy API only answers GET.
        let request = match payload.route {
            Route::Api => HttpRequest::get(self.url_api.as_str()),
            Route::Tap => HttpRequest::post(self.url_tap.as_str()),
        }
        .params(payload.params.iter().cloned());
        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| e.with_operation(operation).with_service(SERVICE))?;

        check_error_body(&response.body).map_err(|e| e.with_operation(operation))?;
        let table = ipac::parse(&response.body)
            .map_err(|e| e.with_operation(operation).with_service(SERVICE))?;

        if table.is_empty() {
            warn!(service = SERVICE, operation, "Query returned no results.");
        }
        Ok(table)
    }
}

/// Reject tables the archive has retired.
fn check_table(table: &str) -> QueryResult<()> {
    if let Some((old, new)) = REPLACED_TABLES.iter().find(|(old, _)| *old == table) {
        warn!(
            service = SERVICE,
            "the '{}' table is deprecated; use '{}' instead", old, new
        );
        return Err(QueryError::invalid_table(format!(
            "The '{}' table has been replaced by '{}'. See \
             https://exoplanetarchive.ipac.caltech.edu/docs/transition.html",
            old, new
        ))
        .with_operation("check_table")
        .with_service(SERVICE)
        .with_table(*old));
    }
    if table.is_empty() {
        return Err(QueryError::invalid_query("table name must not be empty").with_service(SERVICE));
    }
    Ok(())
}

/// The API answers invalid queries with a 200 and an `ERROR` text body.
fn check_error_body(body: &str) -> QueryResult<()> {
    let trimmed = body.trim_start();
    if trimmed.starts_with("ERROR") {
        let message = trimmed
            .replace("<br>", " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        return Err(QueryError::InvalidQuery {
            message,
            context: ErrorContext::default().with_service(SERVICE),
        });
    }
    Ok(())
}
