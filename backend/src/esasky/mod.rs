//! ESASky catalog client.
//!
//! The catalogs endpoint describes every mission catalog and which TAP table
//! and coordinate columns back it. Cone searches are then run per catalog
//! against the TAP sync endpoint, one request after another.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use qtty::Degrees;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::coords::SkyPosition;
use crate::error::{ErrorContext, QueryError, QueryResult};
use crate::table::{tap_json, Table};
use crate::transport::{HttpRequest, Transport};

const SERVICE: &str = "esasky";

/// One catalog as described by the catalogs endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDescriptor {
    pub mission: String,
    pub tap_table: String,
    pub tap_ra_column: String,
    pub tap_dec_column: String,
}

#[derive(Debug, Deserialize)]
struct CatalogList {
    descriptors: Vec<CatalogDescriptor>,
}

/// Which catalogs a region query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSelection {
    All,
    Named(Vec<String>),
}

impl CatalogSelection {
    /// `"all"` (any case) selects every catalog, anything else one catalog.
    pub fn parse(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("all") {
            CatalogSelection::All
        } else {
            CatalogSelection::Named(vec![name.trim().to_string()])
        }
    }
}

pub struct EsaSky<T> {
    transport: T,
    url_tap: String,
    url_catalogs: String,
    row_limit: u32,
    catalogs: RwLock<Option<Vec<CatalogDescriptor>>>,
}

impl<T: Transport> EsaSky<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            url_tap: config.esasky.url_tap.clone(),
            url_catalogs: config.esasky.url_catalogs.clone(),
            row_limit: config.esasky.row_limit,
            catalogs: RwLock::new(None),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Row limit used when a query does not give its own.
    pub fn default_row_limit(&self) -> u32 {
        self.row_limit
    }

    /// Catalog descriptors, fetched once and cached.
    pub async fn list_catalogs(&self) -> QueryResult<Vec<CatalogDescriptor>> {
        if let Some(catalogs) = self.catalogs.read().as_ref() {
            return Ok(catalogs.clone());
        }

        let request = HttpRequest::get(self.url_catalogs.as_str()).param("lang", "en");
        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| e.with_operation("list_catalogs").with_service(SERVICE))?;
        let list: CatalogList = serde_json::from_str(&response.body)
            .map_err(|e| QueryError::from(e).with_operation("list_catalogs").with_service(SERVICE))?;

        debug!(count = list.descriptors.len(), "loaded ESASky catalogs");
        *self.catalogs.write() = Some(list.descriptors.clone());
        Ok(list.descriptors)
    }

    pub async fn get_catalog_names(&self) -> QueryResult<Vec<String>> {
        Ok(self
            .list_catalogs()
            .await?
            .into_iter()
            .map(|c| c.mission)
            .collect())
    }

    /// Cone search over the selected catalogs.
    ///
    /// Returns one table per catalog that had at least one source in the
    /// region, keyed by mission name.
    pub async fn query_region_catalogs(
        &self,
        position: SkyPosition,
        radius: Degrees,
        selection: &CatalogSelection,
        row_limit: u32,
    ) -> QueryResult<BTreeMap<String, Table>> {
        if !radius.value().is_finite() || radius.value() < 0.0 {
            return Err(QueryError::invalid_query(format!(
                "search radius must be a non-negative angle, got {} deg",
                radius.value()
            ))
            .with_service(SERVICE));
        }
        if row_limit == 0 {
            return Err(
                QueryError::invalid_query("row limit must be at least 1").with_service(SERVICE)
            );
        }

        let catalogs = self.select_catalogs(selection).await?;
        let mut results = BTreeMap::new();
        for catalog in catalogs {
            let table = self.query_catalog(&catalog, position, radius, row_limit).await?;
            if table.is_empty() {
                debug!(mission = %catalog.mission, "no sources in region");
                continue;
            }
            results.insert(catalog.mission, table);
        }

        if results.is_empty() {
            warn!(service = SERVICE, "Query returned no results.");
        }
        Ok(results)
    }

    async fn select_catalogs(
        &self,
        selection: &CatalogSelection,
    ) -> QueryResult<Vec<CatalogDescriptor>> {
        let available = self.list_catalogs().await?;
        let names = match selection {
            CatalogSelection::All => return Ok(available),
            CatalogSelection::Named(names) => names,
        };

        names
            .iter()
            .map(|name| {
                available
                    .iter()
                    .find(|c| c.mission.eq_ignore_ascii_case(name.trim()))
                    .cloned()
                    .ok_or_else(|| {
                        let valid: Vec<&str> =
                            available.iter().map(|c| c.mission.as_str()).collect();
                        QueryError::InvalidQuery {
                            message: format!(
                                "unknown catalog '{}'; valid catalogs are: {}",
                                name,
                                valid.join(", ")
                            ),
                            context: ErrorContext::new("query_region_catalogs")
                                .with_service(SERVICE),
                        }
                    })
            })
            .collect()
    }

    async fn query_catalog(
        &self,
        catalog: &CatalogDescriptor,
        position: SkyPosition,
        radius: Degrees,
        row_limit: u32,
    ) -> QueryResult<Table> {
        let request = HttpRequest::get(self.url_tap.as_str())
            .param("REQUEST", "doQuery")
            .param("LANG", "ADQL")
            .param("FORMAT", "json")
            .param("QUERY", cone_search_adql(catalog, position, radius, row_limit));

        // The table slot may already name the fixture group.
        let response = self.transport.send(&request).await.map_err(|e| {
            e.with_operation("query_region_catalogs")
                .with_service(SERVICE)
                .with_details(format!("mission={}", catalog.mission))
        })?;
        tap_json::parse(&response.body).map_err(|e| {
            e.with_operation("query_region_catalogs")
                .with_service(SERVICE)
                .with_table(catalog.mission.as_str())
        })
    }
}

fn cone_search_adql(
    catalog: &CatalogDescriptor,
    position: SkyPosition,
    radius: Degrees,
    row_limit: u32,
) -> String {
    format!(
        "SELECT TOP {} * FROM {} WHERE 1=CONTAINS(POINT('ICRS', {}, {}), CIRCLE('ICRS', {}, {}, {}))",
        row_limit,
        catalog.tap_table,
        catalog.tap_ra_column,
        catalog.tap_dec_column,
        position.ra().value(),
        position.dec().value(),
        radius.value()
    )
}
