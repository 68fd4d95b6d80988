//! Tabular results returned by the archive services.
//!
//! A [`Table`] keeps every cell as text, together with the column's declared
//! data type and unit. Numeric access and sky positions are derived on demand.
//!
//! # Parsers
//!
//! - [`ipac`]: IPAC fixed-width text tables (NASA Exoplanet Archive)
//! - [`tap_json`]: TAP JSON results (ESASky)
//! - [`units`]: normalisation of the archive's unit spellings

use std::collections::BTreeMap;

use crate::coords::SkyPosition;
use crate::error::{QueryError, QueryResult};

pub mod ipac;
pub mod tap_json;
pub mod units;

pub use units::Unit;

/// One named column of text cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: Option<String>,
    pub unit: Option<Unit>,
    pub values: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            unit: None,
            values: Vec::new(),
        }
    }

    /// Cells parsed as `f64`; empty cells become `None`.
    pub fn as_f64(&self) -> QueryResult<Vec<Option<f64>>> {
        self.values
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                if cell.is_empty() {
                    return Ok(None);
                }
                cell.parse::<f64>().map(Some).map_err(|_| {
                    QueryError::parse(format!(
                        "column '{}' row {}: '{}' is not a number",
                        self.name, row, cell
                    ))
                })
            })
            .collect()
    }
}

/// Parsed result table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    /// Header keywords (IPAC `\key = value` lines).
    pub meta: BTreeMap<String, String>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            meta: BTreeMap::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows (all columns share one length).
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell at (`row`, `column`).
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        self.column(column)
            .and_then(|c| c.values.get(row))
            .map(String::as_str)
    }

    /// Columns whose unit was not recognised.
    pub fn unrecognized_units(&self) -> Vec<(&str, &str)> {
        self.columns
            .iter()
            .filter_map(|c| match &c.unit {
                Some(Unit::Unrecognized(raw)) => Some((c.name.as_str(), raw.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Positions built from the `ra`/`dec` columns, if both are present.
    pub fn sky_positions(&self) -> QueryResult<Option<Vec<Option<SkyPosition>>>> {
        self.sky_positions_from("ra", "dec")
    }

    /// Positions built from the named right ascension and declination columns
    /// (decimal degrees). Rows with an empty cell yield `None`.
    pub fn sky_positions_from(
        &self,
        ra_column: &str,
        dec_column: &str,
    ) -> QueryResult<Option<Vec<Option<SkyPosition>>>> {
        let (Some(ra), Some(dec)) = (self.column(ra_column), self.column(dec_column)) else {
            return Ok(None);
        };

        let positions = ra
            .as_f64()?
            .into_iter()
            .zip(dec.as_f64()?)
            .map(|pair| match pair {
                (Some(ra), Some(dec)) => SkyPosition::from_degrees(ra, dec).map(Some),
                _ => Ok(None),
            })
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(Some(positions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, values: &[&str]) -> Column {
        Column {
            values: values.iter().map(|v| v.to_string()).collect(),
            ..Column::new(name)
        }
    }

    #[test]
    fn test_len_and_lookup() {
        let table = Table::new(vec![
            column("pl_name", &["K2-18 b", "Kepler-11 b"]),
            column("disc_year", &["2015", "2010"]),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, "pl_name"), Some("Kepler-11 b"));
        assert_eq!(table.value(2, "pl_name"), None);
        assert_eq!(table.column_names(), vec!["pl_name", "disc_year"]);
        assert!(Table::default().is_empty());
    }

    #[test]
    fn test_numeric_column() {
        let col = column("dec", &["7.5878315", "", "-1"]);
        assert_eq!(col.as_f64().unwrap(), vec![Some(7.5878315), None, Some(-1.0)]);
        assert!(column("dec", &["north"]).as_f64().is_err());
    }

    #[test]
    fn test_sky_positions() {
        let table = Table::new(vec![
            column("ra", &["172.560141", ""]),
            column("dec", &["7.5878315", "1.0"]),
        ]);
        let positions = table.sky_positions().unwrap().unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].unwrap().ra().value(), 172.560141);
        assert!(positions[1].is_none());

        let no_coords = Table::new(vec![column("pl_name", &["x"])]);
        assert!(no_coords.sky_positions().unwrap().is_none());
    }

    #[test]
    fn test_unrecognized_units_listed() {
        let mut flux = column("flux", &["1"]);
        flux.unit = Some(Unit::Unrecognized("furlongs".to_string()));
        let mut ra = column("ra", &["1"]);
        ra.unit = Some(Unit::Recognized("deg".to_string()));
        let table = Table::new(vec![flux, ra]);
        assert_eq!(table.unrecognized_units(), vec![("flux", "furlongs")]);
    }
}
