//! TAP JSON result parser (`FORMAT=json`).
//!
//! ```json
//! {
//!   "metadata": [{"name": "ra", "datatype": "DOUBLE", "unit": "deg"}],
//!   "data": [[265.07], [265.11]]
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;

use super::units::{normalize_table, Unit};
use super::{Column, Table};
use crate::error::{QueryError, QueryResult};

#[derive(Debug, Deserialize)]
struct TapResult {
    metadata: Vec<FieldMeta>,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct FieldMeta {
    name: String,
    #[serde(default)]
    datatype: Option<String>,
    #[serde(default)]
    unit: Option<String>,
}

pub fn parse(text: &str) -> QueryResult<Table> {
    let result: TapResult = serde_json::from_str(text)?;

    let mut columns: Vec<Column> = result
        .metadata
        .into_iter()
        .map(|field| {
            let mut column = Column::new(field.name);
            column.data_type = field.datatype;
            column.unit = field.unit.filter(|u| !u.trim().is_empty()).map(Unit::Unrecognized);
            column
        })
        .collect();

    for (row_no, row) in result.data.into_iter().enumerate() {
        if row.len() != columns.len() {
            return Err(QueryError::parse(format!(
                "row {} has {} cells, expected {}",
                row_no,
                row.len(),
                columns.len()
            )));
        }
        for (column, cell) in columns.iter_mut().zip(row) {
            column.values.push(cell_text(cell));
        }
    }

    let mut table = Table::new(columns);
    normalize_table(&mut table);
    Ok(table)
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_and_units() {
        let text = r#"{
            "metadata": [
                {"name": "name", "datatype": "CHAR"},
                {"name": "ra", "datatype": "DOUBLE", "unit": "deg"},
                {"name": "flux", "datatype": "DOUBLE", "unit": ""}
            ],
            "data": [
                ["XMMSL1 J174005.5+690034", 265.023, 1.5e-12],
                ["XMMSL1 J174023.1+685944", 265.096, null]
            ]
        }"#;

        let table = parse(text).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "ra"), Some("265.023"));
        assert_eq!(table.value(1, "flux"), Some(""));
        assert_eq!(table.value(0, "flux"), Some("1.5e-12"));
        assert_eq!(
            table.column("ra").unwrap().unit,
            Some(Unit::Recognized("deg".into()))
        );
        assert_eq!(table.column("flux").unwrap().unit, None);
    }

    #[test]
    fn test_no_rows() {
        let table = parse(r#"{"metadata": [{"name": "ra"}], "data": []}"#).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_names(), vec!["ra"]);
    }

    #[test]
    fn test_ragged_row_is_error() {
        let err = parse(r#"{"metadata": [{"name": "a"}], "data": [[1, 2]]}"#).unwrap_err();
        assert!(err.to_string().contains("expected 1"));
    }

    #[test]
    fn test_not_json_is_parse_error() {
        assert!(matches!(
            parse("<VOTABLE/>").unwrap_err(),
            QueryError::Parse { .. }
        ));
    }
}
