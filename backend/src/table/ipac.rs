//! IPAC fixed-width text table parser.
//!
//! ```text
//! \fixlen = T
//! \ comment
//! |   kepid|kepoi_name|        ra|koi_period|
//! |     int|      char|    double|    double|
//! |        |          |   degrees|      days|
//! |    null|      null|      null|      null|
//!  10601284  K00082.01  280.12345  16.145699
//! ```
//!
//! The first `|` line gives names and fixes the column boundaries; the
//! optional second to fourth give data types, units and null markers.

use super::units::{normalize_table, Unit};
use super::{Column, Table};
use crate::error::{QueryError, QueryResult};

/// Parse an IPAC table. A header with no data rows is a valid empty table.
pub fn parse(text: &str) -> QueryResult<Table> {
    let mut table = Table::default();
    let mut header: Vec<Vec<String>> = Vec::new();
    let mut bounds: Vec<(usize, usize)> = Vec::new();
    let mut columns: Vec<Column> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');

        if let Some(keyword) = line.strip_prefix('\\') {
            if let Some((key, value)) = keyword.split_once('=') {
                let key = key.trim();
                if !key.is_empty() && !key.contains(' ') {
                    table
                        .meta
                        .insert(key.to_string(), value.trim().trim_matches('\'').to_string());
                }
            }
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with('|') && columns.is_empty() {
            let chars: Vec<char> = line.chars().collect();
            if bounds.is_empty() {
                bounds = column_bounds(&chars);
                if bounds.is_empty() {
                    return Err(QueryError::parse(format!(
                        "line {}: header has no columns",
                        line_no + 1
                    )));
                }
            }
            if header.len() == 4 {
                return Err(QueryError::parse(format!(
                    "line {}: more than four header lines",
                    line_no + 1
                )));
            }
            header.push(
                line.trim_end()
                    .trim_matches('|')
                    .split('|')
                    .map(|field| field.trim().to_string())
                    .collect(),
            );
            continue;
        }

        if bounds.is_empty() {
            return Err(QueryError::parse(format!(
                "line {}: data before the IPAC header: '{}'",
                line_no + 1,
                line.trim()
            )));
        }
        if columns.is_empty() {
            columns = build_columns(&header, bounds.len(), line_no)?;
        }

        let chars: Vec<char> = line.chars().collect();
        let nulls = header.get(3);
        for (i, column) in columns.iter_mut().enumerate() {
            let (start, end) = bounds[i];
            let end = if i + 1 == bounds.len() { chars.len() } else { end };
            let cell: String = chars
                .get(start.min(chars.len())..end.min(chars.len()))
                .map(|s| s.iter().collect())
                .unwrap_or_default();
            let cell = cell.trim();
            let null = nulls.and_then(|n| n.get(i)).map_or("null", String::as_str);
            let is_null = cell == "null" || (!null.is_empty() && cell == null);
            column
                .values
                .push(if is_null { String::new() } else { cell.to_string() });
        }
    }

    if bounds.is_empty() {
        return Err(QueryError::parse("IPAC table has no header line"));
    }
    if columns.is_empty() {
        columns = build_columns(&header, bounds.len(), 0)?;
    }

    table = Table {
        meta: table.meta,
        ..Table::new(columns)
    };
    normalize_table(&mut table);
    Ok(table)
}

/// `(start, end)` character span of each column: from just after a `|` up to
/// and including the next one.
fn column_bounds(chars: &[char]) -> Vec<(usize, usize)> {
    let pipes: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == '|')
        .map(|(i, _)| i)
        .collect();
    pipes.windows(2).map(|w| (w[0] + 1, w[1] + 1)).collect()
}

fn build_columns(header: &[Vec<String>], count: usize, line_no: usize) -> QueryResult<Vec<Column>> {
    let names = &header[0];
    for (row, fields) in header.iter().enumerate() {
        if fields.len() != count {
            return Err(QueryError::parse(format!(
                "line {}: header line {} has {} fields, expected {}",
                line_no + 1,
                row + 1,
                fields.len(),
                count
            )));
        }
    }

    Ok(names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut column = Column::new(name.clone());
            column.data_type = header.get(1).map(|types| types[i].clone());
            // Raw spelling; normalize_table maps it afterwards.
            column.unit = header
                .get(2)
                .map(|units| units[i].clone())
                .filter(|u| !u.is_empty())
                .map(Unit::Unrecognized);
            column
        })
        .collect())
}
