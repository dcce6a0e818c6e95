//! Tabular results for reporting, preview and search operations.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::FleetError;

/// One value in a result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            Cell::Decimal(d) if d.fract().is_zero() => i64::try_from(*d).ok(),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Cell::Decimal(d) => Some(*d),
            Cell::Int(v) => Some(Decimal::from(*v)),
            Cell::Float(f) => Decimal::try_from(*f).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Timestamp(ts) => Some(ts.date()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(v) => write!(f, "{v}"),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Decimal(v) => write!(f, "{v}"),
            Cell::Text(v) => f.write_str(v),
            Cell::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Cell::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self { Cell::Int(v.into()) }
}

impl From<Decimal> for Cell {
    fn from(v: Decimal) -> Self { Cell::Decimal(v) }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self { Cell::Text(v.to_string()) }
}

impl From<String> for Cell {
    fn from(v: String) -> Self { Cell::Text(v) }
}

impl From<Option<String>> for Cell {
    fn from(v: Option<String>) -> Self { v.map(Cell::Text).unwrap_or(Cell::Null) }
}

impl From<NaiveDate> for Cell {
    fn from(v: NaiveDate) -> Self { Cell::Date(v) }
}

impl From<NaiveDateTime> for Cell {
    fn from(v: NaiveDateTime) -> Self { Cell::Timestamp(v) }
}

/// Ordered columns plus rows of cells. Column lookups ignore case, matching
/// how the store folds unquoted identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn with_rows(columns: &[&str], rows: Vec<Vec<Cell>>) -> Self {
        let mut set = Self::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            set.push_row(row);
        }
        set
    }

    /// Rows shorter than the column list are padded with nulls; longer rows are cut.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Value or a schema error naming the missing column.
    pub fn cell(&self, row: usize, column: &str) -> Result<&Cell, FleetError> {
        self.value(row, column)
            .ok_or_else(|| FleetError::Schema(format!("column '{column}' missing from row {row}")))
    }

    pub fn get_i32(&self, row: usize, column: &str) -> Result<i32, FleetError> {
        self.cell(row, column)?
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| type_mismatch(column, "integer"))
    }

    pub fn get_decimal(&self, row: usize, column: &str) -> Result<Decimal, FleetError> {
        self.cell(row, column)?.as_decimal().ok_or_else(|| type_mismatch(column, "numeric"))
    }

    pub fn get_string(&self, row: usize, column: &str) -> Result<String, FleetError> {
        self.get_opt_string(row, column)?.ok_or_else(|| type_mismatch(column, "text"))
    }

    pub fn get_opt_string(&self, row: usize, column: &str) -> Result<Option<String>, FleetError> {
        match self.cell(row, column)? {
            Cell::Null => Ok(None),
            Cell::Text(s) => Ok(Some(s.clone())),
            _ => Err(type_mismatch(column, "text")),
        }
    }

    pub fn get_date(&self, row: usize, column: &str) -> Result<NaiveDate, FleetError> {
        self.cell(row, column)?.as_date().ok_or_else(|| type_mismatch(column, "date"))
    }

    pub fn get_timestamp(&self, row: usize, column: &str) -> Result<NaiveDateTime, FleetError> {
        self.cell(row, column)?.as_timestamp().ok_or_else(|| type_mismatch(column, "timestamp"))
    }
}

fn type_mismatch(column: &str, expected: &str) -> FleetError {
    FleetError::Schema(format!("column '{column}' is not a non-null {expected}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RowSet {
        RowSet::with_rows(
            &["vehicle_id", "license_plate", "mileage", "status"],
            vec![vec![7.into(), "LEA-1234".into(), Decimal::new(1250050, 2).into(), Cell::Null]],
        )
    }

    #[test]
    fn lookups_ignore_case() {
        let rows = sample();
        assert_eq!(rows.column_index("VehicleID"), None);
        assert_eq!(rows.get_i32(0, "VEHICLE_ID").unwrap(), 7);
        assert_eq!(rows.get_string(0, "License_Plate").unwrap(), "LEA-1234");
        assert_eq!(rows.get_decimal(0, "mileage").unwrap(), Decimal::new(1250050, 2));
    }

    #[test]
    fn null_and_missing_columns() {
        let rows = sample();
        assert_eq!(rows.get_opt_string(0, "status").unwrap(), None);
        assert!(matches!(rows.get_string(0, "status"), Err(FleetError::Schema(_))));
        assert!(matches!(rows.get_i32(0, "driver_id"), Err(FleetError::Schema(_))));
        assert!(matches!(rows.get_i32(1, "vehicle_id"), Err(FleetError::Schema(_))));
    }

    #[test]
    fn short_rows_are_padded() {
        let mut rows = RowSet::new(vec!["a".into(), "b".into()]);
        rows.push_row(vec![Cell::Int(1)]);
        assert_eq!(rows.rows()[0], vec![Cell::Int(1), Cell::Null]);
    }

    #[test]
    fn serializes_cells_as_plain_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["rows"][0][0], serde_json::json!(7));
        assert!(json["rows"][0][3].is_null());
    }
}
