use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::item::json_kind;
use crate::errors::TableError;

/// One table value.
///
/// Equality is total: every NaN equals every other NaN and `-0.0` equals
/// `0.0`, so cells can be hashed and rows compared column by column.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`.
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(flag) => Ok(Self::Bool(*flag)),
            Value::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    Ok(Self::Integer(integer))
                } else if let Some(unsigned) = number.as_u64() {
                    Ok(Self::Unsigned(unsigned))
                } else {
                    number
                        .as_f64()
                        .map(Self::Float)
                        .ok_or_else(|| format!("number `{number}` is not representable"))
                }
            }
            Value::String(text) => Ok(Self::Text(text.clone())),
            other => Err(format!("nested values are not supported, got {}", json_kind(other))),
        }
    }

    fn float_key(value: f64) -> u64 {
        if value.is_nan() {
            f64::NAN.to_bits()
        } else if value == 0.0 {
            0.0_f64.to_bits()
        } else {
            value.to_bits()
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Integer(left), Self::Integer(right)) => left == right,
            (Self::Unsigned(left), Self::Unsigned(right)) => left == right,
            (Self::Float(left), Self::Float(right)) => {
                Self::float_key(*left) == Self::float_key(*right)
            }
            (Self::Text(left), Self::Text(right)) => left == right,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(flag) => flag.hash(state),
            Self::Integer(integer) => integer.hash(state),
            Self::Unsigned(unsigned) => unsigned.hash(state),
            Self::Float(float) => Self::float_key(*float).hash(state),
            Self::Text(text) => text.hash(state),
        }
    }
}

pub type Row = Vec<Cell>;

/// Named columns and rows of equal width.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// Table as read from JSON, before cell validation.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TableRecord {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self, TableError> {
        let expected = columns.len();
        if let Some((row, found)) =
            rows.iter().map(Vec::len).enumerate().find(|(_, found)| *found != expected)
        {
            return Err(TableError::RowWidth { row, expected, found });
        }

        Ok(Self { columns, rows })
    }

    pub fn from_record(record: TableRecord) -> Result<Self, TableError> {
        let rows = record
            .rows
            .iter()
            .enumerate()
            .map(|(row, values)| {
                values
                    .iter()
                    .enumerate()
                    .map(|(column, value)| {
                        Cell::from_value(value).map_err(|reason| TableError::UnsupportedCell {
                            row,
                            column: record
                                .columns
                                .get(column)
                                .cloned()
                                .unwrap_or_else(|| format!("#{column}")),
                            reason,
                        })
                    })
                    .collect::<Result<Row, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(record.columns, rows)
    }

    pub(crate) fn with_rows(&self, rows: Vec<Row>) -> Self {
        Self { columns: self.columns.clone(), rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
