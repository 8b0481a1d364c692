// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use serde_json::{Map, Value};
use std::io::Write;

use crate::error::FmpError;

/// One record of a table: field name to JSON value, in response order.
pub type Row = Map<String, Value>;

/// Rows of uniformly-shaped records reshaped from an FMP response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// Parses a response body that is a list of objects or a single flat object.
    pub fn from_json(body: &str) -> Result<Self, FmpError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| FmpError::unparseable(body, e.to_string()))?;
        Self::from_value(value, body)
    }

    pub(crate) fn from_value(value: Value, body: &str) -> Result<Self, FmpError> {
        match value {
            Value::Array(items) => {
                let mut rows = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(row) => rows.push(row),
                        other => {
                            return Err(FmpError::unparseable(
                                body,
                                format!("expected a list of objects, found element {}", other),
                            ))
                        }
                    }
                }
                Ok(Self::from_rows(rows))
            }
            Value::Object(obj) => {
                if let Some(message) = obj.get("Error Message") {
                    return Err(FmpError::unparseable(body, format!("API error: {}", message)));
                }
                if obj.is_empty() {
                    return Ok(Self::default());
                }
                Ok(Self::from_rows(vec![obj]))
            }
            _ => Err(FmpError::unparseable(body, "expected a JSON object or list")),
        }
    }

    /// Turns records into a `field` column plus one value column per record
    /// (`info`, `info_1`, ...), one row per field.
    pub fn transposed(&self) -> Self {
        let mut value_columns = Vec::with_capacity(self.rows.len());
        for i in 0..self.rows.len() {
            value_columns.push(if i == 0 {
                "info".to_string()
            } else {
                format!("info_{}", i)
            });
        }

        let rows = self
            .columns
            .iter()
            .map(|field| {
                let mut row = Row::new();
                row.insert("field".to_string(), Value::String(field.clone()));
                for (name, record) in value_columns.iter().zip(&self.rows) {
                    row.insert(
                        name.clone(),
                        record.get(field).cloned().unwrap_or(Value::Null),
                    );
                }
                row
            })
            .collect();

        let mut columns = vec!["field".to_string()];
        columns.extend(value_columns);
        Self { columns, rows }
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

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row)?.get(column)
    }

    /// Values of one column; rows without the field yield `None`.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a Value>> + 'a {
        self.rows.iter().map(move |row| row.get(name))
    }

    /// Writes a header line followed by one CSV record per row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), FmpError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(
                self.columns
                    .iter()
                    .map(|c| row.get(c).map(cell_text).unwrap_or_default()),
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// CSV cell text: strings unquoted, null empty, everything else as JSON.
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
