// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use chrono::NaiveDate;
use serde_json::Value;

use super::table::{Row, Table};
use crate::error::FmpError;

pub const DEFAULT_INTERVAL: &str = "daily";

/// One dated record of a price series. `fields` holds everything but `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub fields: Row,
}

impl Observation {
    pub fn value(&self, field: &str) -> Option<f64> {
        self.fields.get(field)?.as_f64()
    }
}

/// Date-indexed price table tagged with its instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    instrument: String,
    interval: Option<String>,
    observations: Vec<Observation>,
}

impl PriceSeries {
    /// Sorts `observations` ascending by date; records sharing a date keep
    /// their relative order.
    pub fn new(instrument: impl Into<String>, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        Self {
            instrument: instrument.into(),
            interval: None,
            observations,
        }
    }

    /// Parses a `historical-price-full` body: `{"symbol": .., "historical": [..]}`.
    pub fn from_historical_json(instrument: &str, body: &str) -> Result<Self, FmpError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| FmpError::unparseable(body, e.to_string()))?;

        let mut obj = match value {
            Value::Object(obj) => obj,
            _ => return Err(FmpError::unparseable(body, "expected a JSON object")),
        };
        // FMP answers unknown symbols with an empty object
        if obj.is_empty() {
            return Ok(Self::new(instrument, Vec::new()));
        }

        let historical = match obj.remove("historical") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(FmpError::unparseable(body, "'historical' is not a list")),
            None => return Err(FmpError::unparseable(body, "missing 'historical'")),
        };

        let mut observations = Vec::with_capacity(historical.len());
        for item in historical {
            let Value::Object(mut fields) = item else {
                return Err(FmpError::unparseable(body, "historical entry is not an object"));
            };
            let date = match fields.get("date") {
                Some(Value::String(s)) => parse_date(s)
                    .ok_or_else(|| FmpError::unparseable(body, format!("bad date '{}'", s)))?,
                _ => return Err(FmpError::unparseable(body, "historical entry without date")),
            };
            // Map::remove swap-removes under preserve_order; retain keeps field order
            fields.retain(|k, _| k != "date");
            observations.push(Observation { date, fields });
        }

        Ok(Self::new(instrument, observations))
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Sampling interval label, `daily` unless overridden.
    pub fn interval(&self) -> &str {
        self.interval.as_deref().unwrap_or(DEFAULT_INTERVAL)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Observations with `start <= date <= end`; a missing bound is open.
    pub fn window(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> &[Observation] {
        let lo = match start {
            Some(start) => self.observations.partition_point(|o| o.date < start),
            None => 0,
        };
        let hi = match end {
            Some(end) => self.observations.partition_point(|o| o.date <= end),
            None => self.observations.len(),
        };
        if lo >= hi {
            return &[];
        }
        &self.observations[lo..hi]
    }

    /// Flattens the series into a table with `date` as the first column.
    pub fn to_table(&self) -> Table {
        let rows = self
            .observations
            .iter()
            .map(|o| {
                let mut row = Row::new();
                row.insert(
                    "date".to_string(),
                    Value::String(o.date.format("%Y-%m-%d").to_string()),
                );
                for (k, v) in &o.fields {
                    row.insert(k.clone(), v.clone());
                }
                row
            })
            .collect();
        Table::from_rows(rows)
    }
}

/// Accepts `2023-01-03` and timestamp forms such as `2023-01-03 00:00:00`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let day = s.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn daily_series(from: &str, days: u64) -> PriceSeries {
        let start = date(from);
        let observations = (0..days)
            .map(|i| {
                let mut fields = Row::new();
                fields.insert("close".to_string(), json!(100.0 + i as f64));
                Observation {
                    date: start + chrono::Days::new(i),
                    fields,
                }
            })
            .collect();
        PriceSeries::new("AAPL", observations)
    }

    #[test]
    fn test_parse_historical() {
        let body = r#"{"symbol":"AAPL","historical":[{"date":"2023-01-03","open":1,"high":2,"low":0.5,"close":1.5,"volume":100}]}"#;
        let series = PriceSeries::from_historical_json("AAPL", body).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.instrument(), "AAPL");
        assert_eq!(series.interval(), "daily");
        let obs = &series.observations()[0];
        assert_eq!(obs.date, date("2023-01-03"));
        assert!(!obs.fields.contains_key("date"));
        assert_relative_eq!(obs.value("low").unwrap(), 0.5);
        assert_relative_eq!(obs.value("volume").unwrap(), 100.0);
    }

    #[test]
    fn test_parse_sorts_newest_first_response() {
        let body = r#"{"historical":[
            {"date":"2023-01-05","close":3},
            {"date":"2023-01-04","close":2},
            {"date":"2023-01-03 00:00:00","close":1}
        ]}"#;
        let series = PriceSeries::from_historical_json("MSFT", body).unwrap();

        assert_eq!(series.first_date(), Some(date("2023-01-03")));
        assert_eq!(series.last_date(), Some(date("2023-01-05")));
        assert_relative_eq!(series.observations()[0].value("close").unwrap(), 1.0);
    }

    #[test]
    fn test_parse_empty_and_bad_bodies() {
        assert!(PriceSeries::from_historical_json("NOPE", "{}").unwrap().is_empty());

        for body in [
            r#"{"Error Message":"Invalid API KEY."}"#,
            r#"{"historical":{"date":"2023-01-03"}}"#,
            r#"{"historical":[{"close":1}]}"#,
            r#"{"historical":[{"date":"03/01/2023"}]}"#,
            "[]",
            "not json",
        ] {
            assert!(
                matches!(
                    PriceSeries::from_historical_json("AAPL", body),
                    Err(FmpError::UnparseableResponse { .. })
                ),
                "{body} should be unparseable"
            );
        }
    }

    #[test]
    fn test_window_bounds() {
        let series = daily_series("2023-01-01", 10);

        let from_start = series.window(Some(date("2023-01-02")), None);
        assert_eq!(from_start.len(), 9);
        assert_eq!(from_start[0].date, date("2023-01-02"));
        assert_eq!(from_start[8].date, date("2023-01-10"));

        let until_end = series.window(None, Some(date("2023-01-04")));
        assert_eq!(until_end.len(), 4);
        assert_eq!(until_end[3].date, date("2023-01-04"));

        let closed = series.window(Some(date("2023-01-03")), Some(date("2023-01-05")));
        assert_eq!(
            closed.iter().map(|o| o.date).collect::<Vec<_>>(),
            vec![date("2023-01-03"), date("2023-01-04"), date("2023-01-05")]
        );

        assert_eq!(series.window(None, None).len(), 10);
        // Bounds between observations and outside the series
        assert_eq!(series.window(Some(date("2022-12-01")), Some(date("2022-12-31"))).len(), 0);
        assert_eq!(series.window(Some(date("2023-01-08")), Some(date("2023-01-02"))).len(), 0);
    }

    #[test]
    fn test_to_table_and_interval() {
        let series = daily_series("2023-01-01", 2).with_interval("1hour");
        assert_eq!(series.interval(), "1hour");

        let table = series.to_table();
        assert_eq!(table.columns(), &["date", "close"]);
        assert_eq!(table.get(1, "date"), Some(&json!("2023-01-02")));
    }
}
