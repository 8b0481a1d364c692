// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

/// Errors returned by the FMP client, the table parsers and the chart renderer.
#[derive(Debug, Error)]
pub enum FmpError {
    /// A selector string outside its closed set of options.
    #[error("'{value}' is not valid {kind} - choose from possible options [{}]", .options.join(", "))]
    InvalidSelector {
        kind: &'static str,
        value: String,
        options: &'static [&'static str],
    },

    /// The response body could not be shaped into a table. Carries the raw body.
    #[error("unparseable response ({reason}): {body}")]
    UnparseableResponse { body: String, reason: String },

    #[error("ticker empty")]
    EmptySymbol,

    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("FINANCIALMODELINGPREP_API_KEY must be set")]
    MissingApiKey,

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    /// A chart needs a numeric field that an observation does not carry.
    #[error("missing numeric field '{field}' on {date}")]
    MissingField {
        field: &'static str,
        date: chrono::NaiveDate,
    },

    #[error("no observations in the selected date range")]
    EmptyWindow,

    #[error("chart rendering failed: {0}")]
    Chart(String),
}

impl FmpError {
    pub(crate) fn invalid_selector(
        kind: &'static str,
        value: &str,
        options: &'static [&'static str],
    ) -> Self {
        Self::InvalidSelector {
            kind,
            value: value.to_string(),
            options,
        }
    }

    pub(crate) fn unparseable(body: &str, reason: impl Into<String>) -> Self {
        Self::UnparseableResponse {
            body: body.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures detected locally, before or after the request,
    /// where a caller may fall back to an empty table.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidSelector { .. } | Self::UnparseableResponse { .. } | Self::EmptySymbol
        )
    }
}
