// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Client for the Financial Modeling Prep API.
//!
//! [`FMPClient`] turns a symbol plus a selector (report type, period, asset
//! class, ...) into one GET request and reshapes the JSON answer into a
//! [`Table`], or into a date-indexed [`PriceSeries`] for daily prices.
//! [`viz::draw_chart`] renders a price series as a candlestick, line or OHLC
//! chart with a volume panel.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod viz;

pub use api::{FMPClient, HttpTransport, Transport, DEFAULT_LIMIT};
pub use config::{load_config, Config};
pub use error::FmpError;
pub use models::{
    AssetType, ChartKind, InfoType, MarketType, Observation, Period, PriceSeries, ReportType,
    Row, Selector, Table,
};
