// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Closed option sets accepted by the client and the chart renderer.
//!
//! Every selector parses from its snake_case key (`company_profile`,
//! `quarter`, `candle`, ...). An unknown key is rejected here, before any
//! request can be built.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::FmpError;

/// Shared behaviour of the selector enums.
pub trait Selector: Sized + Copy + 'static {
    /// Name used in error messages, e.g. `info_type`.
    const KIND: &'static str;
    /// Every variant, in the order options are listed to users.
    const ALL: &'static [Self];
    /// Keys of [`Self::ALL`], same order.
    const OPTIONS: &'static [&'static str];

    fn key(&self) -> &'static str;
}

fn parse_selector<S: Selector>(value: &str) -> Result<S, FmpError> {
    S::ALL
        .iter()
        .copied()
        .find(|s| s.key() == value)
        .ok_or_else(|| {
            let err = FmpError::invalid_selector(S::KIND, value, S::OPTIONS);
            warn!("{}", err);
            err
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InfoType {
    #[default]
    CompanyProfile,
    CompanyRating,
    HistoricalRating,
    Recommendations,
}

impl InfoType {
    /// Profile and rating come back as a single record shown field per row.
    pub fn is_single_record(&self) -> bool {
        matches!(self, Self::CompanyProfile | Self::CompanyRating)
    }
}

impl Selector for InfoType {
    const KIND: &'static str = "info_type";
    const ALL: &'static [Self] = &[
        Self::CompanyProfile,
        Self::CompanyRating,
        Self::HistoricalRating,
        Self::Recommendations,
    ];
    const OPTIONS: &'static [&'static str] = &[
        "company_profile",
        "company_rating",
        "historical_rating",
        "recommendations",
    ];

    fn key(&self) -> &'static str {
        match self {
            Self::CompanyProfile => "company_profile",
            Self::CompanyRating => "company_rating",
            Self::HistoricalRating => "historical_rating",
            Self::Recommendations => "recommendations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReportType {
    #[default]
    BalanceStatement,
    IncomeStatement,
    CashflowStatement,
    FullStatement,
}

impl Selector for ReportType {
    const KIND: &'static str = "report_type";
    const ALL: &'static [Self] = &[
        Self::BalanceStatement,
        Self::IncomeStatement,
        Self::CashflowStatement,
        Self::FullStatement,
    ];
    const OPTIONS: &'static [&'static str] = &[
        "balance_statement",
        "income_statement",
        "cashflow_statement",
        "full_statement",
    ];

    fn key(&self) -> &'static str {
        match self {
            Self::BalanceStatement => "balance_statement",
            Self::IncomeStatement => "income_statement",
            Self::CashflowStatement => "cashflow_statement",
            Self::FullStatement => "full_statement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Period {
    #[default]
    Annual,
    Quarter,
}

impl Selector for Period {
    const KIND: &'static str = "period";
    const ALL: &'static [Self] = &[Self::Annual, Self::Quarter];
    const OPTIONS: &'static [&'static str] = &["annual", "quarter"];

    fn key(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    Forex,
    Stock,
    Commodities,
    Crypto,
}

impl Selector for AssetType {
    const KIND: &'static str = "asset_type";
    const ALL: &'static [Self] = &[Self::Forex, Self::Stock, Self::Crypto, Self::Commodities];
    const OPTIONS: &'static [&'static str] = &["forex", "stock", "crypto", "commodities"];

    fn key(&self) -> &'static str {
        match self {
            Self::Forex => "forex",
            Self::Stock => "stock",
            Self::Commodities => "commodities",
            Self::Crypto => "crypto",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketType {
    Stock,
    Forex,
    Crypto,
}

impl Selector for MarketType {
    const KIND: &'static str = "market_type";
    const ALL: &'static [Self] = &[Self::Stock, Self::Forex, Self::Crypto];
    const OPTIONS: &'static [&'static str] = &["stock", "forex", "crypto"];

    fn key(&self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Forex => "forex",
            Self::Crypto => "crypto",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    #[default]
    Candle,
    Line,
    Ohlc,
}

impl ChartKind {
    /// Numeric fields every observation in the plotted window must carry.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Candle | Self::Ohlc => &["open", "high", "low", "close", "volume"],
            Self::Line => &["close", "volume"],
        }
    }
}

impl Selector for ChartKind {
    const KIND: &'static str = "chart_type";
    const ALL: &'static [Self] = &[Self::Candle, Self::Line, Self::Ohlc];
    const OPTIONS: &'static [&'static str] = &["candle", "line", "ohlc"];

    fn key(&self) -> &'static str {
        match self {
            Self::Candle => "candle",
            Self::Line => "line",
            Self::Ohlc => "ohlc",
        }
    }
}

impl FromStr for InfoType {
    type Err = FmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector(s)
    }
}

impl FromStr for ReportType {
    type Err = FmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector(s)
    }
}

impl FromStr for Period {
    type Err = FmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector(s)
    }
}

impl FromStr for AssetType {
    type Err = FmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commodity" => Ok(Self::Commodities),
            _ => parse_selector(s),
        }
    }
}

impl FromStr for MarketType {
    type Err = FmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector(s)
    }
}

impl FromStr for ChartKind {
    type Err = FmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candlestick" => Ok(Self::Candle),
            _ => parse_selector(s),
        }
    }
}

macro_rules! display_key {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.key())
                }
            }
        )*
    };
}

display_key!(InfoType, ReportType, Period, AssetType, MarketType, ChartKind);
