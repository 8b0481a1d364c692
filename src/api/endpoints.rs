// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use reqwest::Url;

use crate::error::FmpError;
use crate::models::{AssetType, InfoType, MarketType, Period, ReportType};

/// A fully-resolved FMP request: which template, which substitutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    CompanyInfo {
        symbol: &'a str,
        info_type: InfoType,
        limit: u32,
    },
    FinancialStatement {
        symbol: &'a str,
        report_type: ReportType,
        period: Period,
        limit: u32,
        as_reported: bool,
    },
    Instruments {
        asset_type: AssetType,
    },
    DailyPrices {
        symbol: &'a str,
    },
    MarketNews {
        market_type: MarketType,
        symbol: Option<&'a str>,
        limit: u32,
    },
    SocialSentiment {
        symbol: &'a str,
        limit: u32,
    },
}

impl<'a> Endpoint<'a> {
    /// Fixed part of the path and the symbol segment appended to it, if any.
    fn route(&self) -> (&'static str, Option<&'a str>) {
        match *self {
            Endpoint::CompanyInfo { symbol, info_type, .. } => {
                let prefix = match info_type {
                    InfoType::CompanyProfile => "/api/v3/profile",
                    InfoType::CompanyRating => "/api/v3/rating",
                    InfoType::HistoricalRating => "/api/v3/historical-rating",
                    InfoType::Recommendations => "/api/v3/analyst-stock-recommendations",
                };
                (prefix, Some(symbol))
            }
            Endpoint::FinancialStatement {
                symbol,
                report_type,
                as_reported,
                ..
            } => {
                let prefix = match (report_type, as_reported) {
                    (ReportType::BalanceStatement, false) => "/api/v3/balance-sheet-statement",
                    (ReportType::BalanceStatement, true) => {
                        "/api/v3/balance-sheet-statement-as-reported"
                    }
                    (ReportType::IncomeStatement, false) => "/api/v3/income-statement",
                    (ReportType::IncomeStatement, true) => "/api/v3/income-statement-as-reported",
                    (ReportType::CashflowStatement, false) => "/api/v3/cash-flow-statement",
                    (ReportType::CashflowStatement, true) => {
                        "/api/v3/cash-flow-statement-as-reported"
                    }
                    // Only published in the as-reported form
                    (ReportType::FullStatement, _) => "/api/v3/financial-statement-full-as-reported",
                };
                (prefix, Some(symbol))
            }
            Endpoint::Instruments { asset_type } => {
                let prefix = match asset_type {
                    AssetType::Forex => "/api/v3/symbol/available-forex-currency-pairs",
                    AssetType::Stock => "/api/v3/stock/list",
                    AssetType::Commodities => "/api/v3/symbol/available-commodities",
                    AssetType::Crypto => "/api/v3/symbol/available-cryptocurrencies",
                };
                (prefix, None)
            }
            Endpoint::DailyPrices { symbol } => ("/api/v3/historical-price-full", Some(symbol)),
            Endpoint::MarketNews { market_type, .. } => {
                let prefix = match market_type {
                    MarketType::Stock => "/api/v3/stock_news",
                    MarketType::Forex => "/api/v4/forex_news",
                    MarketType::Crypto => "/api/v4/crypto_news",
                };
                (prefix, None)
            }
            Endpoint::SocialSentiment { .. } => ("/api/v4/historical/social-sentiment", None),
        }
    }

    /// Unencoded path, for logs.
    pub fn path(&self) -> String {
        match self.route() {
            (prefix, Some(symbol)) => format!("{}/{}", prefix, symbol),
            (prefix, None) => prefix.to_string(),
        }
    }

    /// Query parameters in wire order, without the api key (always last).
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match *self {
            Endpoint::CompanyInfo {
                info_type, limit, ..
            } => {
                if info_type.is_single_record() {
                    Vec::new()
                } else {
                    vec![("limit", limit.to_string())]
                }
            }
            Endpoint::FinancialStatement { period, limit, .. } => vec![
                ("period", period.to_string()),
                ("limit", limit.to_string()),
            ],
            Endpoint::Instruments { .. } | Endpoint::DailyPrices { .. } => Vec::new(),
            Endpoint::MarketNews {
                market_type,
                symbol,
                limit,
            } => {
                let mut query = Vec::with_capacity(2);
                if let Some(symbol) = symbol {
                    let filter = match market_type {
                        MarketType::Stock => "tickers",
                        MarketType::Forex | MarketType::Crypto => "symbol",
                    };
                    query.push((filter, symbol.to_string()));
                }
                query.push(("limit", limit.to_string()));
                query
            }
            Endpoint::SocialSentiment { symbol, limit } => vec![
                ("symbol", symbol.to_string()),
                ("limit", limit.to_string()),
            ],
        }
    }

    /// Full request url. The symbol and every query value are percent-encoded.
    pub fn url(&self, base_url: &str, api_key: &str) -> Result<Url, FmpError> {
        let invalid = |reason: String| FmpError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;

        let (prefix, symbol) = self.route();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| invalid("cannot be a base".to_string()))?;
            segments
                .pop_if_empty()
                .extend(prefix.split('/').filter(|s| !s.is_empty()));
            if let Some(symbol) = symbol {
                segments.push(symbol);
            }
        }

        url.query_pairs_mut()
            .extend_pairs(self.query())
            .append_pair("apikey", api_key);
        Ok(url)
    }
}
