// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

pub mod endpoints;
pub mod transport;

pub use endpoints::Endpoint;
pub use transport::{HttpTransport, Transport};

use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_BASE_URL};
use crate::error::FmpError;
use crate::models::{AssetType, InfoType, MarketType, Period, PriceSeries, ReportType, Table};

/// Number of records requested when the caller has no preference.
pub const DEFAULT_LIMIT: u32 = 10;

/// Symbol used by [`FMPClient::check_connection`].
const PROBE_SYMBOL: &str = "AAPL";

/// Client for the financialmodelingprep.com REST API.
///
/// Every operation builds one URL, performs one GET through the transport and
/// reshapes the JSON body. Nothing is cached and nothing is retried.
#[derive(Clone)]
pub struct FMPClient<T = HttpTransport> {
    transport: T,
    api_key: String,
    base_url: String,
}

impl FMPClient<HttpTransport> {
    pub fn new(api_key: String) -> Self {
        Self::with_transport(api_key, HttpTransport::new())
    }

    pub fn from_config(config: &Config) -> Result<Self, FmpError> {
        let transport = match config.timeout() {
            Some(timeout) => HttpTransport::with_timeout(timeout)?,
            None => HttpTransport::new(),
        };
        Ok(Self::with_transport(config.api_key()?.to_string(), transport)
            .with_base_url(&config.base_url))
    }
}

impl<T: Transport> FMPClient<T> {
    pub fn with_transport(api_key: String, transport: T) -> Self {
        Self {
            transport,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, endpoint: Endpoint<'_>) -> Result<String, FmpError> {
        let url = endpoint.url(&self.base_url, &self.api_key)?;
        debug!(path = %endpoint.path(), "requesting");
        self.transport.get(url.as_str()).await
    }

    async fn fetch_table(&self, endpoint: Endpoint<'_>) -> Result<Table, FmpError> {
        let body = self.fetch(endpoint).await?;
        Table::from_json(&body).map_err(report)
    }

    /// Best-effort connectivity probe against the profile endpoint. Only logs.
    pub async fn check_connection(&self) -> bool {
        let endpoint = Endpoint::CompanyInfo {
            symbol: PROBE_SYMBOL,
            info_type: InfoType::CompanyProfile,
            limit: DEFAULT_LIMIT,
        };
        match self.fetch(endpoint).await {
            Ok(_) => {
                info!("Connected");
                true
            }
            Err(FmpError::Status { status, body }) => {
                warn!(status, %body, "connection check failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "connection check failed");
                false
            }
        }
    }

    /// Profile and rating come back transposed (`field`, `info`); the
    /// historical kinds are one row per record, capped at `limit`.
    pub async fn get_company_info(
        &self,
        symbol: &str,
        info_type: InfoType,
        limit: u32,
    ) -> Result<Table, FmpError> {
        check_symbol(symbol)?;

        let table = self
            .fetch_table(Endpoint::CompanyInfo {
                symbol,
                info_type,
                limit,
            })
            .await?;

        if info_type.is_single_record() {
            Ok(table.transposed())
        } else {
            Ok(table)
        }
    }

    /// `as_reported` is ignored for [`ReportType::FullStatement`].
    pub async fn get_financial_data(
        &self,
        symbol: &str,
        report_type: ReportType,
        period: Period,
        limit: u32,
        as_reported: bool,
    ) -> Result<Table, FmpError> {
        check_symbol(symbol)?;

        self.fetch_table(Endpoint::FinancialStatement {
            symbol,
            report_type,
            period,
            limit,
            as_reported,
        })
        .await
    }

    pub async fn get_instruments(&self, asset_type: AssetType) -> Result<Table, FmpError> {
        self.fetch_table(Endpoint::Instruments { asset_type }).await
    }

    /// Full daily history of one instrument, oldest first.
    pub async fn get_daily_prices(&self, symbol: &str) -> Result<PriceSeries, FmpError> {
        check_symbol(symbol)?;

        let body = self.fetch(Endpoint::DailyPrices { symbol }).await?;
        PriceSeries::from_historical_json(symbol, &body).map_err(report)
    }

    /// General feed when `symbol` is `None`, otherwise filtered to it.
    pub async fn get_market_news(
        &self,
        market_type: MarketType,
        symbol: Option<&str>,
        limit: u32,
    ) -> Result<Table, FmpError> {
        if let Some(symbol) = symbol {
            check_symbol(symbol)?;
        }

        self.fetch_table(Endpoint::MarketNews {
            market_type,
            symbol,
            limit,
        })
        .await
    }

    pub async fn get_sentiment(&self, symbol: &str, limit: u32) -> Result<Table, FmpError> {
        check_symbol(symbol)?;

        self.fetch_table(Endpoint::SocialSentiment { symbol, limit })
            .await
    }
}

fn check_symbol(symbol: &str) -> Result<(), FmpError> {
    if symbol.trim().is_empty() {
        return Err(FmpError::EmptySymbol);
    }
    Ok(())
}

fn report(err: FmpError) -> FmpError {
    if let FmpError::UnparseableResponse { body, reason } = &err {
        warn!(%reason, raw = %body, "could not shape response into a table");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::transport::MockTransport;
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use serde_json::json;

    const BASE: &str = "https://financialmodelingprep.com";

    fn client_expecting(url: &'static str, body: &'static str) -> FMPClient<MockTransport> {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .withf(move |u| u.to_string() == url)
            .times(1)
            .returning(move |_| Ok(body.to_string()));
        FMPClient::with_transport("KEY".to_string(), transport)
    }

    fn client_without_calls() -> FMPClient<MockTransport> {
        let mut transport = MockTransport::new();
        transport.expect_get().never();
        FMPClient::with_transport("KEY".to_string(), transport)
    }

    #[tokio::test]
    async fn test_company_profile_is_transposed() {
        let client = client_expecting(
            "https://financialmodelingprep.com/api/v3/profile/AAPL?apikey=KEY",
            r#"[{"symbol":"AAPL","companyName":"Apple Inc.","mktCap":2.5e12}]"#,
        );

        let table = client
            .get_company_info("AAPL", InfoType::CompanyProfile, DEFAULT_LIMIT)
            .await
            .unwrap();

        assert_eq!(table.columns(), &["field", "info"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1, "field"), Some(&json!("companyName")));
        assert_eq!(table.get(1, "info"), Some(&json!("Apple Inc.")));
    }

    #[tokio::test]
    async fn test_historical_rating_keeps_rows() {
        let client = client_expecting(
            "https://financialmodelingprep.com/api/v3/historical-rating/MSFT?limit=2&apikey=KEY",
            r#"[{"date":"2023-01-04","rating":"S"},{"date":"2023-01-03","rating":"A+"}]"#,
        );

        let table = client
            .get_company_info("MSFT", InfoType::HistoricalRating, 2)
            .await
            .unwrap();

        assert_eq!(table.columns(), &["date", "rating"]);
        assert_eq!(table.get(1, "rating"), Some(&json!("A+")));
    }

    #[tokio::test]
    async fn test_as_reported_quarterly_income_statement() {
        let client = client_expecting(
            "https://financialmodelingprep.com/api/v3/income-statement-as-reported/AAPL?period=quarter&limit=5&apikey=KEY",
            r#"[{"date":"2023-07-01","revenuefromcontractwithcustomerexcludingassessedtax":81797000000}]"#,
        );

        let table = client
            .get_financial_data("AAPL", ReportType::IncomeStatement, Period::Quarter, 5, true)
            .await
            .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_full_statement_ignores_as_reported() {
        let client = client_expecting(
            "https://financialmodelingprep.com/api/v3/financial-statement-full-as-reported/AAPL?period=annual&limit=10&apikey=KEY",
            "[]",
        );

        let table = client
            .get_financial_data("AAPL", ReportType::FullStatement, Period::Annual, 10, false)
            .await
            .unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_instruments() {
        let client = client_expecting(
            "https://financialmodelingprep.com/api/v3/symbol/available-cryptocurrencies?apikey=KEY",
            r#"[{"symbol":"BTCUSD","name":"Bitcoin USD","currency":"USD"}]"#,
        );

        let table = client.get_instruments(AssetType::Crypto).await.unwrap();
        assert_eq!(table.get(0, "symbol"), Some(&json!("BTCUSD")));
    }

    #[tokio::test]
    async fn test_daily_prices() {
        let client = client_expecting(
            "https://financialmodelingprep.com/api/v3/historical-price-full/AAPL?apikey=KEY",
            r#"{"historical":[{"date":"2023-01-03","open":1,"high":2,"low":0.5,"close":1.5,"volume":100}]}"#,
        );

        let series = client.get_daily_prices("AAPL").await.unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.instrument(), "AAPL");
        let obs = &series.observations()[0];
        assert_eq!(obs.date, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
        assert_relative_eq!(obs.value("close").unwrap(), 1.5);
    }

    #[tokio::test]
    async fn test_market_news_general_and_filtered() {
        let general = client_expecting(
            "https://financialmodelingprep.com/api/v4/forex_news?limit=10&apikey=KEY",
            r#"[{"symbol":"EURUSD","title":"Euro climbs"}]"#,
        );
        let table = general
            .get_market_news(MarketType::Forex, None, DEFAULT_LIMIT)
            .await
            .unwrap();
        assert_eq!(table.len(), 1);

        let filtered = client_expecting(
            "https://financialmodelingprep.com/api/v3/stock_news?tickers=AAPL&limit=3&apikey=KEY",
            "[]",
        );
        let table = filtered
            .get_market_news(MarketType::Stock, Some("AAPL"), 3)
            .await
            .unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_sentiment() {
        let client = client_expecting(
            "https://financialmodelingprep.com/api/v4/historical/social-sentiment?symbol=TSLA&limit=10&apikey=KEY",
            r#"[{"date":"2023-01-03 10:00:00","symbol":"TSLA","stocktwitsSentiment":0.55}]"#,
        );

        let table = client.get_sentiment("TSLA", DEFAULT_LIMIT).await.unwrap();
        assert_eq!(table.get(0, "stocktwitsSentiment"), Some(&json!(0.55)));
    }

    #[tokio::test]
    async fn test_invalid_selectors_never_reach_the_network() {
        let client = client_without_calls();

        // Each operation's selector is parsed before a request can be built.
        let outcomes: Vec<Result<Table, FmpError>> = vec![
            match "ratios".parse::<InfoType>() {
                Ok(info_type) => client.get_company_info("AAPL", info_type, 10).await,
                Err(e) => Err(e),
            },
            match "equity_statement".parse::<ReportType>() {
                Ok(report_type) => {
                    client
                        .get_financial_data("AAPL", report_type, Period::Annual, 10, false)
                        .await
                }
                Err(e) => Err(e),
            },
            match "weekly".parse::<Period>() {
                Ok(period) => {
                    client
                        .get_financial_data("AAPL", ReportType::IncomeStatement, period, 10, false)
                        .await
                }
                Err(e) => Err(e),
            },
            match "bonds".parse::<AssetType>() {
                Ok(asset_type) => client.get_instruments(asset_type).await,
                Err(e) => Err(e),
            },
            match "futures".parse::<MarketType>() {
                Ok(market_type) => client.get_market_news(market_type, None, 10).await,
                Err(e) => Err(e),
            },
        ];

        for outcome in outcomes {
            let err = outcome.unwrap_err();
            assert!(matches!(err, FmpError::InvalidSelector { .. }));
            assert!(err.is_local());
        }
    }

    #[tokio::test]
    async fn test_empty_symbol_is_rejected_locally() {
        let client = client_without_calls();

        assert!(matches!(
            client.get_daily_prices("  ").await,
            Err(FmpError::EmptySymbol)
        ));
        assert!(matches!(
            client.get_sentiment("", 10).await,
            Err(FmpError::EmptySymbol)
        ));
        assert!(matches!(
            client.get_market_news(MarketType::Crypto, Some(""), 10).await,
            Err(FmpError::EmptySymbol)
        ));
    }

    #[tokio::test]
    async fn test_bad_base_url_never_reaches_the_network() {
        let client = client_without_calls().with_base_url("financialmodelingprep.com");

        assert!(matches!(
            client.get_daily_prices("AAPL").await,
            Err(FmpError::InvalidBaseUrl { .. })
        ));
        assert!(!client.check_connection().await);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_reported_with_raw_content() {
        let client = client_expecting(
            "https://financialmodelingprep.com/api/v3/stock/list?apikey=KEY",
            r#"{"Error Message":"Invalid API KEY. Please retry or visit our documentation."}"#,
        );

        let err = client.get_instruments(AssetType::Stock).await.unwrap_err();
        match err {
            FmpError::UnparseableResponse { body, .. } => assert!(body.contains("Invalid API KEY")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let mut transport = MockTransport::new();
        transport.expect_get().times(1).returning(|_| {
            Err(FmpError::Status {
                status: 429,
                body: "Limit Reach".to_string(),
            })
        });
        let client = FMPClient::with_transport("KEY".to_string(), transport);

        let err = client.get_sentiment("AAPL", 10).await.unwrap_err();
        assert!(matches!(err, FmpError::Status { status: 429, .. }));
        assert!(!err.is_local());
    }

    #[tokio::test]
    async fn test_identical_calls_give_identical_tables() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .times(2)
            .returning(|_| Ok(r#"[{"symbol":"AAPL","rating":"S","ratingScore":5}]"#.to_string()));
        let client = FMPClient::with_transport("KEY".to_string(), transport);

        let first = client
            .get_company_info("AAPL", InfoType::CompanyRating, DEFAULT_LIMIT)
            .await
            .unwrap();
        let second = client
            .get_company_info("AAPL", InfoType::CompanyRating, DEFAULT_LIMIT)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_check_connection_never_fails() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .withf(|u| u.to_string() == format!("{}/api/v3/profile/AAPL?apikey=KEY", BASE))
            .times(1)
            .returning(|_| {
                Err(FmpError::Status {
                    status: 401,
                    body: r#"{"Error Message":"Invalid API KEY."}"#.to_string(),
                })
            });
        let client = FMPClient::with_transport("KEY".to_string(), transport);
        assert!(!client.check_connection().await);

        let ok = client_expecting(
            "https://financialmodelingprep.com/api/v3/profile/AAPL?apikey=KEY",
            "[]",
        );
        assert!(ok.check_connection().await);
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            api_key: Some("demo".to_string()),
            base_url: "http://localhost:8080/".to_string(),
            ..Config::default()
        };
        let client = FMPClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");

        assert!(matches!(
            FMPClient::from_config(&Config::default()),
            Err(FmpError::MissingApiKey)
        ));
    }
}
