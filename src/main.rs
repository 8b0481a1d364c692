// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use fmp_connector::viz;
use fmp_connector::{
    load_config, AssetType, ChartKind, Config, FMPClient, InfoType, MarketType, Period,
    ReportType, Table, DEFAULT_LIMIT,
};

#[derive(Parser)]
#[command(
    name = "fmp-connector",
    about = "Download Financial Modeling Prep data as CSV and price charts"
)]
struct Cli {
    /// TOML config file; FINANCIALMODELINGPREP_API_KEY still overrides its api_key
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe the API with the configured key
    Check,
    /// Company profile, rating, historical rating or analyst recommendations
    Info {
        symbol: String,
        #[arg(long, default_value = "company_profile")]
        info_type: InfoType,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Balance sheet, income, cash flow or full statements
    Financials {
        symbol: String,
        #[arg(long, default_value = "balance_statement")]
        report_type: ReportType,
        #[arg(long, default_value = "annual")]
        period: Period,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
        #[arg(long)]
        as_reported: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Every available instrument of one asset class
    Instruments {
        asset_type: AssetType,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Full daily price history of one instrument
    Prices {
        symbol: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Latest news, optionally for one instrument
    News {
        market_type: MarketType,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Historical social sentiment of one stock
    Sentiment {
        symbol: String,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Daily price chart (SVG) with a volume panel
    Chart {
        symbol: String,
        #[arg(long, default_value = "candle")]
        kind: ChartKind,
        /// First date shown, yyyy-mm-dd
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date shown, yyyy-mm-dd
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let mut config = load_config(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            dotenvy::dotenv().ok();
            config.apply_env();
            config
        }
        None => Config::from_env(),
    };
    let client = FMPClient::from_config(&config).context("Failed to create FMP client")?;

    match cli.command {
        Command::Check => {
            if !client.check_connection().await {
                anyhow::bail!("Could not reach {}", client.base_url());
            }
        }
        Command::Info {
            symbol,
            info_type,
            limit,
            output,
        } => {
            let table = client
                .get_company_info(&symbol, info_type, limit)
                .await
                .with_context(|| format!("Failed to fetch {} for {}", info_type, symbol))?;
            write_table(&table, output)?;
        }
        Command::Financials {
            symbol,
            report_type,
            period,
            limit,
            as_reported,
            output,
        } => {
            let table = client
                .get_financial_data(&symbol, report_type, period, limit, as_reported)
                .await
                .with_context(|| format!("Failed to fetch {} for {}", report_type, symbol))?;
            write_table(&table, output)?;
        }
        Command::Instruments { asset_type, output } => {
            let table = client
                .get_instruments(asset_type)
                .await
                .with_context(|| format!("Failed to list {} instruments", asset_type))?;
            write_table(&table, output)?;
        }
        Command::Prices { symbol, output } => {
            let series = client
                .get_daily_prices(&symbol)
                .await
                .with_context(|| format!("Failed to fetch daily prices for {}", symbol))?;
            write_table(&series.to_table(), output)?;
        }
        Command::News {
            market_type,
            symbol,
            limit,
            output,
        } => {
            let table = client
                .get_market_news(market_type, symbol.as_deref(), limit)
                .await
                .with_context(|| format!("Failed to fetch {} news", market_type))?;
            write_table(&table, output)?;
        }
        Command::Sentiment {
            symbol,
            limit,
            output,
        } => {
            let table = client
                .get_sentiment(&symbol, limit)
                .await
                .with_context(|| format!("Failed to fetch sentiment for {}", symbol))?;
            write_table(&table, output)?;
        }
        Command::Chart {
            symbol,
            kind,
            start,
            end,
            output,
        } => {
            let series = client
                .get_daily_prices(&symbol)
                .await
                .with_context(|| format!("Failed to fetch daily prices for {}", symbol))?;
            let frame = viz::prepare_chart(&series, start, end, kind)?;
            let path = output.unwrap_or_else(|| viz::chart_path(&config.output_dir, &frame));
            let rendered = viz::draw_chart(&series, start, end, kind, &path)?;
            println!("✅ Chart written to {}", rendered.path.display());
        }
    }

    Ok(())
}

fn write_table(table: &Table, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            table.write_csv(file)?;
            eprintln!("📁 {} rows written to {}", table.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            table.write_csv(&mut handle)?;
            handle.flush()?;
        }
    }
    Ok(())
}
