// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::FmpError;

pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com";
pub const API_KEY_VAR: &str = "FINANCIALMODELINGPREP_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Request timeout applied by the HTTP transport. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    /// Directory charts are written to.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl Config {
    /// Defaults overlaid with `.env` / process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlays `FINANCIALMODELINGPREP_API_KEY`, `FMP_BASE_URL` and
    /// `FMP_TIMEOUT_SECS` when they are set.
    pub fn apply_env(&mut self) {
        if let Ok(key) = env::var(API_KEY_VAR) {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(url) = env::var("FMP_BASE_URL") {
            self.base_url = url;
        }
        if let Some(secs) = env::var("FMP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.timeout_secs = Some(secs);
        }
    }

    pub fn api_key(&self) -> Result<&str, FmpError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(FmpError::MissingApiKey)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

pub fn load_config(path: &Path) -> Result<Config, FmpError> {
    let config_str = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
