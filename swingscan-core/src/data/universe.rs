//! Universe configuration — the ordered ticker list a scan walks.
//!
//! Stored as TOML (`name` plus `tickers`). Ticker order is significant: the
//! batch runner reports opportunities in this order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize universe: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Named, ordered list of tickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub name: String,
    pub tickers: Vec<String>,
}

impl Universe {
    pub fn new(name: impl Into<String>, tickers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tickers,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, UniverseError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Tickers with blanks removed and duplicates dropped, first occurrence kept.
    pub fn normalized_tickers(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tickers
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.to_string()))
            .map(String::from)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// NIFTY 50 constituents as listed on Yahoo Finance (`.NS` suffix).
    pub fn nifty50() -> Self {
        let tickers = [
            "RELIANCE.NS",
            "TCS.NS",
            "HDFCBANK.NS",
            "ICICIBANK.NS",
            "INFY.NS",
            "HINDUNILVR.NS",
            "KOTAKBANK.NS",
            "SBIN.NS",
            "ASIANPAINT.NS",
            "AXISBANK.NS",
            "LT.NS",
            "MARUTI.NS",
            "BAJFINANCE.NS",
            "WIPRO.NS",
            "ONGC.NS",
            "TITAN.NS",
            "ULTRACEMCO.NS",
            "SUNPHARMA.NS",
            "NESTLEIND.NS",
            "TECHM.NS",
            "BHARTIARTL.NS",
            "TATASTEEL.NS",
            "POWERGRID.NS",
            "NTPC.NS",
            "INDUSINDBK.NS",
            "BAJAJ-AUTO.NS",
            "M&M.NS",
            "BRITANNIA.NS",
            "HCLTECH.NS",
            "DRREDDY.NS",
            "EICHERMOT.NS",
            "ADANIPORTS.NS",
            "JSWSTEEL.NS",
            "CIPLA.NS",
            "GRASIM.NS",
            "BAJAJFINSV.NS",
            "HEROMOTOCO.NS",
            "COALINDIA.NS",
            "DIVISLAB.NS",
            "ITC.NS",
            "SBILIFE.NS",
            "UPL.NS",
            "BPCL.NS",
            "HINDALCO.NS",
            "TATAMOTORS.NS",
            "APOLLOHOSP.NS",
            "ADANIENT.NS",
            "TATACONSUM.NS",
        ];
        Self::new("NIFTY 50", tickers.into_iter().map(String::from).collect())
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::nifty50()
    }
}
