//! Yahoo Finance weekly source.
//!
//! Fetches the full weekly history from Yahoo's v8 chart API
//! (`range=max&interval=1wk`). Prices are auto-adjusted: when the response
//! carries `adjclose`, open/high/low are scaled by `adjclose / close` and the
//! adjusted close replaces the raw close.
//!
//! Yahoo has no official API and changes format without notice; every parse
//! failure surfaces as [`DataError::ResponseFormatChanged`].

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataSource, FetchResult, WeeklySeriesSource};
use crate::domain::WeeklyBar;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance weekly bar source.
pub struct YahooWeeklySource {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
    max_retry_wait: Duration,
}

impl YahooWeeklySource {
    /// Build a source with the given per-request timeout.
    pub fn new(circuit_breaker: Arc<CircuitBreaker>, timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            circuit_breaker,
            base_url: BASE_URL.to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_retry_wait: Duration::from_secs(60),
        })
    }

    /// Override retry count, backoff base and the cap on a server's `Retry-After`.
    pub fn with_retry_policy(
        mut self,
        max_retries: u32,
        base_delay: Duration,
        max_retry_wait: Duration,
    ) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self.max_retry_wait = max_retry_wait;
        self
    }

    /// Point the source at a different host (used against local mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!(
            "{}/{ticker}?range=max&interval=1wk&includeAdjustedClose=true",
            self.base_url
        )
    }

    /// Parse the chart API response into weekly bars.
    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<Vec<WeeklyBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        ticker: ticker.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // A listed ticker with no trading history comes back without timestamps.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();
            let adj_close = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());

            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            let ratio = match (close, adj_close) {
                (Some(c), Some(a)) if c != 0.0 => a / c,
                _ => 1.0,
            };

            bars.push(WeeklyBar {
                date,
                open: open.map_or(f64::NAN, |v| v * ratio),
                high: high.map_or(f64::NAN, |v| v * ratio),
                low: low.map_or(f64::NAN, |v| v * ratio),
                close: adj_close.or(close).unwrap_or(f64::NAN),
                volume: volume.unwrap_or(0),
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    /// Execute the request with retry and circuit breaker logic.
    ///
    /// Every 429, 5xx, connect/timeout error and malformed body counts as a
    /// breaker failure. A 403 trips the breaker at once.
    fn fetch_with_retry(&self, ticker: &str) -> Result<Vec<WeeklyBar>, DataError> {
        let url = self.chart_url(ticker);
        let mut last_error = None;
        let mut server_wait = Duration::ZERO;

        for attempt in 0..=self.max_retries {
            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            if attempt > 0 {
                let backoff = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(backoff.max(server_wait));
                server_wait = Duration::ZERO;
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::FORBIDDEN {
                        self.circuit_breaker.trip();
                        return Err(DataError::CircuitBreakerTripped);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        self.circuit_breaker.record_failure();
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.trim().parse::<u64>().ok())
                            .unwrap_or(60);
                        server_wait = Duration::from_secs(retry_after).min(self.max_retry_wait);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(DataError::AuthenticationRequired(
                            "Yahoo Finance requires authentication".into(),
                        ));
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::SymbolNotFound {
                            ticker: ticker.to_string(),
                        });
                    }

                    if !status.is_success() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(DataError::Other(format!("HTTP {status} for {ticker}")));
                        continue;
                    }

                    let parsed = resp
                        .json::<ChartResponse>()
                        .map_err(|e| {
                            DataError::ResponseFormatChanged(format!(
                                "failed to parse response for {ticker}: {e}"
                            ))
                        })
                        .and_then(|chart| Self::parse_response(ticker, chart));

                    return match parsed {
                        Ok(bars) => {
                            self.circuit_breaker.record_success();
                            Ok(bars)
                        }
                        Err(e @ DataError::ResponseFormatChanged(_)) => {
                            self.circuit_breaker.record_failure();
                            Err(e)
                        }
                        Err(e) => Err(e),
                    };
                }
                Err(e) => {
                    self.circuit_breaker.record_failure();
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl WeeklySeriesSource for YahooWeeklySource {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_weekly(&self, ticker: &str) -> Result<FetchResult, DataError> {
        let bars = self.fetch_with_retry(ticker)?;
        Ok(FetchResult {
            ticker: ticker.to_string(),
            bars,
            source: DataSource::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
