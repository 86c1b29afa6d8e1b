//! Synthetic weekly source for offline runs and demos.
//!
//! Produces a random walk per ticker, seeded from the BLAKE3 hash of the
//! ticker, so the same ticker always yields the same history. Results built on
//! this source are tagged [`DataSource::Synthetic`].

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataSource, FetchResult, WeeklySeriesSource};
use crate::domain::WeeklyBar;

#[derive(Debug, Clone)]
pub struct SyntheticWeeklySource {
    weeks: usize,
    end: NaiveDate,
}

impl SyntheticWeeklySource {
    /// `weeks` bars ending on the Monday of the week containing `end`.
    pub fn new(weeks: usize, end: NaiveDate) -> Self {
        Self { weeks, end }
    }

    /// Ten years of weekly bars ending this week.
    pub fn ten_years() -> Self {
        Self::new(520, chrono::Local::now().date_naive())
    }

    pub fn generate(&self, ticker: &str) -> Vec<WeeklyBar> {
        let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let last_monday =
            self.end - Duration::days(self.end.weekday().num_days_from_monday() as i64);
        let first = last_monday - Duration::weeks(self.weeks.saturating_sub(1) as i64);

        let mut price = rng.gen_range(50.0..500.0_f64);
        let drift = rng.gen_range(-0.002..0.004_f64);
        let mut bars = Vec::with_capacity(self.weeks);

        for week in 0..self.weeks {
            let weekly_return: f64 = drift + rng.gen_range(-0.05..0.05);
            let open = price;
            let close = (price * (1.0 + weekly_return)).max(0.01);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.02));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.02));

            bars.push(WeeklyBar {
                date: first + Duration::weeks(week as i64),
                open,
                high,
                low,
                close,
                volume: rng.gen_range(1_000_000..20_000_000u64),
            });

            price = close;
        }

        bars
    }
}

impl WeeklySeriesSource for SyntheticWeeklySource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_weekly(&self, ticker: &str) -> Result<FetchResult, DataError> {
        Ok(FetchResult {
            ticker: ticker.to_string(),
            bars: self.generate(ticker),
            source: DataSource::Synthetic,
        })
    }
}
