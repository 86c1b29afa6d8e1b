//! Domain types for SwingScan

pub mod bar;
pub mod series;

pub use bar::WeeklyBar;
pub use series::PriceSeries;

/// Ticker symbol as the data source knows it (e.g. `RELIANCE.NS`).
pub type Ticker = String;
