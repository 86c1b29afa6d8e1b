//! Weekly price sources and universe definition

pub mod circuit_breaker;
pub mod provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use provider::{DataError, DataSource, FetchResult, WeeklySeriesSource};
pub use synthetic::SyntheticWeeklySource;
pub use universe::{Universe, UniverseError};
pub use yahoo::YahooWeeklySource;
