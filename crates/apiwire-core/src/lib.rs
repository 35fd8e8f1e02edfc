//! Shared HTTP client for a backend API: configuration loading and the
//! pre-configured client handle.

pub mod api;
pub mod config;
pub mod error;
pub mod http;

pub use api::{
    ApiStatus, DEFAULT_SEARCH_LIMIT, MonthlyTrend, OperatorMatch, QuarterExpense, SEARCH_LIMIT_RANGE,
    YearExpense,
};
pub use config::{ClientConfig, Config};
pub use error::{ApiError, ConfigError};
pub use http::{ApiClient, RequestOptions};
