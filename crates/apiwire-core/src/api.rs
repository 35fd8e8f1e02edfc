//! Typed calls to the health-plan operator analytics backend.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;

const STATUS_PATH: &str = "/";
const OPERATOR_SEARCH_PATH: &str = "/api/operadoras/busca";
const EXPENSES_LAST_QUARTER_PATH: &str = "/api/despesas/ultimo-trimestre";
const EXPENSES_LAST_YEAR_PATH: &str = "/api/despesas/ultimo-ano";
const MONTHLY_TREND_PATH: &str = "/api/despesas/tendencia-mensal";

/// Result count the backend uses when `limite` is omitted.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
/// Values the backend accepts for `limite`.
pub const SEARCH_LIMIT_RANGE: RangeInclusive<u32> = 1..=100;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiStatus {
    pub message: String,
}

/// One row of an operator name search.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OperatorMatch {
    #[serde(rename = "operadora")]
    pub operator: String,
    #[serde(rename = "total_eventos")]
    pub total_events: i64,
    #[serde(rename = "total_despesas")]
    pub total_expenses: f64,
    #[serde(rename = "relevancia")]
    pub relevance: f64,
    #[serde(rename = "percentual_total")]
    pub share_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QuarterExpense {
    #[serde(rename = "operadora")]
    pub operator: String,
    #[serde(rename = "total_despesas")]
    pub total_expenses: f64,
    #[serde(rename = "quantidade_eventos")]
    pub event_count: i64,
    #[serde(rename = "percentual_total")]
    pub share_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct YearExpense {
    #[serde(rename = "operadora")]
    pub operator: String,
    #[serde(rename = "total_despesas")]
    pub total_expenses: f64,
    #[serde(rename = "quantidade_eventos")]
    pub event_count: i64,
    #[serde(rename = "media_por_evento")]
    pub average_per_event: f64,
    #[serde(rename = "percentual_total")]
    pub share_percent: f64,
}

/// Expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MonthlyTrend {
    #[serde(rename = "mes")]
    pub month: NaiveDate,
    #[serde(rename = "total_eventos")]
    pub total_events: i64,
    #[serde(rename = "total_despesas")]
    pub total_expenses: f64,
    #[serde(rename = "media_por_evento")]
    pub average_per_event: f64,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiError` on network, status, or JSON decoding errors.
    pub async fn api_status(&self) -> Result<ApiStatus, ApiError> {
        self.get_json(STATUS_PATH).await
    }

    /// Search operators whose trade or legal name contains `term`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::LimitOutOfRange`] without sending anything when
    /// `limit` is outside [`SEARCH_LIMIT_RANGE`], otherwise any request error.
    pub async fn search_operators(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<OperatorMatch>, ApiError> {
        if !SEARCH_LIMIT_RANGE.contains(&limit) {
            return Err(ApiError::LimitOutOfRange { limit });
        }

        let mut url = self.resolve(OPERATOR_SEARCH_PATH)?;
        url.query_pairs_mut()
            .append_pair("termo", term)
            .append_pair("limite", &limit.to_string());
        tracing::debug!(%url, "searching operators");

        let resp = self.send(self.inner().get(url)).await?;
        Ok(resp.json().await?)
    }

    /// Top operators by medical-hospital expenses over the last three months.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network, status, or JSON decoding errors.
    pub async fn expenses_last_quarter(&self) -> Result<Vec<QuarterExpense>, ApiError> {
        self.get_json(EXPENSES_LAST_QUARTER_PATH).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` on network, status, or JSON decoding errors.
    pub async fn expenses_last_year(&self) -> Result<Vec<YearExpense>, ApiError> {
        self.get_json(EXPENSES_LAST_YEAR_PATH).await
    }

    /// Monthly expense totals for the last year, newest month first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network, status, or JSON decoding errors.
    pub async fn monthly_trend(&self) -> Result<Vec<MonthlyTrend>, ApiError> {
        self.get_json(MONTHLY_TREND_PATH).await
    }
}
