use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client as HttpClient;
use tracing::{debug, info, warn};

use super::models::{ErrorResponse, RateError, TableC};
use crate::api::RateProvider;
use crate::models::{CurrencyCode, RateTable};

/// Client for the NBP (Narodowy Bank Polski) exchange rate API
pub struct NbpClient {
    http_client: HttpClient,
    base_url: String,
}

impl NbpClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.nbp.pl/api";

    /// Create a client against `base_url`; every request is bounded by `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RateError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .default_headers(Self::create_headers())
            .build()
            .map_err(|e| RateError::RequestError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Map a non-success status to a [`RateError`]
    async fn handle_error_response(status: reqwest::StatusCode, response: reqwest::Response) -> RateError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body_text)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or(body_text);

        match status_code {
            404 => RateError::NotFound(message),
            500..=599 => {
                warn!("NBP server error {}: {}", status_code, message);
                RateError::ServerError(status_code, message)
            }
            _ => RateError::HttpError(status_code, message),
        }
    }

    /// GET /exchangerates/tables/c/
    ///
    /// Fetches today's Table C (bid/ask) and keeps the ask side.
    pub async fn fetch_table_c(&self) -> Result<RateTable, RateError> {
        let url = format!("{}/exchangerates/tables/c/?format=json", self.base_url);
        debug!("Fetching rate table from {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| RateError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| RateError::RequestError(format!("Failed to read response: {}", e)))?;

        let table = parse_table_c(&body)?;
        info!(
            "Fetched {} ask rates from NBP table {} ({})",
            table.len(),
            table.table_no.as_deref().unwrap_or("?"),
            table
                .effective_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "no date".to_string())
        );

        Ok(table)
    }
}

#[async_trait]
impl RateProvider for NbpClient {
    async fn fetch_bulk_rates(&self) -> Result<RateTable, RateError> {
        self.fetch_table_c().await
    }
}

/// Turn a Table C response body into a [`RateTable`] of ask rates.
///
/// Entries with a malformed code or a non-positive ask are dropped.
pub fn parse_table_c(body: &str) -> Result<RateTable, RateError> {
    let tables: Vec<TableC> = serde_json::from_str(body)
        .map_err(|e| RateError::DeserializationError(format!("Failed to parse response: {}", e)))?;

    let table = tables.into_iter().next().ok_or(RateError::EmptyTable)?;

    let mut rates = HashMap::with_capacity(table.rates.len());
    for rate in &table.rates {
        match CurrencyCode::parse(&rate.code) {
            Ok(code) if rate.ask.is_sign_positive() && !rate.ask.is_zero() => {
                rates.insert(code, rate.ask);
            }
            _ => debug!("Skipping unusable rate entry {} ({})", rate.code, rate.currency),
        }
    }

    if rates.is_empty() {
        return Err(RateError::EmptyTable);
    }

    Ok(RateTable {
        rates,
        table_no: Some(table.no),
        effective_date: Some(table.effective_date),
        fetched_at: Utc::now(),
    })
}
