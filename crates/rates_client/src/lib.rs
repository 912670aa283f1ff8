//! HTTP client for the monthly exchange-rate provider.
//!
//! The provider serves one JSON array per (country, year) at
//! `{base_url}/countries/{country}/years/{year}`.

use async_trait::async_trait;
use models::{Country, MonthlyRateRecord, RateSeries, Year};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use thiserror::Error;

/// The only failure kind of a fetch. No retry is attempted.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} returned non-success status {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed response body from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of rate series. Implemented over HTTP here, in memory in tests.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch(&self, country: Country, year: Year) -> Result<RateSeries, RetrievalError>;
}

#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    http: Client,
    base_url: String,
}

impl HttpRateProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RetrievalError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(RetrievalError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn series_url(&self, country: Country, year: Year) -> String {
        format!(
            "{}/countries/{}/years/{}",
            self.base_url,
            country.as_str(),
            year
        )
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn fetch(&self, country: Country, year: Year) -> Result<RateSeries, RetrievalError> {
        let url = self.series_url(country, year);
        tracing::info!(%url, "fetching monthly rates");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| RetrievalError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| RetrievalError::Transport {
                url: url.clone(),
                source,
            })?;

        let series = parse_series(&body).map_err(|source| RetrievalError::Malformed {
            url: url.clone(),
            source,
        })?;
        tracing::debug!(%url, months = series.len(), "parsed monthly rates");
        Ok(series)
    }
}

/// Parses a provider body, keeping the row order as received.
pub fn parse_series(body: &str) -> Result<RateSeries, serde_json::Error> {
    let records: Vec<MonthlyRateRecord> = serde_json::from_str(body)?;
    Ok(records.into())
}
