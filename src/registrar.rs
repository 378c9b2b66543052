//! Structured registrar availability API
//!
//! Unlike WHOIS, this provider returns machine-parseable data and enforces
//! its own per-request rate limits, so it is called directly instead of
//! going through the serial scheduler, and its responses never touch the
//! classifier.

use crate::error::{DomainScoutError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Structured availability answer from the registrar
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuote {
    pub available: bool,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Registration period in years
    #[serde(default)]
    pub period: Option<u32>,
}

/// Provider seam for structured availability checks
#[async_trait]
pub trait RegistrarApi: Send + Sync {
    /// Check a domain's availability, returning price data when offered.
    async fn check_availability(&self, domain: &str) -> Result<AvailabilityQuote>;
}

/// Credentials and endpoint for the registrar HTTP API
#[derive(Debug, Clone)]
pub struct RegistrarConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub timeout: Duration,
}

impl RegistrarConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// reqwest-backed registrar API client
pub struct HttpRegistrarApi {
    config: RegistrarConfig,
    client: Client,
}

impl HttpRegistrarApi {
    pub fn new(config: RegistrarConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("domain-scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to create configured HTTP client: {}. Using default.", e);
                Client::new()
            });

        Self { config, client }
    }

    fn availability_url(&self, domain: &str) -> String {
        format!(
            "{}/v1/domains/available?domain={}",
            self.config.base_url.trim_end_matches('/'),
            domain
        )
    }
}

#[async_trait]
impl RegistrarApi for HttpRegistrarApi {
    async fn check_availability(&self, domain: &str) -> Result<AvailabilityQuote> {
        let url = self.availability_url(domain);

        let response = self
            .client
            .get(&url)
            .header(
                "Authorization",
                format!("sso-key {}:{}", self.config.api_key, self.config.api_secret),
            )
            .send()
            .await
            .map_err(DomainScoutError::from)?;

        let status = response.status();
        match status.as_u16() {
            400 => {
                return Err(DomainScoutError::config(format!(
                    "registrar API rejected the request for '{domain}' (malformed request or credentials)"
                )))
            }
            401 => {
                return Err(DomainScoutError::authentication(
                    "registrar API credentials were not accepted",
                ))
            }
            422 => {
                return Err(DomainScoutError::validation(format!(
                    "registrar API considers '{domain}' an invalid domain"
                )))
            }
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok());
                return Err(DomainScoutError::rate_limit(
                    "registrar API rate limit exceeded",
                    retry_after,
                ));
            }
            _ => {}
        }

        if !status.is_success() {
            return Err(DomainScoutError::network(
                format!("registrar API request failed with status {status}"),
                Some(status.as_u16()),
                Some(url),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| DomainScoutError::network(e.to_string(), None, Some(url)))?;

        let quote: AvailabilityQuote = serde_json::from_str(&text)
            .map_err(|e| DomainScoutError::parse(e.to_string(), Some(text)))?;

        Ok(quote)
    }
}
