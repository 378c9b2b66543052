//! Core types and structures for domain-scout

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Final verdict for a domain lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Available,
    Registered,
    Error,
}

impl std::fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainStatus::Available => write!(f, "available"),
            DomainStatus::Registered => write!(f, "registered"),
            DomainStatus::Error => write!(f, "error"),
        }
    }
}

/// Which transport produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    RegistrarApi,
    Whois,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::RegistrarApi => write!(f, "registrar-api"),
            Provider::Whois => write!(f, "whois"),
        }
    }
}

/// Domain resolution result
///
/// `available` and `status` are kept consistent: `Some(true)` pairs with
/// [`DomainStatus::Available`], `Some(false)` with [`DomainStatus::Registered`],
/// and `None` with [`DomainStatus::Error`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub domain: String,
    pub available: Option<bool>,
    pub status: DomainStatus,
    pub response_time_ms: u64,
    pub from_cache: bool,
    pub checked_at: DateTime<Utc>,
    pub error: Option<String>,
    pub provider: Provider,
    /// Registration price, registrar-api provider only
    pub price: Option<f64>,
    pub currency: Option<String>,
    /// Registration period in years, registrar-api provider only
    pub period: Option<u32>,
}

impl ResolutionResult {
    /// Build a result from a classifier verdict, with consistent tri-state fields.
    pub fn from_status(
        domain: impl Into<String>,
        status: DomainStatus,
        provider: Provider,
        response_time_ms: u64,
    ) -> Self {
        let available = match status {
            DomainStatus::Available => Some(true),
            DomainStatus::Registered => Some(false),
            DomainStatus::Error => None,
        };
        Self {
            domain: domain.into(),
            available,
            status,
            response_time_ms,
            from_cache: false,
            checked_at: Utc::now(),
            error: None,
            provider,
            price: None,
            currency: None,
            period: None,
        }
    }

    /// Build an error-status result carrying the failure message.
    pub fn from_error(
        domain: impl Into<String>,
        message: impl Into<String>,
        provider: Provider,
        response_time_ms: u64,
    ) -> Self {
        let mut result = Self::from_status(domain, DomainStatus::Error, provider, response_time_ms);
        result.error = Some(message.into());
        result
    }

    /// Copy of this result marked as served from cache.
    pub fn as_cached(&self) -> Self {
        let mut copy = self.clone();
        copy.from_cache = true;
        copy
    }
}

/// Configuration for domain resolution
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// Cache entry time-to-live
    pub cache_ttl: Duration,
    /// Floor delay between consecutive scheduled WHOIS queries
    pub query_delay: Duration,
    /// Per-lookup timeout
    pub lookup_timeout: Duration,
    /// Extended timeout for TLDs known to respond slowly
    pub slow_tld_timeout: Duration,
    /// Automatic retries for transient WHOIS failures
    pub max_retries: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            query_delay: Duration::from_millis(1500),
            lookup_timeout: Duration::from_secs(10),
            slow_tld_timeout: Duration::from_secs(20),
            max_retries: 2,
        }
    }
}

/// Progress report handed to the batch caller after each resolution
#[derive(Debug, Clone)]
pub struct BatchProgress<'a> {
    /// 1-based index of the domain just completed
    pub current: usize,
    pub total: usize,
    pub domain: &'a str,
    pub result: &'a ResolutionResult,
}

/// Verdict counts for a completed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub available: usize,
    pub registered: usize,
    pub errors: usize,
}

/// Count verdicts across a batch of results.
pub fn summarize(results: &[ResolutionResult]) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for result in results {
        match result.status {
            DomainStatus::Available => summary.available += 1,
            DomainStatus::Registered => summary.registered += 1,
            DomainStatus::Error => summary.errors += 1,
        }
    }
    summary
}
