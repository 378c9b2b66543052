//! Domain resolution orchestration
//!
//! Pipeline per domain: normalize → cache lookup → scheduler-gated WHOIS
//! query + classification (or direct registrar API call) → cache write.
//! Every failure is captured into an error-status result; nothing escapes to
//! the batch caller, so one bad domain never aborts a batch.

use crate::cache::ResultCache;
use crate::classify;
use crate::domain::{normalize, tld_of};
use crate::registrar::RegistrarApi;
use crate::scheduler::SerialScheduler;
use crate::types::{BatchProgress, DomainStatus, Provider, ResolutionResult, ResolveConfig};
use crate::whois::{LookupOptions, WhoisTransport};
use std::sync::Arc;
use std::time::Instant;

/// The transport a resolver drives
pub enum ProviderBackend {
    /// Text-protocol lookups, serialized through the scheduler and classified
    Whois(Arc<dyn WhoisTransport>),
    /// Structured API, rate-limited by its own transport, never classified
    RegistrarApi(Arc<dyn RegistrarApi>),
}

/// Domain resolution service
///
/// Cache and scheduler are injected and shared: the scheduler's whole purpose
/// is to serialize all outbound WHOIS traffic process-wide, not just traffic
/// within one batch. Lifecycle belongs to the process entry point.
pub struct DomainResolver {
    cache: Arc<ResultCache>,
    scheduler: Arc<SerialScheduler<String>>,
    backend: ProviderBackend,
    config: ResolveConfig,
}

impl DomainResolver {
    pub fn new(
        cache: Arc<ResultCache>,
        scheduler: Arc<SerialScheduler<String>>,
        backend: ProviderBackend,
        config: ResolveConfig,
    ) -> Self {
        scheduler.set_delay(config.query_delay);
        Self {
            cache,
            scheduler,
            backend,
            config,
        }
    }

    /// Which provider this resolver reports in its results.
    pub fn provider(&self) -> Provider {
        match self.backend {
            ProviderBackend::Whois(_) => Provider::Whois,
            ProviderBackend::RegistrarApi(_) => Provider::RegistrarApi,
        }
    }

    /// Resolve a single domain. Never fails: transport, classification and
    /// validation errors all land in the result's `error`/`status` fields.
    pub async fn resolve(&self, input: &str) -> ResolutionResult {
        let started = Instant::now();
        let provider = self.provider();

        // reject malformed input before it consumes a scheduler slot or quota
        let domain = match normalize(input) {
            Ok(domain) => domain,
            Err(e) => {
                tracing::debug!(input = %input, error = %e, "Rejected malformed domain");
                return ResolutionResult::from_error(
                    input.trim().to_lowercase(),
                    e.to_string(),
                    provider,
                    elapsed_ms(started),
                );
            }
        };

        if let Some(hit) = self.cache.get(&domain) {
            tracing::debug!(domain = %domain, "Cache hit");
            return hit.as_cached();
        }

        let outcome = match &self.backend {
            ProviderBackend::Whois(transport) => {
                self.resolve_whois(&domain, Arc::clone(transport)).await
            }
            ProviderBackend::RegistrarApi(api) => self.resolve_registrar(&domain, api).await,
        };

        match outcome {
            Ok(mut result) => {
                result.response_time_ms = elapsed_ms(started);
                tracing::debug!(
                    domain = %domain,
                    provider = %provider,
                    status = %result.status,
                    duration_ms = %result.response_time_ms,
                    "Domain check completed"
                );
                // errors are never cached: a retried lookup should try again
                self.cache.set(&domain, result.clone());
                result
            }
            Err(e) => {
                let elapsed = elapsed_ms(started);
                tracing::warn!(
                    domain = %domain,
                    provider = %provider,
                    error = %e,
                    duration_ms = %elapsed,
                    "Domain check failed"
                );
                ResolutionResult::from_error(domain, e.to_string(), provider, elapsed)
            }
        }
    }

    /// Resolve a list of domains strictly sequentially, reporting progress
    /// after each completion. Input order is output, cache and callback order.
    pub async fn resolve_batch<F>(&self, domains: &[String], mut on_progress: F) -> Vec<ResolutionResult>
    where
        F: FnMut(BatchProgress<'_>),
    {
        let total = domains.len();
        let mut results = Vec::with_capacity(total);

        for (index, domain) in domains.iter().enumerate() {
            let result = self.resolve(domain).await;
            on_progress(BatchProgress {
                current: index + 1,
                total,
                domain,
                result: &result,
            });
            results.push(result);
        }

        let summary = crate::types::summarize(&results);
        tracing::info!(
            total = %total,
            available = %summary.available,
            registered = %summary.registered,
            errors = %summary.errors,
            "Batch resolution completed"
        );

        results
    }

    async fn resolve_whois(
        &self,
        domain: &str,
        transport: Arc<dyn WhoisTransport>,
    ) -> crate::error::Result<ResolutionResult> {
        let tld = tld_of(domain).to_lowercase();
        let options = LookupOptions {
            timeout: if classify::is_slow_tld(&tld) {
                self.config.slow_tld_timeout
            } else {
                self.config.lookup_timeout
            },
            ..LookupOptions::default()
        };

        let mut attempt = 0;
        loop {
            let task_transport = Arc::clone(&transport);
            let task_domain = domain.to_string();
            let task_options = options.clone();
            let lookup = self
                .scheduler
                .submit(async move { task_transport.lookup(&task_domain, &task_options).await });

            let status = match lookup.await {
                Ok(raw) => classify::classify_response(&raw),
                Err(e) => match classify::classify_failure(domain, &tld, &e.to_string()) {
                    Ok(status) => status,
                    // manual-check is terminal, never retried
                    Err(classified @ crate::error::DomainScoutError::ManualCheck { .. }) => {
                        return Err(classified)
                    }
                    Err(classified) => {
                        // each retry is a fresh scheduled task, never a tight loop
                        if e.is_transient() && attempt < self.config.max_retries {
                            attempt += 1;
                            tracing::debug!(
                                domain = %domain,
                                attempt = %attempt,
                                error = %e,
                                "Retrying transient WHOIS failure"
                            );
                            continue;
                        }
                        return Err(classified);
                    }
                },
            };

            return Ok(ResolutionResult::from_status(
                domain,
                status,
                Provider::Whois,
                0,
            ));
        }
    }

    async fn resolve_registrar(
        &self,
        domain: &str,
        api: &Arc<dyn RegistrarApi>,
    ) -> crate::error::Result<ResolutionResult> {
        // credential, validation and rate-limit failures are surfaced as-is;
        // retrying them cannot change the answer
        let quote = api.check_availability(domain).await?;

        let status = if quote.available {
            DomainStatus::Available
        } else {
            DomainStatus::Registered
        };

        let mut result = ResolutionResult::from_status(domain, status, Provider::RegistrarApi, 0);
        result.price = quote.price;
        result.currency = quote.currency;
        result.period = quote.period;
        Ok(result)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::summarize;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StaticWhois(&'static str);

    #[async_trait]
    impl WhoisTransport for StaticWhois {
        async fn lookup(&self, _domain: &str, _options: &LookupOptions) -> crate::error::Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn resolver(transport: Arc<dyn WhoisTransport>) -> DomainResolver {
        DomainResolver::new(
            Arc::new(ResultCache::new(Duration::from_secs(60))),
            Arc::new(SerialScheduler::new(Duration::ZERO)),
            ProviderBackend::Whois(transport),
            ResolveConfig {
                query_delay: Duration::ZERO,
                ..ResolveConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_malformed_domain_is_rejected_before_query() {
        let resolver = resolver(Arc::new(StaticWhois("should never be reached")));
        let result = resolver.resolve("not a domain").await;

        assert_eq!(result.status, DomainStatus::Error);
        assert_eq!(result.available, None);
        assert!(result.error.as_deref().unwrap_or("").contains("Validation"));
        // nothing was scheduled
        assert_eq!(resolver.scheduler.size(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty_with_no_callbacks() {
        let resolver = resolver(Arc::new(StaticWhois("")));
        let mut calls = 0;
        let results = resolver.resolve_batch(&[], |_| calls += 1).await;
        assert!(results.is_empty());
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_registered_response_and_summary() {
        let resolver = resolver(Arc::new(StaticWhois(
            "Registrar: Foo\nCreation Date: 2001-01-01",
        )));
        let domains = vec!["example.com".to_string()];
        let results = resolver.resolve_batch(&domains, |_| {}).await;

        assert_eq!(results[0].status, DomainStatus::Registered);
        assert_eq!(results[0].available, Some(false));
        let summary = summarize(&results);
        assert_eq!(summary.registered, 1);
    }
}
