//! WHOIS text-protocol transport (TCP/43)

pub mod registry;

use crate::domain::tld_of;
use crate::error::{DomainScoutError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Per-lookup options chosen by the caller
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// Bound on each network step (connect, write, read)
    pub timeout: Duration,
    /// How many registrar WHOIS referrals to follow. Thin registries such as
    /// .com need one hop to reach registrant data.
    pub follow_referrals: usize,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            follow_referrals: 1,
        }
    }
}

/// Transport seam for raw registry lookups
#[async_trait]
pub trait WhoisTransport: Send + Sync {
    /// Query the registry for a domain and return the raw free-text response.
    /// Fails with a message string on timeout, refusal, or missing server.
    async fn lookup(&self, domain: &str, options: &LookupOptions) -> Result<String>;
}

/// Pure Rust WHOIS over TCP/43 (no external `whois` binary required)
#[derive(Debug, Default, Clone)]
pub struct TcpWhoisTransport;

impl TcpWhoisTransport {
    pub fn new() -> Self {
        Self
    }

    async fn query(&self, server: &str, query: &str, step_timeout: Duration) -> Result<String> {
        let secs = step_timeout.as_secs();
        let addr = format!("{server}:43");

        let mut stream = timeout(step_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| DomainScoutError::timeout("WHOIS connect", secs))?
            .map_err(|e| {
                DomainScoutError::network(
                    format!("WHOIS connect failed: {e}"),
                    None,
                    Some(addr.clone()),
                )
            })?;

        timeout(step_timeout, stream.write_all(format!("{query}\r\n").as_bytes()))
            .await
            .map_err(|_| DomainScoutError::timeout("WHOIS write", secs))?
            .map_err(|e| {
                DomainScoutError::network(
                    format!("WHOIS write failed: {e}"),
                    None,
                    Some(addr.clone()),
                )
            })?;

        let mut buf = Vec::new();
        timeout(step_timeout, stream.read_to_end(&mut buf))
            .await
            .map_err(|_| DomainScoutError::timeout("WHOIS read", secs))?
            .map_err(|e| {
                DomainScoutError::network(format!("WHOIS read failed: {e}"), None, Some(addr))
            })?;

        Ok(String::from_utf8_lossy(&buf).to_string())
    }

    /// Resolve the server to ask for a TLD, going through IANA for unknown ones.
    async fn server_for(&self, domain: &str, tld: &str, step_timeout: Duration) -> Result<String> {
        if let Some(server) = registry::whois_server(tld) {
            return Ok(server.to_string());
        }

        let iana = self.query(registry::IANA_WHOIS, tld, step_timeout).await?;
        parse_server_line(&iana, "whois:")
            .or_else(|| parse_server_line(&iana, "refer:"))
            .ok_or_else(|| {
                DomainScoutError::domain_check(
                    domain,
                    format!("No WHOIS server found for TLD: {tld}"),
                    Some("whois".to_string()),
                )
            })
    }
}

#[async_trait]
impl WhoisTransport for TcpWhoisTransport {
    async fn lookup(&self, domain: &str, options: &LookupOptions) -> Result<String> {
        let tld = tld_of(domain).to_lowercase();
        let server = self.server_for(domain, &tld, options.timeout).await?;

        let mut response = self.query(&server, domain, options.timeout).await?;
        tracing::debug!(domain = %domain, server = %server, bytes = %response.len(), "WHOIS query completed");

        let mut hops = 0;
        let mut current = server;
        while hops < options.follow_referrals {
            let Some(referral) = parse_registrar_referral(&response) else {
                break;
            };
            if referral == current {
                break;
            }
            match self.query(&referral, domain, options.timeout).await {
                Ok(referred) if referred.trim().len() > response.trim().len() => {
                    tracing::debug!(domain = %domain, server = %referral, "Followed registrar WHOIS referral");
                    response = referred;
                }
                // keep the registry answer if the referral fails or says less
                Ok(_) | Err(_) => break,
            }
            current = referral;
            hops += 1;
        }

        Ok(response)
    }
}

/// Extract a `key: server` line (IANA `whois:` / `refer:` records).
fn parse_server_line(output: &str, key: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find_map(|line| {
            if line.to_lowercase().starts_with(key) {
                Some(line.splitn(2, ':').nth(1)?.trim().to_string())
            } else {
                None
            }
        })
        .filter(|s| !s.is_empty())
}

/// Extract the registrar WHOIS server a thin-registry response points at.
fn parse_registrar_referral(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find_map(|line| {
            let lower = line.to_lowercase();
            if lower.starts_with("registrar whois server:") || lower.starts_with("whois server:") {
                Some(line.splitn(2, ':').nth(1)?.trim().to_string())
            } else {
                None
            }
        })
        .filter(|s| !s.is_empty() && s.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iana_whois_line_parsing() {
        let sample = r#"
domain:       COM
organisation: Verisign Global Registry Services
whois:        whois.verisign-grs.com
status:       ACTIVE
"#;
        assert_eq!(
            parse_server_line(sample, "whois:").as_deref(),
            Some("whois.verisign-grs.com")
        );
    }

    #[test]
    fn test_iana_refer_line_parsing() {
        let sample = "refer: whois.nic.io\n";
        assert_eq!(parse_server_line(sample, "refer:").as_deref(), Some("whois.nic.io"));
        assert_eq!(parse_server_line(sample, "whois:"), None);
    }

    #[test]
    fn test_registrar_referral_parsing() {
        let sample = r#"
Domain Name: EXAMPLE.COM
Registrar WHOIS Server: whois.registrar.example
Registrar URL: http://registrar.example
"#;
        assert_eq!(
            parse_registrar_referral(sample).as_deref(),
            Some("whois.registrar.example")
        );
        assert_eq!(parse_registrar_referral("Registrar WHOIS Server:\n"), None);
    }
}
