//! Domain input normalization
//!
//! Input lines arrive as anything a user might paste: full URLs, `www.`
//! prefixes, mixed case, trailing paths. Everything downstream works on one
//! canonical lower-case form that has passed the domain grammar.

use crate::error::{DomainScoutError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

fn label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").expect("valid label regex"))
}

fn tld_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]{2,63}$").expect("valid TLD regex"))
}

/// Normalize a raw input line into a canonical domain.
///
/// Trims, lowercases, strips an `http(s)://` scheme, a leading `www.`, any
/// path/query/fragment, and a trailing dot, then validates the result against
/// the domain grammar (label charset, hyphen placement, label and total
/// length limits, alphabetic TLD).
pub fn normalize(input: &str) -> Result<String> {
    let mut domain = input.trim().to_lowercase();

    for scheme in ["https://", "http://"] {
        if let Some(rest) = domain.strip_prefix(scheme) {
            domain = rest.to_string();
            break;
        }
    }

    if let Some(cut) = domain.find(['/', '?', '#']) {
        domain.truncate(cut);
    }

    if let Some(rest) = domain.strip_prefix("www.") {
        domain = rest.to_string();
    }

    if let Some(rest) = domain.strip_suffix('.') {
        domain = rest.to_string();
    }

    validate(&domain)?;
    Ok(domain)
}

/// Normalize a list of input lines into distinct domain queries.
///
/// One query per distinct line, order preserved. Lines that fail the grammar
/// are kept verbatim so the resolver can reject them into per-domain error
/// results instead of silently dropping input.
pub fn normalize_all<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let domain = normalize(line).unwrap_or_else(|_| line.trim().to_lowercase());
        if seen.insert(domain.clone()) {
            out.push(domain);
        }
    }
    out
}

/// Last label of a domain. Falls back to the whole string for dotless input.
pub fn tld_of(domain: &str) -> &str {
    domain.rsplit('.').next().unwrap_or(domain)
}

fn validate(domain: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(DomainScoutError::validation("Domain name cannot be empty"));
    }

    if domain.len() > MAX_DOMAIN_LEN {
        return Err(DomainScoutError::validation(
            "Domain name too long (max 253 characters)",
        ));
    }

    if domain.contains("..") {
        return Err(DomainScoutError::validation(
            "Domain cannot contain consecutive dots",
        ));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(DomainScoutError::validation(
            "Domain must have at least one dot",
        ));
    }

    for label in &labels {
        if label.len() > MAX_LABEL_LEN {
            return Err(DomainScoutError::validation(
                "Domain label too long (max 63 characters)",
            ));
        }
        if !label_regex().is_match(label) {
            return Err(DomainScoutError::validation(format!(
                "Invalid domain label: '{label}'"
            )));
        }
    }

    let tld = labels[labels.len() - 1];
    if !tld_regex().is_match(tld) {
        return Err(DomainScoutError::validation("Invalid TLD format"));
    }

    Ok(())
}
