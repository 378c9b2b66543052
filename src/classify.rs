//! Heuristic classification of raw WHOIS output
//!
//! Registries return free text with no shared schema, so this module turns a
//! raw payload (or the failure message of a rejected query) into a verdict
//! using ordered, data-driven vocabulary tables. Registration evidence is
//! checked before availability evidence: registries often embed boilerplate
//! that spuriously matches an availability phrase, and a wrong "available" is
//! the costlier mistake downstream.

use crate::error::{DomainScoutError, Result};
use crate::types::DomainStatus;

/// Payloads shorter than this are treated as "no record returned".
pub const MIN_PAYLOAD_LEN: usize = 25;

/// Secondary threshold: responses shorter than this with no recognized
/// evidence still lean available.
pub const SHORT_PAYLOAD_LEN: usize = 140;

/// Strong registration evidence, grouped by the field the phrase labels.
///
/// Each group counts once no matter how many of its spellings appear, so two
/// synonymous labels from the same registry cannot fake a second signal.
/// Group order is the scan priority.
const REGISTRATION_EVIDENCE: &[(&str, &[&str])] = &[
    ("registrar", &["registrar:", "sponsoring registrar:", "registrar name:"]),
    ("creation-date", &["creation date:", "created:", "created on:", "registered on:", "registration date:", "fecha de registro"]),
    ("expiry-date", &["registry expiry date:", "expiration date:", "expiry date:", "expires:", "paid-till:", "fecha de vencimiento"]),
    ("updated-date", &["updated date:", "last updated:", "last modified:", "changed:"]),
    ("nameservers", &["name server:", "nameserver:", "nserver:", "name servers:", "dns:", "servidor de nombres"]),
    ("registrant", &["registrant:", "registrant name:", "registrant organization:", "admin contact", "administrative contact", "tech contact", "technical contact", "titular:"]),
    ("active-status", &["domain status: active", "domain status: ok", "status: active", "status: ok", "status: clienttransferprohibited", "estado: activo"]),
];

/// Availability evidence, English and Spanish, first match wins.
const AVAILABILITY_EVIDENCE: &[&str] = &[
    "no match",
    "not found",
    "no entries found",
    "no data found",
    "domain not found",
    "object does not exist",
    "domain status: no object found",
    "available for registration",
    "domain available",
    "not registered",
    "status: free",
    "status: available",
    "no existe",
    "dominio no registrado",
    "dominio libre",
    "disponible para registro",
];

/// Failure messages that really mean "no such record".
const NOT_FOUND_ERRORS: &[&str] = &[
    "no match",
    "not found",
    "no entries found",
    "no data found",
    "nxdomain",
    "no existe",
    "object does not exist",
];

/// Failure messages pointing at connectivity rather than the registry record.
const TRANSIENT_ERRORS: &[&str] = &[
    "timed out",
    "timeout",
    "etimedout",
    "econnreset",
    "connection reset",
    "econnrefused",
    "connection refused",
    "enotfound",
    "eai_again",
    "network unreachable",
    "broken pipe",
];

/// TLDs whose WHOIS servers are known to be slow or flaky. Connectivity
/// failures for these are surfaced as "verify manually" instead of being
/// misread as availability; lookups against them get the extended timeout.
const SLOW_TLDS: &[&str] = &[
    "es", "cl", "ar", "pe", "mx", "ve", "ec", "uy", "bo", "py", "do",
];

/// Whether a TLD belongs to the known-slow registry set.
pub fn is_slow_tld(tld: &str) -> bool {
    SLOW_TLDS.contains(&tld.to_lowercase().as_str())
}

/// Whether a failure message matches the not-found vocabulary.
pub fn matches_not_found(message: &str) -> bool {
    let msg = message.to_lowercase();
    NOT_FOUND_ERRORS.iter().any(|p| msg.contains(p))
}

/// Whether a failure message matches the transient/connectivity vocabulary.
pub fn matches_transient(message: &str) -> bool {
    let msg = message.to_lowercase();
    TRANSIENT_ERRORS.iter().any(|p| msg.contains(p))
}

/// Classify a successful raw WHOIS payload.
///
/// Ordered algorithm:
/// 1. near-empty payload ⇒ available (registries return almost nothing for
///    unregistered names)
/// 2. two or more distinct registration-evidence groups ⇒ registered
/// 3. exactly one registration group ⇒ registered (a single strong signal
///    outweighs absence of counter-evidence)
/// 4. first availability phrase ⇒ available
/// 5. still short with nothing recognized ⇒ available
/// 6. long and ambiguous ⇒ registered, the conservative default
pub fn classify_response(raw: &str) -> DomainStatus {
    let text = raw.to_lowercase();
    let trimmed = text.trim();

    if trimmed.len() < MIN_PAYLOAD_LEN {
        return DomainStatus::Available;
    }

    let mut evidence = 0usize;
    for (_group, patterns) in REGISTRATION_EVIDENCE {
        if patterns.iter().any(|p| trimmed.contains(p)) {
            evidence += 1;
            if evidence >= 2 {
                return DomainStatus::Registered;
            }
        }
    }
    if evidence == 1 {
        return DomainStatus::Registered;
    }

    if AVAILABILITY_EVIDENCE.iter().any(|p| trimmed.contains(p)) {
        return DomainStatus::Available;
    }

    if trimmed.len() < SHORT_PAYLOAD_LEN {
        return DomainStatus::Available;
    }

    DomainStatus::Registered
}

/// Classify a lookup that failed outright.
///
/// A not-found failure is evidence of availability, not an error. A
/// connectivity failure against a known-slow registry is a distinct
/// manual-verification condition. Anything else propagates verbatim.
pub fn classify_failure(domain: &str, tld: &str, message: &str) -> Result<DomainStatus> {
    if matches_not_found(message) {
        return Ok(DomainStatus::Available);
    }

    if matches_transient(message) && is_slow_tld(tld) {
        return Err(DomainScoutError::manual_check(
            domain,
            format!("registry for .{tld} is unreliable ({message}); verify manually"),
        ));
    }

    Err(DomainScoutError::domain_check(
        domain,
        message,
        Some("whois".to_string()),
    ))
}
