//! Central WHOIS server registry.
//!
//! We intentionally keep this a small, static mapping (convention over
//! configuration). Unknown TLDs fall back to IANA discovery at query time.

/// Get the WHOIS server for a TLD (lowercase, without leading dot).
pub fn whois_server(tld: &str) -> Option<&'static str> {
    match tld {
        "com" | "net" => Some("whois.verisign-grs.com"),
        "org" => Some("whois.pir.org"),
        "info" => Some("whois.nic.info"),
        "io" => Some("whois.nic.io"),
        "ai" => Some("whois.nic.ai"),
        "co" => Some("whois.nic.co"),
        "me" => Some("whois.nic.me"),
        "xyz" => Some("whois.nic.xyz"),
        "dev" | "app" => Some("whois.nic.google"),
        "es" => Some("whois.nic.es"),
        "mx" => Some("whois.mx"),
        "cl" => Some("whois.nic.cl"),
        "ar" => Some("whois.nic.ar"),
        "pe" => Some("kero.yachay.pe"),
        _ => None,
    }
}

/// WHOIS server used to discover the authoritative server for unknown TLDs.
pub const IANA_WHOIS: &str = "whois.iana.org";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tlds() {
        assert_eq!(whois_server("com"), Some("whois.verisign-grs.com"));
        assert_eq!(whois_server("cl"), Some("whois.nic.cl"));
        assert!(whois_server("unknown").is_none());
    }
}
