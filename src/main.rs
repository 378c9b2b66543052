//! Domain Scout - bulk domain availability checking
//!
//! A simple CLI for checking whether domains are registered or available,
//! over WHOIS or a configured registrar API, with paced lookups and progress
//! reporting.

use anyhow::Context;
use domain_scout::{
    cache::DEFAULT_SWEEP_INTERVAL,
    domain::normalize_all,
    summarize, DomainResolver, DomainStatus, HttpRegistrarApi, Provider, ProviderBackend,
    RegistrarConfig, ResolveConfig, ResultCache, SerialScheduler, TcpWhoisTransport,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::process;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = domain_scout::init() {
        eprintln!("❌ Failed to initialize: {}", e);
        process::exit(1);
    }

    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let domains = collect_domains(&args)?;
    if domains.is_empty() {
        eprintln!("❌ No domains given. Pass domains as arguments or use --file <path>.");
        eprintln!("   Try: domain-scout example.com example.org");
        process::exit(1);
    }

    run_checks(&domains).await
}

/// Gather domains from argv and/or a `--file` list (one per line, `#` comments).
fn collect_domains(args: &[String]) -> anyhow::Result<Vec<String>> {
    let mut raw: Vec<String> = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--file" || arg == "-f" {
            let path = iter
                .next()
                .context("--file requires a path argument")?;
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read domain list '{}'", path))?;
            raw.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(String::from),
            );
        } else {
            raw.push(arg.clone());
        }
    }

    Ok(normalize_all(raw))
}

/// Build the resolver from environment configuration and run the batch.
async fn run_checks(domains: &[String]) -> anyhow::Result<()> {
    let config = config_from_env();

    let cache = Arc::new(ResultCache::new(config.cache_ttl));
    let _sweeper = Arc::clone(&cache).start_sweeper(DEFAULT_SWEEP_INTERVAL);
    let scheduler = Arc::new(SerialScheduler::new(config.query_delay));

    let backend = registrar_backend_from_env().unwrap_or_else(|| {
        ProviderBackend::Whois(Arc::new(TcpWhoisTransport::new()))
    });
    let resolver = DomainResolver::new(cache, scheduler, backend, config);

    println!("🔍 Domain Scout - checking {} domain(s)", domains.len());
    println!("   Provider: {}", resolver.provider());
    println!("═══════════════════════════════════════");
    println!();

    let bar = ProgressBar::new(domains.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let check_start = std::time::Instant::now();
    let results = resolver
        .resolve_batch(domains, |progress| {
            bar.set_message(progress.domain.to_string());
            bar.set_position(progress.current as u64);
        })
        .await;
    bar.finish_and_clear();
    let check_duration = check_start.elapsed();

    display_results(&results);

    let summary = summarize(&results);
    println!("📈 Summary:");
    println!("   ✅ Available: {}", summary.available);
    println!("   ❌ Registered: {}", summary.registered);
    if summary.errors > 0 {
        println!("   ⚠️  Errors: {}", summary.errors);
    }
    println!("   📊 Total checked: {}", results.len());
    println!("   ⏱️  Total time: {:.2}s", check_duration.as_secs_f32());

    Ok(())
}

/// Resolution tunables from the environment, defaults otherwise.
fn config_from_env() -> ResolveConfig {
    let mut config = ResolveConfig::default();

    if let Some(secs) = env_u64("SCOUT_CACHE_TTL_SECS") {
        config.cache_ttl = Duration::from_secs(secs);
    }
    if let Some(ms) = env_u64("SCOUT_QUERY_DELAY_MS") {
        config.query_delay = Duration::from_millis(ms);
    }
    if let Some(secs) = env_u64("SCOUT_LOOKUP_TIMEOUT_SECS") {
        config.lookup_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = env_u64("SCOUT_SLOW_TLD_TIMEOUT_SECS") {
        config.slow_tld_timeout = Duration::from_secs(secs);
    }
    if let Some(n) = env_u64("SCOUT_MAX_RETRIES") {
        config.max_retries = n as usize;
    }

    config
}

/// Registrar API backend when credentials are configured, preferred over WHOIS.
fn registrar_backend_from_env() -> Option<ProviderBackend> {
    let api_key = env::var("REGISTRAR_API_KEY").ok()?;
    let api_secret = env::var("REGISTRAR_API_SECRET").ok()?;
    let base_url = env::var("REGISTRAR_API_URL")
        .unwrap_or_else(|_| "https://api.godaddy.com".to_string());

    println!("✅ Registrar API provider configured");
    let config = RegistrarConfig::new(base_url, api_key, api_secret);
    Some(ProviderBackend::RegistrarApi(Arc::new(
        HttpRegistrarApi::new(config),
    )))
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok()?.parse().ok()
}

/// Display results grouped by verdict.
fn display_results(results: &[domain_scout::ResolutionResult]) {
    let available: Vec<_> = results
        .iter()
        .filter(|r| r.status == DomainStatus::Available)
        .collect();
    let registered: Vec<_> = results
        .iter()
        .filter(|r| r.status == DomainStatus::Registered)
        .collect();
    let errors: Vec<_> = results
        .iter()
        .filter(|r| r.status == DomainStatus::Error)
        .collect();

    if !available.is_empty() {
        println!("🎉 Available Domains ({}):", available.len());
        println!("─────────────────────────");
        for result in &available {
            print!("✅ {} - AVAILABLE", result.domain);
            if result.provider == Provider::RegistrarApi {
                if let (Some(price), Some(currency)) = (result.price, result.currency.as_deref()) {
                    print!(" ({:.2} {}/yr)", price, currency);
                }
            }
            if result.from_cache {
                print!(" [cached]");
            }
            println!();
        }
        println!();
    }

    if !registered.is_empty() {
        println!("❌ Registered Domains ({}):", registered.len());
        println!("──────────────────────────");
        for result in &registered {
            print!("❌ {} - REGISTERED", result.domain);
            if result.from_cache {
                print!(" [cached]");
            }
            println!();
        }
        println!();
    }

    if !errors.is_empty() {
        println!("⚠️  Checking Issues ({}):", errors.len());
        println!("───────────────────────");
        for result in &errors {
            println!(
                "⚠️  {} - {}",
                result.domain,
                result.error.as_deref().unwrap_or("Unknown error")
            );
        }
        println!();
    }
}

/// Print help information
fn print_help() {
    println!("🔍 Domain Scout - bulk domain availability checking");
    println!("═══════════════════════════════════════════════════");
    println!();
    println!("USAGE:");
    println!("    domain-scout [DOMAINS...] [--file <path>]");
    println!();
    println!("EXAMPLES:");
    println!("    domain-scout example.com example.org");
    println!("    domain-scout --file domains.txt       # one domain per line");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    REGISTRAR_API_KEY          Registrar API key (enables the structured provider)");
    println!("    REGISTRAR_API_SECRET       Registrar API secret");
    println!("    REGISTRAR_API_URL          Registrar API base URL (default: https://api.godaddy.com)");
    println!();
    println!("    SCOUT_CACHE_TTL_SECS       Cache TTL (default: 3600)");
    println!("    SCOUT_QUERY_DELAY_MS       Delay between WHOIS queries (default: 1500)");
    println!("    SCOUT_LOOKUP_TIMEOUT_SECS  Per-lookup timeout (default: 10)");
    println!("    SCOUT_SLOW_TLD_TIMEOUT_SECS  Timeout for slow registries (default: 20)");
    println!("    SCOUT_MAX_RETRIES          Retries for transient WHOIS failures (default: 2)");
    println!();
    println!("FEATURES:");
    println!("    • Serialized, paced WHOIS lookups that respect registry rate limits");
    println!("    • Heuristic classification of free-text registry responses");
    println!("    • Structured registrar API with pricing when credentials are set");
    println!("    • TTL-cached results across a run");
}
