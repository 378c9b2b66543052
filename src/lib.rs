//! Domain Scout - bulk domain availability resolution
//!
//! Resolves whether domain names are registered or available, over the WHOIS
//! text protocol (serialized, paced, heuristically classified) or a
//! structured registrar API, with a TTL cache in front of both.

pub mod cache;
pub mod classify;
pub mod domain;
pub mod error;
pub mod registrar;
pub mod resolver;
pub mod scheduler;
pub mod types;
pub mod whois;

// Re-export commonly used types
pub use error::{DomainScoutError, Result};
pub use types::{
    summarize, BatchProgress, BatchSummary, DomainStatus, Provider, ResolutionResult,
    ResolveConfig,
};

pub use cache::ResultCache;
pub use registrar::{HttpRegistrarApi, RegistrarApi, RegistrarConfig};
pub use resolver::{DomainResolver, ProviderBackend};
pub use scheduler::SerialScheduler;
pub use whois::{LookupOptions, TcpWhoisTransport, WhoisTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
