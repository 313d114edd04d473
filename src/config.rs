//! Store configuration.
//!
//! Defaults mirror the production values the store shipped with: a 5 minute
//! cache TTL over at most 50 entries, a 10 minute janitor interval, and a
//! 1 hour orphan window for abandoned pending operations. Everything is
//! overridable through `STELLAR_`-prefixed environment variables.

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the reservations API.
    pub api_base_url: Url,
    /// Per-request timeout applied by the HTTP gateway.
    pub request_timeout_secs: u64,
    /// Age past which a cached reservation is treated as absent.
    pub cache_ttl_secs: u64,
    /// Maximum cache entries; the oldest are evicted beyond this.
    pub cache_max_entries: usize,
    /// How often the janitor sweeps the cache and the pending ledger.
    pub janitor_interval_secs: u64,
    /// Age past which a pending operation counts as orphaned.
    pub orphan_age_secs: u64,
    /// Default page size for paginated loads.
    pub page_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse("http://localhost:8000/api/")
                .expect("default API base URL is valid"),
            request_timeout_secs: 30,
            cache_ttl_secs: 5 * 60,
            cache_max_entries: 50,
            janitor_interval_secs: 10 * 60,
            orphan_age_secs: 60 * 60,
            page_size: 10,
        }
    }
}

impl StoreConfig {
    /// Load configuration from `STELLAR_`-prefixed environment variables,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(StoreConfig::default()))
            .merge(Env::prefixed("STELLAR_"))
            .extract()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn janitor_interval(&self) -> Duration {
        Duration::from_secs(self.janitor_interval_secs)
    }

    pub fn orphan_age(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.orphan_age_secs as i64)
    }
}
