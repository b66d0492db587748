//! Domain → strategy lookup
//!
//! Known non-conforming portals get a dedicated strategy; everything else
//! falls back to [`StandardStrategy`]. Lookups are cached per domain;
//! registering a new mapping invalidates the cached instance for that
//! domain. Adding a site means one strategy type and one table entry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use url::Url;

use super::{
    BaufestStrategy, ExtractionStrategy, GpsHospitalityStrategy, NvaStrategy, StandardStrategy,
};

/// Registry of per-domain extraction strategies
pub struct StrategyRegistry {
    mappings: RwLock<HashMap<String, Arc<dyn ExtractionStrategy>>>,
    cache: RwLock<HashMap<String, Arc<dyn ExtractionStrategy>>>,
    standard: Arc<dyn ExtractionStrategy>,
}

impl StrategyRegistry {
    /// Create a registry preloaded with the known non-standard portals
    #[must_use]
    pub fn new() -> Self {
        let mut mappings: HashMap<String, Arc<dyn ExtractionStrategy>> = HashMap::new();
        mappings.insert("baufest.avature.net".to_string(), Arc::new(BaufestStrategy));
        mappings.insert(
            "gpshospitality.avature.net".to_string(),
            Arc::new(GpsHospitalityStrategy),
        );
        mappings.insert("nva.avature.net".to_string(), Arc::new(NvaStrategy));

        Self {
            mappings: RwLock::new(mappings),
            cache: RwLock::new(HashMap::new()),
            standard: Arc::new(StandardStrategy),
        }
    }

    /// Strategy for a domain or full URL.
    ///
    /// Deterministic: the same domain always yields a strategy with
    /// identical behavior, [`StandardStrategy`] when no override is
    /// registered.
    pub fn get(&self, domain_or_url: &str) -> Arc<dyn ExtractionStrategy> {
        let domain = domain_of(domain_or_url);

        if let Some(strategy) = read_lock(&self.cache).get(&domain) {
            return Arc::clone(strategy);
        }

        let strategy = read_lock(&self.mappings)
            .get(&domain)
            .map(Arc::clone)
            .unwrap_or_else(|| Arc::clone(&self.standard));
        write_lock(&self.cache).insert(domain, Arc::clone(&strategy));
        strategy
    }

    /// Register (or replace) the strategy for a domain, invalidating any
    /// cached instance
    pub fn register(&self, domain: &str, strategy: Arc<dyn ExtractionStrategy>) {
        write_lock(&self.mappings).insert(domain.to_string(), strategy);
        write_lock(&self.cache).remove(domain);
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Host name of a URL, or the input itself when it is already a bare domain
fn domain_of(domain_or_url: &str) -> String {
    if domain_or_url.starts_with("http") {
        if let Ok(url) = Url::parse(domain_or_url) {
            if let Some(host) = url.host_str() {
                return host.to_string();
            }
        }
    }
    domain_or_url.to_string()
}

// Lock poisoning can only come from a panicked reader/writer; the maps stay
// structurally valid, so recover the guard.
fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
