//! The registry of all known zones, and the process default zone.
use crate::{
    config::{Config, FALLBACK_ZONE},
    tz::{
        builtin,
        scan::{self, ScanReport},
        sync::SyncRwLock,
        zone::Zone,
    },
};
use ahash::AHashMap;
use std::{
    collections::HashSet,
    sync::{Arc, OnceLock},
};
use tracing::{debug, error, info, warn};

// Choice of data structure:
// "Ahash" works significantly faster than the standard hashing algorithm.
// We don't need the cryptographic security of the standard algorithm,
// since the keys are trusted (they come from built-ins and directory listings).
pub(crate) type Catalog = AHashMap<String, Arc<Zone>>;

#[derive(Debug)]
struct Populated {
    zones: Catalog,
    report: ScanReport,
}

/// Identifier to zone mapping, populated on first use.
///
/// Population registers the built-in zones, then scans the configured
/// search paths in order. Later registrations replace earlier ones
/// with the same identifier. It runs exactly once, even under concurrent
/// first access: other callers block until it's done.
/// Afterwards, reads don't take any locks.
#[derive(Debug)]
pub struct ZoneRegistry {
    config: Config,
    populated: OnceLock<Populated>,
    // Lazily resolved from the config. Overridable.
    default: SyncRwLock<Option<Arc<Zone>>>,
}

impl ZoneRegistry {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            populated: OnceLock::new(),
            default: SyncRwLock::new(None),
        }
    }

    /// A registry containing exactly the given zones
    #[cfg(test)]
    pub(crate) fn from_catalog(config: Config, zones: Catalog) -> Self {
        let registry = Self::new(config);
        let _ = registry.populated.set(Populated {
            zones,
            report: ScanReport::default(),
        });
        registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn populated(&self) -> &Populated {
        self.populated.get_or_init(|| self.populate_now())
    }

    fn populate_now(&self) -> Populated {
        let mut zones = Catalog::default();
        for zone in builtin::zones() {
            zones.insert(zone.id().to_owned(), Arc::new(zone));
        }
        let report = scan::scan_roots(&self.config.search_paths, &mut zones);
        info!(
            zones = zones.len(),
            registered = report.registered,
            skipped = report.skipped,
            "populated time zone registry"
        );
        Populated { zones, report }
    }

    /// Populate the registry, if not done already
    pub fn populate(&self) {
        self.populated();
    }

    /// Outcome of the directory scan during population
    pub fn scan_report(&self) -> ScanReport {
        self.populated().report
    }

    pub fn lookup(&self, id: &str) -> Option<Arc<Zone>> {
        self.populated().zones.get(id).cloned()
    }

    pub fn available_ids(&self) -> HashSet<String> {
        self.populated().zones.keys().cloned().collect()
    }

    /// Identifiers of all zones with exactly the given raw offset (in milliseconds)
    pub fn available_ids_with_offset(&self, raw_offset: i32) -> HashSet<String> {
        self.populated()
            .zones
            .iter()
            .filter(|(_, zone)| zone.raw_offset() == raw_offset)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.populated().zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populated().zones.is_empty()
    }

    /// Retrieve the default zone (cached for repeat calls).
    pub fn default_zone(&self) -> Result<Arc<Zone>, DefaultZoneError> {
        // Fast path: already resolved
        if let Some(zone) = self.default.with_read(|d| d.clone()) {
            return Ok(zone);
        }
        self.default.with_write(|slot| {
            // Another thread may have resolved it while we waited for the lock
            if let Some(zone) = slot {
                return Ok(zone.clone());
            }
            let zone = self.resolve_default()?;
            *slot = Some(zone.clone());
            Ok(zone)
        })
    }

    fn resolve_default(&self) -> Result<Arc<Zone>, DefaultZoneError> {
        let preferred = self.config.default_zone_id();
        if let Some(zone) = self.lookup(preferred) {
            debug!(id = preferred, "resolved default zone");
            return Ok(zone);
        }
        warn!(
            id = preferred,
            fallback = FALLBACK_ZONE,
            "default zone not found, using fallback"
        );
        self.lookup(FALLBACK_ZONE).ok_or_else(|| {
            error!(
                id = preferred,
                fallback = FALLBACK_ZONE,
                "fallback zone missing from registry"
            );
            DefaultZoneError::FallbackMissing {
                preferred: preferred.to_owned(),
            }
        })
    }

    /// Replace the default zone, bypassing resolution until changed again
    pub fn set_default(&self, zone: Arc<Zone>) {
        self.default.with_write(|slot| *slot = Some(zone));
    }

    /// Clear the cached default zone, so the next access resolves it again
    pub fn reset_default(&self) {
        self.default.with_write(|slot| *slot = None);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefaultZoneError {
    /// Even the fallback zone isn't registered. The registry is broken.
    #[error(
        "neither the default zone {preferred:?} nor the fallback {fallback:?} is registered",
        fallback = FALLBACK_ZONE
    )]
    FallbackMissing { preferred: String },
}

/// The process-wide registry, configured from the environment on first access
pub fn global() -> &'static ZoneRegistry {
    static GLOBAL: OnceLock<ZoneRegistry> = OnceLock::new();
    GLOBAL.get_or_init(|| ZoneRegistry::new(Config::from_env()))
}
