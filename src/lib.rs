//! A process-wide registry of time zones.
//!
//! Zones come from two sources: a fixed set of built-in, rule-based zones
//! (`GMT`, `PST`, `JST`, ...), and TZif files found by scanning the system's
//! zoneinfo directories. The registry is populated once, on first use.
//!
//! ```no_run
//! use tzregistry::{Era, Month, Weekday};
//!
//! let zone = tzregistry::lookup("Europe/Amsterdam").unwrap();
//! let offset_ms = zone.offset_at(Era::AD, 2024, Month::July, 1, Weekday::Monday, 12 * 3_600_000);
//! assert_eq!(offset_ms, 2 * 3_600_000);
//! ```
mod common;
pub mod config;
pub mod date;
pub mod tz;

use std::{collections::HashSet, sync::Arc};

pub use common::scalar::{EpochMillis, Era, Month, Offset, Weekday, Year};
pub use config::Config;
pub use tz::{
    file::{FileZone, LoadError},
    fixed::{DaylightRule, FixedZone, RuleError, Transition},
    scan::ScanReport,
    store::{DefaultZoneError, ZoneRegistry, global},
    tzif::ErrorCause,
    zone::{Zone, ZoneKind},
};

/// Look up a zone by identifier in the global registry
pub fn lookup(id: &str) -> Option<Arc<Zone>> {
    global().lookup(id)
}

/// All identifiers in the global registry
pub fn available_ids() -> HashSet<String> {
    global().available_ids()
}

/// Identifiers in the global registry with the given raw offset (milliseconds)
pub fn available_ids_with_offset(raw_offset: i32) -> HashSet<String> {
    global().available_ids_with_offset(raw_offset)
}

/// The default zone of the global registry
pub fn default_zone() -> Result<Arc<Zone>, DefaultZoneError> {
    global().default_zone()
}

/// Replace the default zone of the global registry
pub fn set_default(zone: Arc<Zone>) {
    global().set_default(zone)
}
