//! Registry configuration, read from the environment
use std::{
    env,
    ffi::OsString,
    path::PathBuf,
};

/// The zone used when no default is configured, or the configured one doesn't exist
pub const FALLBACK_ZONE: &str = "GMT";

/// Conventional locations of the system's zoneinfo database
pub const DEFAULT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/zoneinfo",
    "/usr/lib/zoneinfo",
    "/usr/share/lib/zoneinfo",
    "/etc/zoneinfo",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directories scanned for TZif files, in order
    pub search_paths: Vec<PathBuf>,
    /// Identifier of the default zone, if configured
    pub preferred_zone: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_paths: DEFAULT_SEARCH_PATHS.iter().map(PathBuf::from).collect(),
            preferred_zone: None,
        }
    }
}

impl Config {
    /// Read `TZPATH` and `TZ` from the environment
    pub fn from_env() -> Self {
        Self::from_vars(env::var_os("TZPATH"), env::var_os("TZ"))
    }

    pub(crate) fn from_vars(tzpath: Option<OsString>, tz: Option<OsString>) -> Self {
        let mut config = Self::default();
        if let Some(tzpath) = tzpath {
            config.search_paths = parse_tzpath(&tzpath);
        }
        config.preferred_zone = tz.and_then(|tz| parse_tz(&tz));
        config
    }

    pub fn with_search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preferred_zone(mut self, id: impl Into<String>) -> Self {
        self.preferred_zone = Some(id.into());
        self
    }

    /// The identifier to resolve the default zone with
    pub fn default_zone_id(&self) -> &str {
        self.preferred_zone.as_deref().unwrap_or(FALLBACK_ZONE)
    }
}

fn parse_tzpath(value: &OsString) -> Vec<PathBuf> {
    env::split_paths(value)
        .filter(|p| !p.as_os_str().is_empty())
        .filter(|p| {
            let absolute = p.is_absolute();
            if !absolute {
                tracing::warn!(path = %p.display(), "ignoring relative path in TZPATH");
            }
            absolute
        })
        .collect()
}

fn parse_tz(value: &OsString) -> Option<String> {
    let value = value.to_str()?;
    // glibc allows a leading colon
    let id = value.strip_prefix(':').unwrap_or(value);
    (!id.is_empty()).then(|| id.to_string())
}
