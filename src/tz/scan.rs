//! Recursive discovery of TZif files under the configured search paths.
//!
//! Identifiers are the `/`-joined path relative to the search root,
//! e.g. `America/New_York`. Unreadable or invalid entries are skipped:
//! nothing here aborts the scan.
use crate::tz::{file::FileZone, store::Catalog};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, trace};

/// Outcome of a scan, for logging and diagnostics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    /// Zones loaded and inserted (including ones that replaced an earlier entry)
    pub registered: usize,
    /// Entries that were not zone files, or failed to load
    pub skipped: usize,
}

/// Scan each root in order, inserting every valid zone into the catalog.
/// Later entries replace earlier ones with the same identifier.
pub(crate) fn scan_roots(roots: &[PathBuf], catalog: &mut Catalog) -> ScanReport {
    let mut report = ScanReport::default();
    for root in roots {
        if root.is_dir() {
            scan_dir(root, None, catalog, &mut report);
        } else {
            debug!(root = %root.display(), "skipping missing zoneinfo root");
        }
    }
    report
}

fn scan_dir(dir: &Path, prefix: Option<&str>, catalog: &mut Catalog, report: &mut ScanReport) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), %err, "cannot list directory");
            report.skipped += 1;
            return;
        }
    };

    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                trace!(dir = %dir.display(), %err, "cannot read directory entry");
                report.skipped += 1;
                continue;
            }
        };
        let path = entry.path();
        // The entry's own type: links to directories are never followed
        let Ok(file_type) = entry.file_type() else {
            trace!(path = %path.display(), "cannot determine file type");
            report.skipped += 1;
            continue;
        };
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            trace!(path = %path.display(), "skipping non UTF-8 file name");
            report.skipped += 1;
            continue;
        };
        let id = match prefix {
            Some(prefix) => format!("{prefix}/{name}"),
            None => name,
        };
        if file_type.is_file() || (file_type.is_symlink() && links_to_file(&path)) {
            // Aliases like `UTC` or `US/Eastern` are usually links
            files.push((id, path));
        } else if file_type.is_dir() {
            subdirs.push((id, path));
        } else {
            trace!(path = %path.display(), "skipping directory link or special file");
            report.skipped += 1;
        }
    }

    for (id, path) in files {
        match FileZone::load(&path, id) {
            Ok(zone) => {
                trace!(id = zone.id(), "registered zone");
                catalog.insert(zone.id().to_owned(), Arc::new(zone));
                report.registered += 1;
            }
            Err(err) => {
                trace!(path = %path.display(), %err, "skipping invalid zone file");
                report.skipped += 1;
            }
        }
    }

    for (id, path) in subdirs {
        scan_dir(&path, Some(&id), catalog, report);
    }
}

fn links_to_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file())
}
