//! Zones backed by a TZif file on disk
use crate::tz::{
    tzif::{self, ErrorCause, TZif},
    zone::{Zone, ZoneKind},
};
use std::{fs, io, path::Path};

/// A decoded TZif file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileZone {
    tzif: TZif,
}

impl FileZone {
    /// Read and decode the file at `path`, registering it as `id`.
    pub fn load(path: impl AsRef<Path>, id: impl Into<String>) -> Result<Zone, LoadError> {
        let bytes = fs::read(path)?;
        Ok(Zone::new(id, ZoneKind::File(Self::from_bytes(&bytes)?)))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ErrorCause> {
        tzif::parse(bytes).map(|tzif| Self { tzif })
    }

    pub(crate) fn tzif(&self) -> &TZif {
        &self.tzif
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read zone file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid zone file: {0}")]
    Decode(#[from] ErrorCause),
}
