//! The time zone type shared by all registry entries.
//!
//! A zone is either defined by fixed rules (a standard offset and optional
//! yearly daylight saving period) or decoded from a TZif file. Both answer
//! the same queries:
//!
//! - the raw (standard) offset, which can be adjusted per instance;
//! - whether daylight saving time is observed, or active at an instant;
//! - the total offset at an instant, or at a civil calendar point.
//!
//! All offsets are in milliseconds.
use crate::{
    common::scalar::*,
    date::Date,
    tz::{file::FileZone, fixed::FixedZone, posix},
};
use std::{
    fmt,
    sync::atomic::{AtomicI32, Ordering},
};

#[derive(Debug)]
pub struct Zone {
    id: String,
    kind: ZoneKind,
    // Adjustment of the raw offset, set by `set_raw_offset`
    raw_shift: AtomicI32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneKind {
    Fixed(FixedZone),
    File(FileZone),
}

impl Zone {
    pub fn new(id: impl Into<String>, kind: ZoneKind) -> Self {
        Self {
            id: id.into(),
            kind,
            raw_shift: AtomicI32::new(0),
        }
    }

    pub fn fixed(id: impl Into<String>, zone: FixedZone) -> Self {
        Self::new(id, ZoneKind::Fixed(zone))
    }

    /// Create a fixed-rule zone from a POSIX TZ string like `"EST5EDT,M3.2.0,M11.1.0"`
    pub fn from_posix_tz(id: impl Into<String>, tz: &str) -> Option<Self> {
        posix::parse(tz.as_bytes()).map(|rules| Self::fixed(id, FixedZone::from_rules(rules)))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Relabel the zone. Only possible while it isn't shared.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn kind(&self) -> &ZoneKind {
        &self.kind
    }

    fn shift(&self) -> i32 {
        self.raw_shift.load(Ordering::Relaxed)
    }

    fn base_raw_offset(&self) -> Offset {
        match &self.kind {
            ZoneKind::Fixed(z) => z.rules().std(),
            ZoneKind::File(z) => z.tzif().raw_offset(),
        }
    }

    /// The standard offset, without daylight saving time
    pub fn raw_offset(&self) -> i32 {
        self.base_raw_offset().saturating_shift(self.shift()).get()
    }

    /// Change the standard offset of this instance. Daylight offsets move along,
    /// so the savings stay the same. Values beyond 24 hours are clamped.
    pub fn set_raw_offset(&self, ms: i32) {
        let target = Offset::clamp(ms.into());
        self.raw_shift
            .store(target.sub(self.base_raw_offset()).get(), Ordering::Relaxed);
    }

    pub fn observes_daylight(&self) -> bool {
        match &self.kind {
            ZoneKind::Fixed(z) => z.rules().has_dst(),
            ZoneKind::File(z) => z.tzif().observes_daylight(),
        }
    }

    pub fn is_daylight_active(&self, instant: EpochMillis) -> bool {
        match &self.kind {
            // Rule times are local, so they move along with the raw offset
            ZoneKind::Fixed(z) => z.rules().shifted(self.shift()).is_dst_at(instant),
            ZoneKind::File(z) => z.tzif().is_dst_at(instant),
        }
    }

    /// Amount added to the raw offset while daylight saving time is active
    pub fn dst_savings(&self) -> i32 {
        match &self.kind {
            ZoneKind::Fixed(z) => z.rules().savings(),
            ZoneKind::File(z) => z.tzif().dst_savings(),
        }
    }

    /// The total offset at the given instant
    pub fn offset_for_instant(&self, instant: EpochMillis) -> i32 {
        let shift = self.shift();
        let offset = match &self.kind {
            ZoneKind::Fixed(z) => z.rules().shifted(shift).offset_for_instant(instant),
            ZoneKind::File(z) => z
                .tzif()
                .offset_for_instant(instant)
                .saturating_shift(shift),
        };
        offset.get()
    }

    /// The total offset at a civil calendar point.
    ///
    /// For fixed-rule zones, `ms_of_day` is read as local standard time.
    /// For file-backed zones it's the wall clock time. Inside a gap or fold,
    /// the offset after the transition applies.
    /// The day is clamped to the month. The weekday is derived from the date,
    /// the given one is ignored.
    pub fn offset_at(
        &self,
        era: Era,
        year: i32,
        month: Month,
        day: u8,
        _weekday: Weekday,
        ms_of_day: i32,
    ) -> i32 {
        // No daylight saving time before the common era
        if era == Era::BC {
            return self.raw_offset();
        }
        let local = Date::saturating(Year::saturating(year), month, day)
            .epoch()
            .saturating_add_i32(ms_of_day);
        let shift = self.shift();
        let offset = match &self.kind {
            ZoneKind::Fixed(z) => {
                let rules = z.rules().shifted(shift);
                rules.offset_for_instant(local.saturating_offset(-rules.std()))
            }
            ZoneKind::File(z) => z
                .tzif()
                .ambiguity_for_local(local.saturating_add_i32(-shift))
                .after_transition()
                .saturating_shift(shift),
        };
        offset.get()
    }
}

impl Clone for Zone {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            kind: self.kind.clone(),
            raw_shift: AtomicI32::new(self.shift()),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
