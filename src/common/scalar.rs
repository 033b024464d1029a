//! Scalar types for offsets, instants and calendar fields.
//!
//! All offsets and instants are expressed in milliseconds.
use std::fmt;
use std::num::NonZeroU16;
use std::ops::Neg;

pub(crate) const MS_PER_SEC: i32 = 1_000;
pub(crate) const MS_PER_HOUR: i32 = 3_600 * MS_PER_SEC;
pub(crate) const MS_PER_DAY: i32 = 24 * MS_PER_HOUR;

/// Offset from UTC in milliseconds, strictly within +/- 24 hours.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Offset(i32);

impl Offset {
    pub const ZERO: Offset = Offset(0);
    pub const MIN: Offset = Offset(-MS_PER_DAY + 1);
    pub const MAX: Offset = Offset(MS_PER_DAY - 1);

    pub(crate) const fn new_unchecked(ms: i32) -> Self {
        debug_assert!(ms >= Self::MIN.0 && ms <= Self::MAX.0);
        Self(ms)
    }

    pub const fn new(ms: i32) -> Option<Self> {
        if ms >= Self::MIN.0 && ms <= Self::MAX.0 {
            Some(Self(ms))
        } else {
            None
        }
    }

    /// Create an offset from a whole number of seconds, as stored in TZif files
    /// and POSIX TZ strings.
    pub(crate) const fn from_secs(secs: i32) -> Option<Self> {
        match secs.checked_mul(MS_PER_SEC) {
            Some(ms) => Self::new(ms),
            None => None,
        }
    }

    pub(crate) fn clamp(ms: i64) -> Self {
        Self(ms.clamp(Self::MIN.0 as i64, Self::MAX.0 as i64) as i32)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    pub(crate) const fn shift(self, x: OffsetDelta) -> Option<Self> {
        // Safe since both arguments are constrained far below i32::MAX
        Self::new(self.0 + x.0)
    }

    pub(crate) fn saturating_shift(self, ms: i32) -> Self {
        Self::clamp(self.0 as i64 + ms as i64)
    }

    pub(crate) const fn sub(self, x: Self) -> OffsetDelta {
        OffsetDelta::new_unchecked(self.0 - x.0)
    }
}

impl Neg for Offset {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl TryFrom<i32> for Offset {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Offset::new(value).ok_or(())
    }
}

impl From<Offset> for i32 {
    fn from(x: Offset) -> Self {
        x.0
    }
}

impl fmt::Display for Offset {
    /// Format as `+hh:mm`, adding `:ss` and `.fff` only if needed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, ms) = if self.0 < 0 {
            ('-', -self.0)
        } else {
            ('+', self.0)
        };
        let secs = ms / MS_PER_SEC;
        write!(f, "{}{:02}:{:02}", sign, secs / 3_600, (secs % 3_600) / 60)?;
        match (secs % 60, ms % MS_PER_SEC) {
            (0, 0) => Ok(()),
            (s, 0) => write!(f, ":{s:02}"),
            (s, frac) => write!(f, ":{s:02}.{frac:03}"),
        }
    }
}

/// Difference between two offsets in milliseconds. +/- 48 hours
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd)]
pub(crate) struct OffsetDelta(i32);

impl OffsetDelta {
    pub(crate) const MIN: OffsetDelta = OffsetDelta(-2 * MS_PER_DAY);
    pub(crate) const MAX: OffsetDelta = OffsetDelta(2 * MS_PER_DAY);

    pub(crate) const fn new_unchecked(ms: i32) -> Self {
        debug_assert!(ms >= Self::MIN.0 && ms <= Self::MAX.0);
        Self(ms)
    }

    pub(crate) const fn get(self) -> i32 {
        self.0
    }
}

/// Milliseconds since the Unix epoch, bounded to the years 1..=9999.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct EpochMillis(i64);

impl EpochMillis {
    /// 0001-01-01T00:00:00Z
    pub const MIN: EpochMillis = EpochMillis(-62_135_596_800_000);
    /// 9999-12-31T23:59:59.999Z
    pub const MAX: EpochMillis = EpochMillis(253_402_300_799_999);

    pub const fn new(ms: i64) -> Option<Self> {
        if ms >= Self::MIN.0 && ms <= Self::MAX.0 {
            Some(Self(ms))
        } else {
            None
        }
    }

    pub(crate) const fn new_unchecked(ms: i64) -> Self {
        debug_assert!(ms >= Self::MIN.0 && ms <= Self::MAX.0);
        Self(ms)
    }

    /// Create an instant, saturating at the supported boundaries.
    pub fn clamp(ms: i64) -> Self {
        Self(ms.clamp(Self::MIN.0, Self::MAX.0))
    }

    /// TZif transition times are seconds, and may lie far outside our range
    /// (e.g. the "big bang" sentinel of -2^59).
    pub(crate) fn from_secs_clamped(secs: i64) -> Self {
        Self::clamp(secs.saturating_mul(MS_PER_SEC as i64))
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    pub(crate) fn saturating_offset(self, x: Offset) -> Self {
        Self::clamp(self.0 + x.get() as i64)
    }

    pub(crate) fn saturating_add_i32(self, x: i32) -> Self {
        // Safe since both arguments are constrained far below i64::MIN/MAX
        Self::clamp(self.0 + x as i64)
    }

    pub(crate) fn as_days(self) -> UnixDays {
        UnixDays::new_unchecked(self.0.div_euclid(MS_PER_DAY as i64) as _)
    }

    pub(crate) fn date(self) -> crate::date::Date {
        self.as_days().date()
    }
}

/// Number of days since 1970-01-01
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct UnixDays(i32);

impl UnixDays {
    // 0001-01-01 to 9999-12-31
    pub(crate) const MIN: UnixDays = UnixDays(-719_162);
    pub(crate) const MAX: UnixDays = UnixDays(2_932_896);

    pub(crate) fn new_unchecked(days: i32) -> Self {
        debug_assert!((Self::MIN.0..=Self::MAX.0).contains(&days));
        Self(days)
    }

    pub(crate) const fn get(self) -> i32 {
        self.0
    }

    // The Neri-Schneider algorithm
    // From https://github.com/cassioneri/eaf/blob/
    // 684d3cc32d14eee371d0abe4f683d6d6a49ed5c1/algorithms/
    // neri_schneider.hpp#L40C3-L40C34
    // under the MIT license
    pub(crate) fn date(self) -> crate::date::Date {
        // Shift and correction constants.
        const S: u32 = 82;
        const K: u32 = 719468 + 146097 * S;
        const L: u32 = 400 * S;
        // Rata die shift.
        let n = (self.0 as u32).wrapping_add(K);

        // Century.
        let n_1 = 4 * n + 3;
        let c = n_1 / 146097;
        let n_c = n_1 % 146097 / 4;

        // Year.
        let n_2 = 4 * n_c + 3;
        let p_2 = 2939745 * n_2 as u64;
        let z = (p_2 / 4294967296) as u32;
        let n_y = (p_2 % 4294967296) as u32 / 2939745 / 4;
        let y = 100 * c + z;

        // Month and day.
        let n_3 = 2141 * n_y + 197913;
        let m = n_3 / 65536;
        let d = n_3 % 65536 / 2141;

        // Map. (Notice the year correction, including type change.)
        let j = n_y >= 306;
        let y_g = y.wrapping_sub(L).wrapping_add(j as u32);
        let m_g = if j { m - 12 } else { m };
        let d_g = d + 1;
        crate::date::Date {
            // So long as unix days are in range, the date is valid
            year: Year::new_unchecked(y_g as _),
            month: Month::new_unchecked(m_g as _),
            day: d_g as _,
        }
    }

    pub(crate) fn add_unchecked(self, days: i32) -> Self {
        Self(self.0 + days)
    }

    /// The instant at the start of this day (UTC)
    pub(crate) fn epoch(self) -> EpochMillis {
        // Safe: result is always within bounds
        EpochMillis::new_unchecked(self.0 as i64 * MS_PER_DAY as i64)
    }

    pub(crate) fn day_of_week(self) -> Weekday {
        Weekday::from_iso_unchecked(((self.get() + 3).rem_euclid(7) + 1) as _)
    }
}

const MAX_MONTH_DAYS: [[u8; 13]; 2] = [
    // non-leap year
    [
        0, // 1-indexed
        31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31,
    ],
    // leap year
    [
        0, // 1-indexed
        31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31,
    ],
];
const DAYS_BEFORE_MONTH: [[u16; 13]; 2] = [
    // non-leap years
    [
        0, // 1-indexed
        0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334,
    ],
    // leap years
    [
        0, // 1-indexed
        0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335,
    ],
];

/// A year of the common era, 1..=9999
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(NonZeroU16);

impl Year {
    pub const MIN: Year = Year(NonZeroU16::MIN);
    pub const MAX: Year = Year(match NonZeroU16::new(9999) {
        Some(y) => y,
        None => NonZeroU16::MIN,
    });

    pub const fn new(year: u16) -> Option<Self> {
        if year <= Year::MAX.get() {
            match NonZeroU16::new(year) {
                Some(year) => Some(Self(year)),
                None => None,
            }
        } else {
            None
        }
    }

    pub(crate) const fn new_unchecked(year: u16) -> Self {
        debug_assert!(year >= Year::MIN.get() && year <= Year::MAX.get());
        match NonZeroU16::new(year) {
            Some(year) => Self(year),
            None => Self::MIN,
        }
    }

    /// Clamp an arbitrary year into the supported range
    pub(crate) fn saturating(y: i32) -> Self {
        Self::new_unchecked(y.clamp(Year::MIN.get().into(), Year::MAX.get().into()) as u16)
    }

    pub const fn get(self) -> u16 {
        self.0.get()
    }

    pub const fn is_leap(self) -> bool {
        (self.get() % 4 == 0 && self.get() % 100 != 0) || self.get() % 400 == 0
    }

    pub(crate) fn unix_days_at_jan1(self) -> UnixDays {
        UnixDays::new_unchecked(self.days_before() + UnixDays::MIN.get())
    }

    pub const fn days_in_month(self, month: Month) -> u8 {
        MAX_MONTH_DAYS[self.is_leap() as usize][month as usize]
    }

    pub(crate) const fn days_before_month(self, month: Month) -> u16 {
        DAYS_BEFORE_MONTH[self.is_leap() as usize][month as usize]
    }

    pub(crate) const fn days_before(self) -> i32 {
        let y = (self.get() - 1) as i32;
        y * 365 + y / 4 - y / 100 + y / 400
    }
}

impl TryFrom<u16> for Year {
    type Error = ();

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Year::new(value).ok_or(())
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    January = 1,
    February = 2,
    March = 3,
    April = 4,
    May = 5,
    June = 6,
    July = 7,
    August = 8,
    September = 9,
    October = 10,
    November = 11,
    December = 12,
}

impl Month {
    pub const fn new(n: u8) -> Option<Self> {
        if n >= 1 && n <= 12 {
            Some(Self::new_unchecked(n))
        } else {
            None
        }
    }

    pub(crate) const fn new_unchecked(n: u8) -> Self {
        debug_assert!(n >= 1 && n <= 12);
        // Safety: Month is repr(u8)
        unsafe { std::mem::transmute(n) }
    }

    pub const fn get(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Month {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Month::new(value).ok_or(())
    }
}

/// Weekday according to ISO numbering
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

impl Weekday {
    pub const fn from_iso(n: u8) -> Option<Self> {
        if n >= 1 && n <= 7 {
            Some(Self::from_iso_unchecked(n))
        } else {
            None
        }
    }

    pub(crate) const fn from_iso_unchecked(n: u8) -> Self {
        debug_assert!(n >= 1 && n <= 7);
        // Safety: Weekday is repr(u8)
        unsafe { std::mem::transmute(n) }
    }

    pub const fn iso(self) -> u8 {
        self as u8
    }

    pub(crate) const fn sunday_is_0(self) -> u8 {
        self.iso() % 7
    }
}

/// Era of a civil calendar point
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Era {
    /// Before the common era. Daylight saving time never applies.
    BC,
    AD,
}
