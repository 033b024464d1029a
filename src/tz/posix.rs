//! Daylight saving time rule arithmetic, and parsing of POSIX TZ strings.
//! Note the parser includes the extensions to the POSIX standard used by the TZif format.
//!
//! Resources:
//! - [POSIX TZ strings](https://pubs.opengroup.org/onlinepubs/9699919799/basedefs/V1_chap08.html)
//! - [GNU libc manual](https://www.gnu.org/software/libc/manual/html_node/TZ-Variable.html)
use crate::{
    common::{ambiguity::Ambiguity, parse::Scan, scalar::*},
    date::Date,
};
use std::num::{NonZeroU8, NonZeroU16};

pub(crate) const DEFAULT_DST: OffsetDelta = OffsetDelta::new_unchecked(MS_PER_HOUR);

// RFC 9636: the transition time may range from -167 to 167 hours! (not just 24)
pub(crate) type TransitionTime = i32;
pub(crate) const MAX_TRANSITION_TIME: TransitionTime = 167 * MS_PER_HOUR;
const DEFAULT_RULE_TIME: TransitionTime = 2 * MS_PER_HOUR; // 2 AM

// POSIX strings only have second precision
const MAX_OFFSET_SECS: i32 = Offset::MAX.get() / MS_PER_SEC;

/// A standard offset with an optional recurring daylight saving time period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RuleSet {
    std: Offset,
    dst: Option<Dst>,
    // We don't store the TZ names since we don't use them (yet)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Dst {
    pub(crate) offset: Offset,
    // Start time is local standard time, end time is local daylight time
    pub(crate) start: (Rule, TransitionTime),
    pub(crate) end: (Rule, TransitionTime),
}

/// A rule for the date when DST starts or ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rule {
    NthWeekday(NonZeroU8, Weekday, Month),     // N is 1..=4
    NthLastWeekday(NonZeroU8, Weekday, Month), // N is 1..=4, 1 is the last
    DayOfYear(NonZeroU16),                     // 1..=366, accounts for leap days
    JulianDayOfYear(NonZeroU16),               // 1..=365, ignores leap days
}

impl RuleSet {
    pub(crate) const fn new(std: Offset, dst: Option<Dst>) -> Self {
        Self { std, dst }
    }

    pub(crate) const fn fixed(std: Offset) -> Self {
        Self { std, dst: None }
    }

    pub(crate) const fn std(&self) -> Offset {
        self.std
    }

    pub(crate) const fn has_dst(&self) -> bool {
        self.dst.is_some()
    }

    /// The amount added to the standard offset while DST is active
    pub(crate) fn savings(&self) -> i32 {
        self.dst.map_or(0, |dst| dst.offset.sub(self.std).get())
    }

    /// The same rules, with both offsets moved by the given amount
    pub(crate) fn shifted(self, ms: i32) -> Self {
        if ms == 0 {
            return self;
        }
        Self {
            std: self.std.saturating_shift(ms),
            dst: self.dst.map(|dst| Dst {
                offset: dst.offset.saturating_shift(ms),
                ..dst
            }),
        }
    }

    pub(crate) fn is_dst_at(&self, epoch: EpochMillis) -> bool {
        let Some(Dst {
            start: (start_rule, start_time),
            end: (end_rule, end_time),
            offset: dst_offset,
        }) = self.dst
        else {
            return false; // No DST rule means a fixed offset
        };
        // To determine the exact instant of DST start/end,
        // we need to know the *local* year.
        // However, this is theoretically difficult to determine
        // since we don't *strictly* know the if DST is active,
        // and thus what the offset should be.
        // However, in practice, we can assume that the year of
        // the transition isn't affected by the DST change.
        let year = epoch.saturating_offset(self.std).date().year;
        // Saturating to avoid overflow at the extreme MIN/MAX boundaries.
        let start = start_rule
            .for_year(year)
            .epoch()
            .saturating_add_i32(start_time - self.std.get());
        let end = end_rule
            .for_year(year)
            .epoch()
            .saturating_add_i32(end_time - dst_offset.get());

        // End may be before start (southern hemisphere)
        if start < end {
            start <= epoch && epoch < end
        } else {
            !(end <= epoch && epoch < start)
        }
    }

    pub(crate) fn offset_for_instant(&self, epoch: EpochMillis) -> Offset {
        match self.dst {
            Some(Dst { offset, .. }) if self.is_dst_at(epoch) => offset,
            _ => self.std,
        }
    }

    /// Get the offset for a local time, given as milliseconds since the Unix epoch.
    pub(crate) fn ambiguity_for_local(&self, t: EpochMillis) -> Ambiguity {
        match self.dst {
            None => Ambiguity::Unambiguous(self.std), // No DST
            Some(Dst {
                start: (start_rule, start_time),
                end: (end_rule, end_time),
                offset: dst,
            }) => {
                let year = t.date().year;
                let start = start_rule
                    .for_year(year)
                    .epoch()
                    .saturating_add_i32(start_time);
                let end = end_rule.for_year(year).epoch().saturating_add_i32(end_time);

                // Compensate for inverted DST setups (e.g. Australia)
                // to ensure the two transition points (t1, t2) are in order.
                let (t1, t2, off1, off2, shift) = if start < end {
                    (start, end, self.std, dst, dst.sub(self.std).get())
                } else {
                    (end, start, dst, self.std, self.std.sub(dst).get())
                };

                // Positive DST: first a gap, then a fold
                if shift >= 0 {
                    if t < t1 {
                        Ambiguity::Unambiguous(off1)
                    } else if t < t1.saturating_add_i32(shift) {
                        Ambiguity::Gap(off2, off1)
                    } else if t < t2.saturating_add_i32(-shift) {
                        Ambiguity::Unambiguous(off2)
                    } else if t < t2 {
                        Ambiguity::Fold(off2, off1)
                    } else {
                        Ambiguity::Unambiguous(off1)
                    }
                // Negative DST: first a fold, then a gap
                } else if t < t1.saturating_add_i32(shift) {
                    Ambiguity::Unambiguous(off1)
                } else if t < t1 {
                    Ambiguity::Fold(off1, off2)
                } else if t < t2 {
                    Ambiguity::Unambiguous(off2)
                } else if t < t2.saturating_add_i32(-shift) {
                    Ambiguity::Gap(off1, off2)
                } else {
                    Ambiguity::Unambiguous(off1)
                }
            }
        }
    }
}

impl Rule {
    pub(crate) fn for_year(self, y: Year) -> Date {
        match self {
            Rule::DayOfYear(d) => y
                .unix_days_at_jan1()
                // Safe: no overflow since it stays within the year
                .add_unchecked(
                    (d.get()
                        // The 366th day will blow up for non-leap years.
                        // It's unlikely that a TZ string would specify this,
                        // so we'll just clamp it to the last day of the year.
                        .min(365 + y.is_leap() as u16)
                        - 1) as _,
                )
                .date(),

            Rule::JulianDayOfYear(d) => y
                .unix_days_at_jan1()
                // Safe: No overflow since it stays within the year
                .add_unchecked((d.get() - 1) as i32 + (y.is_leap() && d.get() > 59) as i32)
                .date(),

            Self::NthLastWeekday(n, w, m) => {
                // Try the last day of the month, and adjust from there
                debug_assert!(n.get() <= 4);
                let day_last = Date::last_of_month(y, m);
                Date {
                    day: day_last.day
                        - (day_last.day_of_week().sunday_is_0() + 7 - w.sunday_is_0()) % 7
                        - 7 * (n.get() - 1),
                    ..day_last
                }
            }
            Self::NthWeekday(n, w, m) => {
                // Try the first day of the month, and adjust from there
                debug_assert!(n.get() <= 4);
                let day1 = Date::first_of_month(y, m);
                Date {
                    day: ((w.sunday_is_0() + 7 - day1.day_of_week().sunday_is_0()) % 7)
                        + 7 * (n.get() - 1)
                        + 1,
                    ..day1
                }
            }
        }
    }
}

pub(crate) fn parse(s: &[u8]) -> Option<RuleSet> {
    let mut scan = Scan::new(s);
    skip_tzname(&mut scan)?;
    let std = parse_offset(&mut scan)?;

    // If there's nothing else, it's a fixed offset without DST
    if scan.is_done() {
        return Some(RuleSet::fixed(std));
    };
    skip_tzname(&mut scan)?;

    let dst_offset = match scan.peek()? {
        // If the offset is omitted, the default is 1 hour ahead
        b',' => {
            scan.take_unchecked(1);
            // It's theoretically possible for this default shift to
            // bump the offset to over 24 hours. We reject these cases here.
            std.shift(DEFAULT_DST)?
        }
        // Otherwise, parse the offset
        _ => {
            let offset = parse_offset(&mut scan)?;
            scan.expect(b',')?;
            offset
        }
    };

    // Expect two rules separated by a comma
    let start = parse_rule(&mut scan)?;
    scan.expect(b',')?;
    let end = parse_rule(&mut scan)?;

    // No content should remain after parsing
    scan.is_done().then_some(RuleSet::new(
        std,
        Some(Dst {
            offset: dst_offset,
            start,
            end,
        }),
    ))
}

/// Skip the TZ name
fn skip_tzname(s: &mut Scan) -> Option<()> {
    let tzname = match s.peek() {
        Some(b'<') => {
            let name = s.take_until_inclusive(|c| c == b'>')?;
            &name[1..name.len() - 1]
        }
        _ => s.take_until(|c| matches!(c, b'+' | b'-' | b',' | b'0'..=b'9'))?,
    };
    (!tzname.is_empty() && tzname.is_ascii()).then_some(())
}

/// Parse an offset like `[+|-]h[h][:mm[:ss]]`
fn parse_offset(s: &mut Scan) -> Option<Offset> {
    parse_hms(s, MAX_OFFSET_SECS)
        // POSIX offsets are inverted from how we store them
        .map(|secs| Offset::new_unchecked(-secs * MS_PER_SEC))
}

/// Parse a `h[hh][:mm[:ss]]` string into a total number of seconds
fn parse_hms(s: &mut Scan, max: i32) -> Option<i32> {
    let sign = s
        .transform(|c| match c {
            b'+' => Some(1),
            b'-' => Some(-1),
            _ => None,
        })
        .unwrap_or(1);
    let mut total = 0;

    // parse the hours
    let hrs = if max > 99 * 3_600 {
        s.up_to_3_digits()? as i32
    } else {
        s.up_to_2_digits()? as i32
    };
    total += hrs * 3_600;

    // parse the optional minutes and seconds
    if let Some(true) = s.advance_on(b':') {
        total += s.digits00_59()? as i32 * 60;
        if let Some(true) = s.advance_on(b':') {
            total += s.digits00_59()? as i32;
        }
    }
    (total <= max).then_some(total * sign)
}

/// Parse `m[m].w.d` string as part of a DST start/end rule
fn parse_weekday_rule(scan: &mut Scan) -> Option<Rule> {
    let m = scan.up_to_2_digits().and_then(Month::new)?;
    scan.expect(b'.')?;
    let w = NonZeroU8::new(scan.digit_ranged(b'1'..=b'5')?)?;
    scan.expect(b'.')?;
    let d = scan.digit_ranged(b'0'..=b'6')?;
    // In Posix TZ strings, Sunday is 0. In ISO, it's 7
    let day_of_week = Weekday::from_iso_unchecked(if d == 0 { 7 } else { d });

    // A "fifth" occurrence of a weekday doesn't always occur.
    // Interpret it as the last weekday, according to the standard.
    Some(if w.get() == 5 {
        Rule::NthLastWeekday(NonZeroU8::MIN, day_of_week, m)
    } else {
        Rule::NthWeekday(w, day_of_week, m)
    })
}

fn parse_rule(scan: &mut Scan) -> Option<(Rule, TransitionTime)> {
    let rule = match scan.peek()? {
        b'M' => {
            scan.next();
            parse_weekday_rule(scan)
        }
        b'J' => {
            scan.next();
            NonZeroU16::new(scan.up_to_3_digits()?)
                .filter(|&d| d.get() <= 365)
                .map(Rule::JulianDayOfYear)
        }
        _ => NonZeroU16::new(scan.up_to_3_digits()? + 1)
            .filter(|&d| d.get() <= 366)
            .map(Rule::DayOfYear),
    }?;

    Some((
        rule,
        match scan.advance_on(b'/') {
            Some(true) => parse_hms(scan, MAX_TRANSITION_TIME / MS_PER_SEC)? * MS_PER_SEC,
            _ => DEFAULT_RULE_TIME,
        },
    ))
}
