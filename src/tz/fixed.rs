//! Zones with a constant standard offset and an optional
//! yearly daylight saving rule.
use crate::common::scalar::*;
use crate::tz::posix::{self, Dst, MAX_TRANSITION_TIME, Rule, RuleSet, TransitionTime};
use std::num::NonZeroU8;

/// One end of a daylight saving period: e.g. "the last Sunday of October at 02:00".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    month: Month,
    // 1..=5, where 5 means the last occurrence
    week: NonZeroU8,
    from_end: bool,
    weekday: Weekday,
    time: TransitionTime,
}

impl Transition {
    /// Create a transition on the `ordinal`-th `weekday` of `month`, at
    /// `time` milliseconds after midnight. A negative ordinal counts from
    /// the end of the month, so `-1` is the last occurrence.
    pub fn new(month: u8, ordinal: i8, weekday: Weekday, time: i32) -> Result<Self, RuleError> {
        let month = Month::new(month).ok_or(RuleError::Month(month))?;
        if ordinal == 0 || !(-5..=5).contains(&ordinal) {
            return Err(RuleError::Ordinal(ordinal));
        }
        if !(-MAX_TRANSITION_TIME..=MAX_TRANSITION_TIME).contains(&time) {
            return Err(RuleError::Time(time));
        }
        Ok(Self::new_unchecked(month, ordinal, weekday, time))
    }

    pub(crate) const fn new_unchecked(
        month: Month,
        ordinal: i8,
        weekday: Weekday,
        time: TransitionTime,
    ) -> Self {
        Self {
            month,
            week: match NonZeroU8::new(ordinal.unsigned_abs()) {
                Some(n) => n,
                None => NonZeroU8::MIN,
            },
            from_end: ordinal < 0,
            weekday,
            time,
        }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn ordinal(&self) -> i8 {
        let n = self.week.get() as i8;
        if self.from_end { -n } else { n }
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn time(&self) -> i32 {
        self.time
    }

    fn rule(self) -> Rule {
        let Self {
            month,
            week,
            from_end,
            weekday,
            ..
        } = self;
        // A fifth occurrence doesn't always exist. The outermost one is used instead.
        match (from_end, week.get()) {
            (false, 5) => Rule::NthLastWeekday(NonZeroU8::MIN, weekday, month),
            (true, 5) => Rule::NthWeekday(NonZeroU8::MIN, weekday, month),
            (false, _) => Rule::NthWeekday(week, weekday, month),
            (true, _) => Rule::NthLastWeekday(week, weekday, month),
        }
    }
}

/// A yearly daylight saving period. The start time is local standard time,
/// the end time is local daylight time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DaylightRule {
    start: Transition,
    end: Transition,
    savings: i32,
}

impl DaylightRule {
    pub fn new(start: Transition, end: Transition) -> Self {
        Self::new_unchecked(start, end, posix::DEFAULT_DST.get())
    }

    /// Build a rule from its eight fields, with one hour of savings
    #[allow(clippy::too_many_arguments)]
    pub fn from_fields(
        start_month: u8,
        start_ordinal: i8,
        start_weekday: Weekday,
        start_time: i32,
        end_month: u8,
        end_ordinal: i8,
        end_weekday: Weekday,
        end_time: i32,
    ) -> Result<Self, RuleError> {
        Ok(Self::new(
            Transition::new(start_month, start_ordinal, start_weekday, start_time)?,
            Transition::new(end_month, end_ordinal, end_weekday, end_time)?,
        ))
    }

    /// Replace the amount of daylight savings (in milliseconds)
    pub fn with_savings(self, savings: i32) -> Result<Self, RuleError> {
        if savings == 0 || Offset::new(savings).is_none() {
            return Err(RuleError::Savings(savings));
        }
        Ok(Self { savings, ..self })
    }

    pub(crate) const fn new_unchecked(start: Transition, end: Transition, savings: i32) -> Self {
        Self {
            start,
            end,
            savings,
        }
    }

    pub fn start(&self) -> Transition {
        self.start
    }

    pub fn end(&self) -> Transition {
        self.end
    }

    pub fn savings(&self) -> i32 {
        self.savings
    }

    fn dst(self, std: Offset) -> Option<Dst> {
        Some(Dst {
            offset: std.shift(OffsetDelta::new_unchecked(self.savings))?,
            start: (self.start.rule(), self.start.time),
            end: (self.end.rule(), self.end.time),
        })
    }
}

/// A zone with a constant standard offset and optional daylight saving rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedZone {
    rules: RuleSet,
}

impl FixedZone {
    /// Create a zone from its standard offset in milliseconds
    pub fn new(raw_offset: i32, rule: Option<DaylightRule>) -> Result<Self, RuleError> {
        let std = Offset::new(raw_offset).ok_or(RuleError::RawOffset(raw_offset))?;
        let dst = rule
            .map(|r| {
                r.dst(std)
                    .ok_or(RuleError::DaylightOffset(raw_offset.saturating_add(r.savings)))
            })
            .transpose()?;
        Ok(Self {
            rules: RuleSet::new(std, dst),
        })
    }

    pub(crate) fn new_unchecked(raw_offset: Offset, rule: Option<DaylightRule>) -> Self {
        Self {
            rules: RuleSet::new(raw_offset, rule.and_then(|r| r.dst(raw_offset))),
        }
    }

    pub(crate) const fn from_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub(crate) fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("month must be 1..=12, got {0}")]
    Month(u8),
    #[error("ordinal must be 1..=5 or -5..=-1, got {0}")]
    Ordinal(i8),
    #[error("transition time out of range: {0}ms")]
    Time(i32),
    #[error("daylight savings must be nonzero and within 24 hours, got {0}ms")]
    Savings(i32),
    #[error("raw offset must be within 24 hours, got {0}ms")]
    RawOffset(i32),
    #[error("daylight offset must be within 24 hours, got {0}ms")]
    DaylightOffset(i32),
}
