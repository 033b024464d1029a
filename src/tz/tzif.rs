//! Decoder for the binary TZif format produced by `zic`.
//!
//! See [RFC 9636](https://datatracker.ietf.org/doc/html/rfc9636).
//! Only the fields needed to compute offsets are kept:
//! designations, leap seconds and the std/ut indicators are skipped.
use crate::common::{ambiguity::Ambiguity, parse::Scan, scalar::*};
use crate::tz::posix::{self, RuleSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TZif {
    // Read each entry (X, Y) as "from instant X onwards, the local type is Y".
    by_utc: Vec<(EpochMillis, LocalType)>,
    // For local -> UTC, transitions may be ambiguous and need extra information.
    by_local: Vec<LocalTransition>,
    // Applies before the first transition
    initial: LocalType,
    // Applies after the last transition. Absent in v1 files.
    end: Option<RuleSet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LocalType {
    pub(crate) offset: Offset,
    pub(crate) is_dst: bool,
}

/// A transition seen from the local clock. It starts at the earliest
/// wall time affected by the gap or fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LocalTransition {
    start: EpochMillis,
    before: Offset,
    after: Offset,
}

impl LocalTransition {
    fn ambiguity_at(self, t: EpochMillis) -> Option<Ambiguity> {
        // Gaps are positive, folds are negative
        let change = self.after.get() - self.before.get();
        (t < self.start.saturating_add_i32(change.abs())).then(|| {
            if change > 0 {
                Ambiguity::Gap(self.after, self.before)
            } else {
                Ambiguity::Fold(self.before, self.after)
            }
        })
    }
}

impl TZif {
    fn local_type_at(&self, t: EpochMillis) -> LocalType {
        let idx = self.by_utc.partition_point(|&(x, _)| x <= t);
        match &self.end {
            Some(end) if idx == self.by_utc.len() => LocalType {
                offset: end.offset_for_instant(t),
                is_dst: end.is_dst_at(t),
            },
            _ => idx
                .checked_sub(1)
                .map_or(self.initial, |i| self.by_utc[i].1),
        }
    }

    /// Get the UTC offset at the given moment in time
    pub(crate) fn offset_for_instant(&self, t: EpochMillis) -> Offset {
        self.local_type_at(t).offset
    }

    pub(crate) fn is_dst_at(&self, t: EpochMillis) -> bool {
        self.local_type_at(t).is_dst
    }

    /// Get the offset(s) for a local time, given as milliseconds since the Unix epoch.
    pub(crate) fn ambiguity_for_local(&self, t: EpochMillis) -> Ambiguity {
        let idx = self.by_local.partition_point(|tr| tr.start <= t);
        let prev = idx.checked_sub(1).map(|i| self.by_local[i]);
        if let Some(ambiguity) = prev.and_then(|tr| tr.ambiguity_at(t)) {
            return ambiguity;
        }
        match &self.end {
            Some(end) if idx == self.by_local.len() => end.ambiguity_for_local(t),
            _ => Ambiguity::Unambiguous(prev.map_or(self.initial.offset, |tr| tr.after)),
        }
    }

    #[cfg(test)]
    pub(crate) fn footer(&self) -> Option<&RuleSet> {
        self.end.as_ref()
    }

    fn last_type_where(&self, is_dst: bool) -> Option<Offset> {
        self.by_utc
            .iter()
            .rev()
            .find(|(_, t)| t.is_dst == is_dst)
            .map(|(_, t)| t.offset)
    }

    /// The standard offset currently in use
    pub(crate) fn raw_offset(&self) -> Offset {
        match &self.end {
            Some(end) => end.std(),
            None => self.last_type_where(false).unwrap_or(self.initial.offset),
        }
    }

    pub(crate) fn observes_daylight(&self) -> bool {
        match &self.end {
            Some(end) => end.has_dst(),
            None => self.by_utc.iter().any(|(_, t)| t.is_dst),
        }
    }

    pub(crate) fn dst_savings(&self) -> i32 {
        match &self.end {
            Some(end) => end.savings(),
            None => self
                .last_type_where(true)
                .map_or(0, |dst| dst.get() - self.raw_offset().get()),
        }
    }
}

pub(crate) fn parse(s: &[u8]) -> ParseResult<TZif> {
    let mut scan = Scan::new(s);
    let header = parse_header(&mut scan)?;
    if header.version == 1 {
        let block = parse_block(header, TimeSize::V1, &mut scan)?;
        return Ok(block.finish(None));
    }
    // The v1 block is kept for old readers. Skip it.
    scan.take(header.block_len(TimeSize::V1))
        .ok_or(ErrorCause::Body)?;
    // This "second" header is not the same as the first one
    let header = parse_header(&mut scan)?;
    let block = parse_block(header, TimeSize::V2, &mut scan)?;
    let end = parse_footer(&mut scan)?;
    Ok(block.finish(end))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeSize {
    V1 = 4,
    V2 = 8,
}

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
struct Header {
    version: u8,
    isutcnt: usize,
    isstdcnt: usize,
    leapcnt: usize,
    timecnt: usize,
    typecnt: usize,
    charcnt: usize,
}

impl Header {
    fn block_len(&self, size: TimeSize) -> usize {
        let size = size as usize;
        self.timecnt * size
            + self.timecnt
            + self.typecnt * 6
            + self.charcnt
            + self.leapcnt * (size + 4)
            + self.isstdcnt
            + self.isutcnt
    }
}

fn parse_version(s: &mut Scan) -> Option<u8> {
    let version = match s.next()? {
        0 => 1,
        n @ b'2'..=b'4' => n - b'0',
        _ => None?,
    };
    // Reserved for future use
    s.take(15)?;
    Some(version)
}

fn parse_header(s: &mut Scan) -> ParseResult<Header> {
    if s.take(4) != Some(b"TZif") {
        return Err(ErrorCause::MagicValue);
    }
    let version = parse_version(s).ok_or(ErrorCause::Version)?;
    let mut count = || s.be_u32().map(|n| n as usize).ok_or(ErrorCause::Body);
    Ok(Header {
        version,
        isutcnt: count()?,
        isstdcnt: count()?,
        leapcnt: count()?,
        timecnt: count()?,
        typecnt: count()?,
        charcnt: count()?,
    })
}

struct Block {
    transitions: Vec<(EpochMillis, LocalType)>,
    initial: LocalType,
}

impl Block {
    fn finish(self, end: Option<RuleSet>) -> TZif {
        TZif {
            by_local: local_transitions(self.initial.offset, &self.transitions),
            by_utc: self.transitions,
            initial: self.initial,
            end,
        }
    }
}

fn parse_block(header: Header, size: TimeSize, s: &mut Scan) -> ParseResult<Block> {
    // Check the length up front, so bogus counts can't trigger huge allocations
    if header.typecnt == 0 || s.rest().len() < header.block_len(size) {
        return Err(ErrorCause::Body);
    }
    let times = parse_transition_times(header.timecnt, size, s)?;
    let indices = s.take(header.timecnt).ok_or(ErrorCause::Body)?;
    let types = parse_local_types(header.typecnt, s)?;
    // Skip designations, leap second records, and the indicators
    s.take(
        header.charcnt
            + header.leapcnt * (size as usize + 4)
            + header.isstdcnt
            + header.isutcnt,
    )
    .ok_or(ErrorCause::Body)?;

    let mut transitions = Vec::with_capacity(header.timecnt);
    for (&secs, &idx) in times.iter().zip(indices) {
        let &local = types.get(usize::from(idx)).ok_or(ErrorCause::Body)?;
        transitions.push((EpochMillis::from_secs_clamped(secs), local));
    }
    Ok(Block {
        transitions,
        // Type 0 applies before the first transition
        initial: types[0],
    })
}

fn parse_transition_times(n: usize, size: TimeSize, s: &mut Scan) -> ParseResult<Vec<i64>> {
    let mut result = Vec::with_capacity(n);
    for _ in 0..n {
        let secs = match size {
            TimeSize::V1 => s.be_i32().map(i64::from),
            TimeSize::V2 => s.be_i64(),
        }
        .ok_or(ErrorCause::Body)?;
        result.push(secs);
    }
    // Lookups rely on the transitions being sorted
    if result.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ErrorCause::Body);
    }
    Ok(result)
}

fn parse_local_types(n: usize, s: &mut Scan) -> ParseResult<Vec<LocalType>> {
    let mut result = Vec::with_capacity(n);
    for _ in 0..n {
        let utoff = s.be_i32().ok_or(ErrorCause::Body)?;
        let [isdst, _desigidx] = s.take_array().ok_or(ErrorCause::Body)?;
        result.push(LocalType {
            offset: Offset::from_secs(utoff).ok_or(ErrorCause::Body)?,
            is_dst: match isdst {
                0 => false,
                1 => true,
                _ => Err(ErrorCause::Body)?,
            },
        });
    }
    Ok(result)
}

fn parse_footer(s: &mut Scan) -> ParseResult<Option<RuleSet>> {
    if s.is_done() {
        return Ok(None);
    }
    s.expect(b'\n').ok_or(ErrorCause::TzString)?;
    let tz_str = s
        .take_until(|b| b == b'\n')
        .ok_or(ErrorCause::TzString)?;
    if tz_str.is_empty() {
        return Ok(None);
    }
    posix::parse(tz_str).map(Some).ok_or(ErrorCause::TzString)
}

fn local_transitions(initial: Offset, transitions: &[(EpochMillis, LocalType)]) -> Vec<LocalTransition> {
    let mut result = Vec::with_capacity(transitions.len());
    let mut before = initial;
    for &(epoch, LocalType { offset: after, .. }) in transitions {
        // NOTE: we don't check for "impossible" gaps or folds
        result.push(LocalTransition {
            start: epoch.saturating_offset(before.min(after)),
            before,
            after,
        });
        before = after;
    }
    result
}

#[derive(Debug, Clone, PartialEq, Eq, Copy, thiserror::Error)]
pub enum ErrorCause {
    #[error("Invalid magic value")]
    MagicValue,
    #[error("Invalid header")]
    Version,
    #[error("Invalid or corrupted data")]
    Body,
    #[error("Invalid POSIX TZ string")]
    TzString,
}

type ParseResult<T> = Result<T, ErrorCause>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tz::testing::TzifBuilder;

    const T_A: i64 = -1_000_000_000;
    const T_B: i64 = 1_679_792_400; // 2023-03-26 01:00 UTC
    const T_C: i64 = 1_698_541_200; // 2023-10-29 01:00 UTC

    fn secs(s: i64) -> EpochMillis {
        EpochMillis::new(s * 1_000).unwrap()
    }

    fn off(s: i32) -> Offset {
        Offset::from_secs(s).unwrap()
    }

    /// Roughly Central European time, with local mean time before 1938
    fn europe() -> TzifBuilder {
        TzifBuilder::new()
            .local_type(1_200, false)
            .local_type(3_600, false)
            .local_type(7_200, true)
            .transition(T_A, 1)
            .transition(T_B, 2)
            .transition(T_C, 1)
            .footer("CET-1CEST,M3.5.0,M10.5.0/3")
    }

    #[test]
    fn test_no_magic_header() {
        // empty
        assert_eq!(parse(b"").unwrap_err(), ErrorCause::MagicValue);
        // too small
        assert_eq!(parse(b"TZi").unwrap_err(), ErrorCause::MagicValue);
        // wrong magic value
        assert_eq!(
            parse(b"this-is-not-tzif-file").unwrap_err(),
            ErrorCause::MagicValue
        );
    }

    #[test]
    fn test_invalid_version() {
        for v in [b'1', b'5', b'x'] {
            let bytes = TzifBuilder::new().version(v).local_type(0, false).build();
            assert_eq!(parse(&bytes).unwrap_err(), ErrorCause::Version);
        }
        // Header cut off
        assert_eq!(parse(b"TZif2").unwrap_err(), ErrorCause::Version);
    }

    #[test]
    fn test_corrupt_body() {
        // No local types
        let bytes = TzifBuilder::new().build();
        assert_eq!(parse(&bytes).unwrap_err(), ErrorCause::Body);
        // Index out of range
        let bytes = TzifBuilder::new()
            .local_type(0, false)
            .transition(0, 1)
            .build();
        assert_eq!(parse(&bytes).unwrap_err(), ErrorCause::Body);
        // Unsorted transitions
        let bytes = TzifBuilder::new()
            .local_type(0, false)
            .transition(10, 0)
            .transition(5, 0)
            .build();
        assert_eq!(parse(&bytes).unwrap_err(), ErrorCause::Body);
        // Truncated
        let bytes = europe().build();
        for len in [44, 60, bytes.len() - 40] {
            assert_eq!(
                parse(&bytes[..len]).unwrap_err(),
                ErrorCause::Body,
                "len={len}"
            );
        }
        // Offset of a whole day
        let bytes = TzifBuilder::new().local_type(86_400, false).build();
        assert_eq!(parse(&bytes).unwrap_err(), ErrorCause::Body);
    }

    #[test]
    fn test_invalid_footer() {
        let bytes = TzifBuilder::new()
            .local_type(0, false)
            .footer("not-a-tz-string")
            .build();
        assert_eq!(parse(&bytes).unwrap_err(), ErrorCause::TzString);
    }

    #[test]
    fn test_utc() {
        let tzif = parse(&TzifBuilder::new().local_type(0, false).footer("UTC0").build()).unwrap();
        assert!(tzif.by_utc.is_empty());
        assert_eq!(tzif.footer(), posix::parse(b"UTC0").as_ref());

        assert_eq!(tzif.offset_for_instant(secs(2216250001)), Offset::ZERO);
        assert_eq!(
            tzif.ambiguity_for_local(secs(2216250000)),
            Ambiguity::Unambiguous(Offset::ZERO)
        );
        assert_eq!(tzif.raw_offset(), Offset::ZERO);
        assert!(!tzif.observes_daylight());
        assert_eq!(tzif.dst_savings(), 0);
    }

    #[test]
    fn test_fixed() {
        let bytes = TzifBuilder::new()
            .local_type(13 * 3_600, false)
            .footer("<+13>-13")
            .build();
        let tzif = parse(&bytes).unwrap();
        assert_eq!(tzif.footer(), posix::parse(b"<+13>-13").as_ref());

        assert_eq!(tzif.offset_for_instant(secs(2216250001)), off(13 * 3_600));
        assert_eq!(
            tzif.ambiguity_for_local(secs(2216250000)),
            Ambiguity::Unambiguous(off(13 * 3_600))
        )
    }

    #[test]
    fn test_empty_footer() {
        let bytes = TzifBuilder::new()
            .version(b'3')
            .local_type(-3_600, false)
            .footer("")
            .build();
        let tzif = parse(&bytes).unwrap();
        assert_eq!(tzif.footer(), None);
        assert_eq!(tzif.offset_for_instant(secs(0)), off(-3_600));
    }

    #[test]
    fn test_europe() {
        let tzif = parse(&europe().with_leap_records(2).build()).unwrap();
        assert_eq!(
            tzif.footer(),
            posix::parse(b"CET-1CEST,M3.5.0,M10.5.0/3").as_ref()
        );
        assert_eq!(tzif.raw_offset(), off(3_600));
        assert!(tzif.observes_daylight());
        assert_eq!(tzif.dst_savings(), 3_600_000);

        let utc_cases = &[
            // before the entire range
            (-2_000_000_000, 1_200),
            // The first transition
            (T_A - 1, 1_200),
            (T_A, 3_600),
            (T_A + 1, 3_600),
            // Arbitrary transition (gap)
            (T_B - 1, 3_600),
            (T_B, 7_200),
            // The last explicit transition (fold)
            (T_C - 1, 7_200),
            (T_C, 3_600),
            (T_C + 1, 3_600),
            // Transitions after the last explicit one need to use the POSIX TZ string
            (1_711_846_799, 3_600),
            (1_711_846_800, 7_200),
            (2216249999, 3600),
            (2216250000, 7200),
            (2645053199, 7200),
            (2645053200, 3600),
        ];

        for &(t, expected) in utc_cases {
            assert_eq!(tzif.offset_for_instant(secs(t)), off(expected), "t={t}");
        }
        assert!(!tzif.is_dst_at(secs(T_C)));
        assert!(tzif.is_dst_at(secs(T_C - 1)));
        assert!(tzif.is_dst_at(secs(1_711_846_800)));

        let local_cases = &[
            // before the entire range
            (-2_000_000_000, Ambiguity::Unambiguous(off(1_200))),
            // --- The first transition (a gap of 40 minutes) ---
            (T_A + 1_199, Ambiguity::Unambiguous(off(1_200))),
            (T_A + 1_200, Ambiguity::Gap(off(3_600), off(1_200))),
            (T_A + 3_599, Ambiguity::Gap(off(3_600), off(1_200))),
            (T_A + 3_600, Ambiguity::Unambiguous(off(3_600))),
            // --- A "gap" transition ---
            (T_B + 3_599, Ambiguity::Unambiguous(off(3_600))),
            (T_B + 3_600, Ambiguity::Gap(off(7_200), off(3_600))),
            (T_B + 7_199, Ambiguity::Gap(off(7_200), off(3_600))),
            (T_B + 7_200, Ambiguity::Unambiguous(off(7_200))),
            // --- The last "fold" transition ---
            (T_C + 3_599, Ambiguity::Unambiguous(off(7_200))),
            (T_C + 3_600, Ambiguity::Fold(off(7_200), off(3_600))),
            (T_C + 7_199, Ambiguity::Fold(off(7_200), off(3_600))),
            (T_C + 7_200, Ambiguity::Unambiguous(off(3_600))),
            // ---- After the last explicit transition
            // before gap
            (1_711_846_799 + 3_600, Ambiguity::Unambiguous(off(3_600))),
            // gap starts
            (1_711_846_800 + 3_600, Ambiguity::Gap(off(7_200), off(3_600))),
            // gap ends
            (1_711_846_800 + 7_200, Ambiguity::Unambiguous(off(7_200))),
            // Fold starts
            (2645056800, Ambiguity::Fold(off(7_200), off(3_600))),
            // In the fold
            (2645056940, Ambiguity::Fold(off(7_200), off(3_600))),
            // end of the fold
            (2645056800 + 3600, Ambiguity::Unambiguous(off(3_600))),
        ];

        for &(t, expected) in local_cases {
            assert_eq!(tzif.ambiguity_for_local(secs(t)), expected, "t={t}");
        }
    }

    #[test]
    fn test_v1() {
        let bytes = TzifBuilder::new()
            .version(0)
            .local_type(-18_000, false)
            .local_type(-14_400, true)
            .transition(1_000, 1)
            .transition(2_000, 0)
            .transition(3_000, 1)
            .build();
        let tzif = parse(&bytes).unwrap();
        assert_eq!(tzif.footer(), None);
        assert_eq!(tzif.offset_for_instant(secs(999)), off(-18_000));
        assert_eq!(tzif.offset_for_instant(secs(2_500)), off(-18_000));
        // The last type persists
        assert_eq!(tzif.offset_for_instant(secs(1_000_000)), off(-14_400));
        assert_eq!(
            tzif.ambiguity_for_local(secs(1_000_000)),
            Ambiguity::Unambiguous(off(-14_400))
        );
        assert_eq!(tzif.raw_offset(), off(-18_000));
        assert!(tzif.observes_daylight());
        assert_eq!(tzif.dst_savings(), 3_600_000);
    }

    #[test]
    fn test_far_out_transitions_saturate() {
        // The "big bang" sentinel used by zic
        let bytes = TzifBuilder::new()
            .local_type(0, false)
            .local_type(3_600, false)
            .transition(-(1 << 59), 1)
            .build();
        let tzif = parse(&bytes).unwrap();
        assert_eq!(tzif.offset_for_instant(EpochMillis::MIN), off(3_600));
        assert_eq!(tzif.offset_for_instant(EpochMillis::MAX), off(3_600));
    }

    /// Smoke test to see we don't crash parsing any TZif files in the tzdata database.
    /// It doesn't actually check whether the parsing is correct,
    /// but will give a good indication if the parser is robust.
    #[test]
    fn smoke_test() {
        const TZDIR: &str = "/usr/share/zoneinfo";
        for entry in walkdir::WalkDir::new(TZDIR)
            .into_iter()
            .filter_map(Result::ok)
        {
            let path = entry.path();

            // Skip unreadable files
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };

            // Skip non-TZif files
            if !bytes.starts_with(b"TZif") {
                continue;
            }

            if let Err(err) = parse(&bytes) {
                panic!("failed to parse TZif file {path:?}: {err}");
            }
        }
    }
}
