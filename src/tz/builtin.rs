//! Zones that are always registered, regardless of the zoneinfo database.
//! Scanned files with the same identifier replace them.
use crate::common::scalar::*;
use crate::tz::{
    fixed::{DaylightRule, FixedZone, Transition},
    zone::Zone,
};

const H: i32 = MS_PER_HOUR;
const HALF: i32 = H / 2;

/// April, first Sunday, 02:00 until October, last Sunday, 02:00
const US: DaylightRule = DaylightRule::new_unchecked(
    Transition::new_unchecked(Month::April, 1, Weekday::Sunday, 2 * H),
    Transition::new_unchecked(Month::October, -1, Weekday::Sunday, 2 * H),
    H,
);

const BUILTINS: [(&str, i32, Option<DaylightRule>); 34] = [
    ("MIT", -11 * H, None),
    ("HST", -10 * H, None),
    ("AST", -9 * H, None),
    ("PST", -8 * H, Some(US)),
    ("PDT", -8 * H, Some(US)),
    ("PNT", -7 * H, None),
    ("MST", -7 * H, Some(US)),
    ("MDT", -7 * H, Some(US)),
    ("CST", -6 * H, Some(US)),
    ("CDT", -6 * H, Some(US)),
    ("EST", -5 * H, Some(US)),
    ("EDT", -5 * H, Some(US)),
    ("IET", -5 * H, None),
    ("PRT", -4 * H, None),
    ("CNT", -3 * H - HALF, None),
    ("AGT", -3 * H, None),
    ("CAT", -H, None),
    ("GMT", 0, None),
    ("ECT", H, None),
    ("EET", H, None),
    ("ART", 2 * H, None),
    ("EAT", 3 * H, None),
    ("MET", 3 * H + HALF, None),
    ("NET", 4 * H, None),
    ("PLT", 5 * H, None),
    ("IST", 5 * H + HALF, None),
    ("BST", 6 * H, None),
    ("VST", 7 * H, None),
    ("CTT", 8 * H, None),
    ("JST", 9 * H, None),
    ("ACT", 9 * H + HALF, None),
    ("AET", 10 * H, None),
    ("SST", 11 * H, None),
    ("NST", 12 * H, None),
];

pub(crate) fn zones() -> impl Iterator<Item = Zone> {
    BUILTINS.iter().map(|&(id, raw, rule)| {
        Zone::fixed(id, FixedZone::new_unchecked(Offset::new_unchecked(raw), rule))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tz::zone::ZoneKind;

    #[test]
    fn builtins_are_valid() {
        let us = DaylightRule::from_fields(4, 1, Weekday::Sunday, 2 * H, 10, -1, Weekday::Sunday, 2 * H)
            .unwrap();
        assert_eq!(US, us);
        for (zone, &(id, raw, rule)) in zones().zip(BUILTINS.iter()) {
            assert_eq!(zone.id(), id);
            assert_eq!(
                zone.kind(),
                &ZoneKind::Fixed(FixedZone::new(raw, rule).unwrap())
            );
        }
    }

    #[test]
    fn identifiers_are_unique() {
        let mut ids: Vec<_> = BUILTINS.iter().map(|(id, _, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), BUILTINS.len());
    }

    #[test]
    fn gmt_is_utc() {
        let gmt = zones().find(|z| z.id() == "GMT").unwrap();
        assert_eq!(gmt.raw_offset(), 0);
        assert!(!gmt.observes_daylight());
    }

    #[test]
    fn us_zones_observe_daylight() {
        let observing: Vec<_> = zones()
            .filter(|z| z.observes_daylight())
            .map(|z| z.id().to_string())
            .collect();
        assert_eq!(
            observing,
            ["PST", "PDT", "MST", "MDT", "CST", "CDT", "EST", "EDT"]
        );
    }
}
