use criterion::{Criterion, criterion_group, criterion_main};
use std::{hint::black_box, path::Path};

use tzregistry::{Config, EpochMillis, Era, FileZone, Month, Weekday, Zone, ZoneRegistry};

const SYSTEM_AMS: &str = "/usr/share/zoneinfo/Europe/Amsterdam";

pub fn parse_posix_tz(c: &mut Criterion) {
    c.bench_function("Parse POSIX TZ", |b| {
        b.iter(|| Zone::from_posix_tz("PST8PDT", black_box("PST8PDT,M3.2.0,M11.1.0")).unwrap())
    });
}

pub fn fixed_offset_at(c: &mut Criterion) {
    let zone = Zone::from_posix_tz("CET", "CET-1CEST,M3.5.0,M10.5.0/3").unwrap();
    c.bench_function("offset at civil time (rules)", |b| {
        b.iter(|| {
            zone.offset_at(
                Era::AD,
                black_box(2024),
                Month::July,
                black_box(2),
                Weekday::Tuesday,
                43_200_000,
            )
        })
    });
}

pub fn file_offsets(c: &mut Criterion) {
    // Only available on systems with a zoneinfo database
    let Ok(bytes) = std::fs::read(SYSTEM_AMS) else {
        return;
    };
    c.bench_function("decode TZif", |b| {
        b.iter(|| FileZone::from_bytes(black_box(&bytes)).unwrap())
    });

    let zone = FileZone::load(Path::new(SYSTEM_AMS), "Europe/Amsterdam").unwrap();
    let t = EpochMillis::new(1_719_946_800_000).unwrap();
    c.bench_function("offset for instant (TZif)", |b| {
        b.iter(|| zone.offset_for_instant(black_box(t)))
    });
    c.bench_function("offset at civil time (TZif)", |b| {
        b.iter(|| {
            zone.offset_at(
                Era::AD,
                black_box(2024),
                Month::March,
                black_box(31),
                Weekday::Sunday,
                9_000_000,
            )
        })
    });
}

pub fn registry_lookup(c: &mut Criterion) {
    let registry = ZoneRegistry::new(Config::default().with_search_paths(Vec::<&Path>::new()));
    registry.populate();
    c.bench_function("registry lookup", |b| {
        b.iter(|| registry.lookup(black_box("EST")).unwrap())
    });
}

criterion_group!(
    benches,
    parse_posix_tz,
    fixed_offset_at,
    file_offsets,
    registry_lookup,
);
criterion_main!(benches);
