//! Optionbook - Settlement Benchmarks
//!
//! Criterion-based benchmarks for the venue's hot paths.
//!
//! Run: cargo bench --bench claim_benchmarks
//!
//! These benchmarks measure:
//! - Bet placement throughput
//! - Claim-scan cost over a growing market book
//! - Preview (read-only settlement arithmetic) cost

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

use optionbook::{InMemoryCustody, ManualClock, RecordingSink, Side, Venue, VenueConfig};

const OPERATOR: &str = "bb_operator";
const HOUSE: &str = "bb_house";
const T0: u64 = 1_700_000_000;

fn build_venue() -> (Arc<Venue>, Arc<ManualClock>, Arc<InMemoryCustody>) {
    let clock = Arc::new(ManualClock::new(T0));
    let custody = Arc::new(InMemoryCustody::new());
    let events = Arc::new(RecordingSink::new());
    let config = match VenueConfig::new(OPERATOR, 5, HOUSE) {
        Ok(c) => c,
        Err(e) => panic!("bench config invalid: {}", e),
    };
    let venue = Arc::new(Venue::new(config, custody.clone(), clock.clone(), events));
    (venue, clock, custody)
}

// ============================================================================
// BETTING BENCHMARKS
// ============================================================================

fn bench_place_bet(c: &mut Criterion) {
    let mut group = c.benchmark_group("betting");

    group.throughput(Throughput::Elements(1));
    group.bench_function("place_bet", |b| {
        let (venue, _clock, custody) = build_venue();
        venue.create_market(OPERATOR, 50_000, T0 + 1_000_000).unwrap();
        custody.fund("bb_alice", u64::MAX / 2);

        b.iter(|| {
            venue
                .place_bet(black_box("bb_alice"), 0, Side::Yes, 1)
                .unwrap()
        });
    });

    group.finish();
}

// ============================================================================
// SETTLEMENT BENCHMARKS
// ============================================================================

/// Build `n` resolved markets. The claimant holds a small slice of each
/// winning side so the aggregate claim stays payable from the pool.
fn populate_markets(
    venue: &Venue,
    clock: &ManualClock,
    custody: &InMemoryCustody,
    n: u64,
) {
    clock.set(T0);
    custody.fund("bb_alice", n * 100);
    custody.fund("bb_bob", 200 * n * n);
    for i in 0..n {
        venue.create_market(OPERATOR, 50_000 + i, T0 + 100).unwrap();
        venue.place_bet("bb_alice", i, Side::Yes, 100).unwrap();
        venue.place_bet("bb_bob", i, Side::Yes, 200 * n).unwrap();
    }
    clock.set(T0 + 100);
    for i in 0..n {
        venue.resolve_market(OPERATOR, i, true).unwrap();
    }
}

fn bench_preview_claim(c: &mut Criterion) {
    let mut group = c.benchmark_group("settlement");

    for market_count in [10u64, 100, 1_000] {
        let (venue, clock, custody) = build_venue();
        populate_markets(&venue, &clock, &custody, market_count);

        group.throughput(Throughput::Elements(market_count));
        group.bench_with_input(
            BenchmarkId::new("preview_claim", market_count),
            &venue,
            |b, venue| {
                b.iter(|| black_box(venue.preview_claim("bb_alice").unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_claim_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("settlement");

    // A claim mutates the book, so each iteration rebuilds the venue.
    // iter_with_setup keeps the rebuild out of the measured region.
    for market_count in [10u64, 100] {
        group.throughput(Throughput::Elements(market_count));
        group.bench_with_input(
            BenchmarkId::new("claim", market_count),
            &market_count,
            |b, &n| {
                b.iter_with_setup(
                    || {
                        let (venue, clock, custody) = build_venue();
                        populate_markets(&venue, &clock, &custody, n);
                        venue
                    },
                    |venue| black_box(venue.claim("bb_alice").unwrap()),
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_place_bet, bench_preview_claim, bench_claim_scan);
criterion_main!(benches);
