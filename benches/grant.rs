//! Benchmarks for the questline grant path.
//!
//! Run with: `cargo bench`
//!
//! Performance targets:
//! - a lesson grant (idempotency + rules + streak + level + ledger +
//!   achievement fixed point) well under 10us
//! - a duplicate grant (idempotency short-circuit) under 1us

use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use questline::{LessonId, ProgramId, Questline, XpEvent};

fn lesson(n: usize) -> XpEvent {
    XpEvent::LessonCompleted {
        program_id: ProgramId::new("rust-101"),
        lesson_id: LessonId::new(format!("lesson-{}", n)),
        module_index: 0,
        duration_secs: 600,
    }
}

/// Benchmark a fresh lesson grant against a fresh profile.
fn bench_lesson_grant(c: &mut Criterion) {
    let engine = Questline::with_defaults();
    let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();

    c.bench_function("lesson_grant", |b| {
        b.iter_batched(
            || engine.new_profile("user-1"),
            |mut profile| {
                engine
                    .add_experience_at(&mut profile, &lesson(0), now)
                    .unwrap()
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark the duplicate short-circuit on an already-rewarded lesson.
fn bench_duplicate_grant(c: &mut Criterion) {
    let engine = Questline::with_defaults();
    let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();

    let mut profile = engine.new_profile("user-1");
    engine
        .add_experience_at(&mut profile, &lesson(0), now)
        .unwrap();

    c.bench_function("duplicate_grant", |b| {
        b.iter(|| {
            engine
                .add_experience_at(&mut profile, &lesson(0), now)
                .unwrap()
        });
    });
}

/// Benchmark a grant against a mature profile with a full ledger.
fn bench_grant_with_full_ledger(c: &mut Criterion) {
    let engine = Questline::with_defaults();
    let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();

    let mut profile = engine.new_profile("user-1");
    for n in 0..1100 {
        engine
            .add_experience_at(&mut profile, &lesson(n), now)
            .unwrap();
    }

    c.bench_function("grant_with_full_ledger", |b| {
        let mut next = 1100;
        b.iter(|| {
            next += 1;
            engine
                .add_experience_at(&mut profile, &lesson(next), now)
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_lesson_grant,
    bench_duplicate_grant,
    bench_grant_with_full_ledger
);
criterion_main!(benches);
