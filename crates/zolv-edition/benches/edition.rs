use criterion::{black_box, criterion_group, criterion_main, Criterion};
use zolv_edition::{compare_segments, Edition, Operator, Range};

fn bench_compare_segments(c: &mut Criterion) {
    let cases = [
        ("1.2.3", "1.2.4"),
        ("2.4.0~rc1", "2.4.0"),
        ("1.0a", "1.0b"),
        ("10.0.1", "9.99.99"),
        ("1.2.3.4.5", "1.2.3.4"),
        ("5.1_p3", "5.1_p10"),
    ];

    c.bench_function("compare_segments", |b| {
        b.iter(|| {
            for (a, bver) in cases {
                black_box(compare_segments(black_box(a), black_box(bver)));
            }
        })
    });
}

fn bench_parse(c: &mut Criterion) {
    let editions = ["1.2.3", "2:1.4.0-7.1", "0.9~beta2-1", "20240101-3.4"];

    c.bench_function("edition_parse", |b| {
        b.iter(|| {
            for e in editions {
                black_box(Edition::parse(black_box(e)).ok());
            }
        })
    });
}

fn bench_range_matches(c: &mut Criterion) {
    let range = Range::new(Operator::GreaterEqual, Edition::from("1.4-2"));
    let candidates: Vec<Edition> = ["1.3", "1.4-1", "1.4-2", "1.5", "2:0.1"]
        .iter()
        .map(|s| Edition::from(*s))
        .collect();

    c.bench_function("range_matches", |b| {
        b.iter(|| {
            for candidate in &candidates {
                black_box(range.matches(black_box(candidate)));
            }
        })
    });
}

criterion_group!(benches, bench_compare_segments, bench_parse, bench_range_matches);
criterion_main!(benches);
