//! 분류기/스캔 벤치마크.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use doji_core::{Candle, Instrument, ThresholdConfig};
use doji_detect::{classify, detector};

/// 도지와 일반 캔들이 섞인 합성 시계열.
fn synthetic_series(count: usize) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let price = 100.0 + (i % 17) as f64 * 0.3;
            let (open, close) = if i % 5 == 0 {
                (price, price + price * 0.0005)
            } else {
                (price, price + 1.7)
            };
            Candle::new(
                base + Duration::days(i as i64),
                open,
                open.max(close) + (i % 7) as f64,
                open.min(close) - (i % 11) as f64,
                close,
                1000.0 + (i % 13) as f64 * 250.0,
            )
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let config = ThresholdConfig::default();
    let series = synthetic_series(1);
    let candle = series[0];

    c.bench_function("classify_single", |b| {
        b.iter(|| classify(black_box(&candle), black_box(&config)))
    });
}

fn bench_scan(c: &mut Criterion) {
    let config = ThresholdConfig::default();
    let instrument = Instrument::new("005930", "삼성전자");
    let levels = [100.0, 103.0];

    for size in [250usize, 2500] {
        let series = synthetic_series(size);
        c.bench_function(&format!("scan_{size}"), |b| {
            b.iter(|| {
                detector::scan(
                    black_box(&series),
                    black_box(&config),
                    black_box(&levels),
                    black_box(&instrument),
                )
            })
        });
    }
}

criterion_group!(benches, bench_classify, bench_scan);
criterion_main!(benches);
