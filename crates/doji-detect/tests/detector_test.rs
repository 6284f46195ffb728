//! 감지 서비스 통합 테스트.
//!
//! 캐시 적중/확장, 설정 변경에 따른 버킷 분리, 워커 디스패치의 결과
//! 불변성을 실제 감지 경로로 검증합니다.

use chrono::{DateTime, Duration, TimeZone, Utc};
use doji_core::{
    Candle, DojiType, Instrument, InstrumentId, ThresholdConfig, ThresholdOverrides, WorkerConfig,
};
use doji_detect::DojiPatternDetector;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn series(ohlc: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    ohlc.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Candle::new(
                base_time() + Duration::days(i as i64),
                open,
                high,
                low,
                close,
                1000.0,
            )
        })
        .collect()
}

/// 표준 도지 캔들의 OHLC.
fn standard_doji() -> (f64, f64, f64, f64) {
    (100.0, 105.0, 95.0, 100.0)
}

/// 도지가 아닌 일반 캔들의 OHLC.
fn plain_candle() -> (f64, f64, f64, f64) {
    (100.0, 106.0, 99.0, 105.0)
}

fn instrument() -> Instrument {
    Instrument::new("005930", "삼성전자")
}

#[tokio::test]
async fn test_detect_variant_sequence() {
    let detector = DojiPatternDetector::default();
    // 무효 캔들 하나 + 네 가지 변형
    let candles = series(&[
        (100.0, 105.0, 95.0, 110.0),
        (110.0, 115.0, 105.0, 110.0),
        (110.0, 111.0, 100.0, 110.0),
        (110.0, 120.0, 109.0, 110.0),
        (110.0, 120.0, 100.0, 110.0),
    ]);

    let patterns = detector.detect(&candles, &instrument()).await.unwrap();

    let types: Vec<DojiType> = patterns.iter().map(|p| p.pattern_type).collect();
    assert_eq!(
        types,
        vec![
            DojiType::Standard,
            DojiType::Dragonfly,
            DojiType::Gravestone,
            DojiType::LongLegged,
        ]
    );
    for pattern in &patterns {
        assert_eq!(pattern.instrument_id, InstrumentId::from("005930"));
        assert!((0.0..=1.0).contains(&pattern.significance));
    }
}

#[tokio::test]
async fn test_empty_input_yields_empty_result() {
    let detector = DojiPatternDetector::default();
    let patterns = detector.detect(&[], &instrument()).await.unwrap();
    assert!(patterns.is_empty());

    // 캐시에도 아무것도 남지 않습니다
    assert_eq!(detector.cache_status().await.entries, 0);
}

#[tokio::test]
async fn test_repeat_detection_returns_cached_patterns() {
    let detector = DojiPatternDetector::default();
    let candles = series(&[plain_candle(), standard_doji(), plain_candle()]);
    let inst = instrument();

    let first = detector.detect(&candles, &inst).await.unwrap();
    let second = detector.detect(&candles, &inst).await.unwrap();

    // 캐시 적중이면 패턴 ID까지 동일합니다
    assert_eq!(first.len(), 1);
    assert_eq!(first.len(), second.len());
    assert_eq!(first[0].id, second[0].id);
}

#[tokio::test]
async fn test_extension_keeps_cached_prefix() {
    let detector = DojiPatternDetector::default();
    let inst = instrument();
    let mut ohlc = vec![standard_doji(), plain_candle(), standard_doji()];

    let prefix = detector.detect(&series(&ohlc), &inst).await.unwrap();
    assert_eq!(prefix.len(), 2);

    // 같은 시퀀스 뒤에 캔들을 덧붙이면 접미사만 새로 계산됩니다
    ohlc.push(plain_candle());
    ohlc.push(standard_doji());
    let extended = detector.detect(&series(&ohlc), &inst).await.unwrap();

    assert_eq!(extended.len(), 3);
    // 접두사 패턴은 ID까지 그대로 유지
    assert_eq!(extended[0].id, prefix[0].id);
    assert_eq!(extended[1].id, prefix[1].id);
    // 타임스탬프 오름차순
    assert!(extended.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[tokio::test]
async fn test_config_update_creates_new_bucket() {
    let detector = DojiPatternDetector::default();
    let inst = instrument();
    // 시가-종가 차이 약 0.3% - 기본 임계값 0.1%로는 도지가 아님
    let candles = series(&[(100.0, 101.0, 99.5, 100.3)]);

    let before = detector.detect(&candles, &inst).await.unwrap();
    assert!(before.is_empty());

    let old_fingerprint = detector.fingerprint().await;
    let new_fingerprint = detector
        .update_config(&ThresholdOverrides::default().with_equal_price_threshold(0.5))
        .await;
    assert_ne!(old_fingerprint, new_fingerprint);

    // 완화된 임계값으로는 표준 도지로 판정됩니다
    let after = detector.detect(&candles, &inst).await.unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].pattern_type, DojiType::Standard);

    // 이전 핑거프린트의 캐시 버킷은 그대로 남아 있습니다
    let status = detector.cache_status().await;
    assert_eq!(status.entries, 2);
    assert_eq!(status.instruments, 1);
}

#[tokio::test]
async fn test_worker_mode_does_not_change_results() {
    let inline = DojiPatternDetector::default();
    let worker = DojiPatternDetector::new(
        ThresholdConfig::default(),
        WorkerConfig {
            enabled: true,
            pool_size: 2,
        },
    );
    assert!(worker.worker_enabled());

    let candles = series(&[
        standard_doji(),
        plain_candle(),
        (110.0, 111.0, 100.0, 110.0),
        (110.0, 120.0, 109.0, 110.0),
        (110.0, 120.0, 100.0, 110.0),
    ]);
    let inst = instrument();

    let a = inline.detect(&candles, &inst).await.unwrap();
    let b = worker.detect(&candles, &inst).await.unwrap();

    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.pattern_type, y.pattern_type);
        assert_eq!(x.timestamp, y.timestamp);
        assert_eq!(x.significance, y.significance);
        assert_eq!(x.context, y.context);
    }
}

#[tokio::test]
async fn test_worker_toggle_midstream() {
    let detector = DojiPatternDetector::default();
    let inst = instrument();
    let candles = series(&[standard_doji(), plain_candle(), standard_doji()]);

    let inline = detector.detect(&candles, &inst).await.unwrap();

    detector.enable_worker();
    detector.clear_cache(None).await;
    let via_worker = detector.detect(&candles, &inst).await.unwrap();
    detector.disable_worker();

    assert_eq!(inline.len(), via_worker.len());
    for (x, y) in inline.iter().zip(&via_worker) {
        assert_eq!(x.pattern_type, y.pattern_type);
        assert_eq!(x.timestamp, y.timestamp);
    }
}

#[tokio::test]
async fn test_clear_cache_scopes() {
    let detector = DojiPatternDetector::default();
    let candles = series(&[standard_doji()]);
    let samsung = Instrument::new("005930", "삼성전자");
    let hynix = Instrument::new("000660", "SK하이닉스");

    detector.detect(&candles, &samsung).await.unwrap();
    detector.detect(&candles, &hynix).await.unwrap();
    assert_eq!(detector.cache_status().await.instruments, 2);

    detector.clear_cache(Some(&samsung.id)).await;
    let status = detector.cache_status().await;
    assert_eq!(status.entries, 1);
    assert_eq!(status.instruments, 1);

    detector.clear_cache(None).await;
    assert_eq!(detector.cache_status().await.entries, 0);
}

#[tokio::test]
async fn test_support_resistance_levels_invalidate_and_apply() {
    let detector = DojiPatternDetector::default();
    let inst = instrument();
    let candles = series(&[standard_doji()]);

    let before = detector.detect(&candles, &inst).await.unwrap();
    assert!(!before[0].context.near_support_resistance);

    // 종가 100은 레벨 100.5의 1% 이내입니다
    detector
        .set_support_resistance_levels(&inst.id, vec![100.5])
        .await;

    let after = detector.detect(&candles, &inst).await.unwrap();
    assert!(after[0].context.near_support_resistance);
    // 캐시가 무효화되어 새로 계산된 패턴입니다
    assert_ne!(before[0].id, after[0].id);
}

#[tokio::test]
async fn test_concurrent_detection_same_key_single_flight() {
    let detector = std::sync::Arc::new(DojiPatternDetector::default());
    let candles = series(&[standard_doji(), plain_candle(), standard_doji()]);
    let inst = instrument();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let detector = detector.clone();
        let candles = candles.clone();
        let inst = inst.clone();
        handles.push(tokio::spawn(async move {
            detector.detect(&candles, &inst).await
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }

    // 모두 같은 캐시 엔트리를 보게 되므로 패턴 ID가 일치합니다
    let first_ids: Vec<_> = results[0].iter().map(|p| p.id).collect();
    for result in &results[1..] {
        let ids: Vec<_> = result.iter().map(|p| p.id).collect();
        assert_eq!(ids, first_ids);
    }
    assert_eq!(detector.cache_status().await.entries, 1);
}
