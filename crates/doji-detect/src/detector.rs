//! 도지 패턴 감지 서비스.
//!
//! 순수한 `scan` 코어 위에 캐시와 디스패치를 얹습니다:
//! - 시계열 전체를 분류하고 시장 컨텍스트(추세, 거래량 변화, 지지/저항
//!   근접)를 부착하는 것은 결정적 동기 함수입니다.
//! - `detect`는 (종목, 설정 핑거프린트) 키의 증분 캐시를 확인하고, 캐시된
//!   시퀀스의 확장이면 접미사만 계산해 덧붙입니다.
//! - 워커 모드가 켜져 있으면 스캔을 블로킹 풀로 보냅니다. 켜고 꺼도
//!   결과 내용과 순서는 변하지 않습니다.

use crate::cache::{CacheKey, CacheStatus, PatternCache, ScanPlan};
use crate::classifier;
use crate::dispatch::ScanPool;
use doji_core::{
    Candle, ConfigFingerprint, DojiPattern, DojiResult, InstrumentId, Instrument, PatternContext,
    ThresholdConfig, ThresholdOverrides, TrendDirection, WorkerConfig,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// 활성 설정 스냅샷과 핑거프린트.
#[derive(Debug, Clone)]
struct ConfigState {
    snapshot: Arc<ThresholdConfig>,
    fingerprint: ConfigFingerprint,
}

impl ConfigState {
    fn new(config: ThresholdConfig) -> Self {
        let fingerprint = config.fingerprint();
        Self {
            snapshot: Arc::new(config),
            fingerprint,
        }
    }
}

/// 도지 패턴 감지 서비스.
pub struct DojiPatternDetector {
    /// 활성 설정 (변경 시 새 스냅샷으로 교체)
    config: RwLock<ConfigState>,
    /// 증분 캐시
    cache: PatternCache,
    /// 종목별 지지/저항 레벨
    sr_levels: RwLock<HashMap<InstrumentId, Vec<f64>>>,
    /// 워커 디스패치 여부
    worker_enabled: AtomicBool,
    /// 블로킹 스캔 풀
    pool: ScanPool,
}

impl Default for DojiPatternDetector {
    fn default() -> Self {
        Self::new(ThresholdConfig::default(), WorkerConfig::default())
    }
}

impl DojiPatternDetector {
    /// 새 감지기를 생성합니다.
    pub fn new(thresholds: ThresholdConfig, worker: WorkerConfig) -> Self {
        Self {
            config: RwLock::new(ConfigState::new(thresholds)),
            cache: PatternCache::new(),
            sr_levels: RwLock::new(HashMap::new()),
            worker_enabled: AtomicBool::new(worker.enabled),
            pool: ScanPool::new(worker.pool_size),
        }
    }

    // ========================================================================
    // 감지
    // ========================================================================

    /// 시계열에서 도지 패턴을 감지합니다.
    ///
    /// 빈 입력은 빈 결과입니다. 같은 종목+설정으로 캐시된 시퀀스의
    /// 확장이면 접미사만 계산하며, 캐시된 접두사 패턴은 그대로
    /// 유지됩니다. 같은 키의 동시 호출은 직렬화됩니다.
    #[instrument(skip(self, candles), fields(instrument = %instrument.id, candles = candles.len()))]
    pub async fn detect(
        &self,
        candles: &[Candle],
        instrument: &Instrument,
    ) -> DojiResult<Vec<DojiPattern>> {
        if candles.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.config.read().await.clone();
        let key: CacheKey = (instrument.id.clone(), state.fingerprint.clone());

        // 같은 키는 single-flight
        let lock = self.cache.flight_lock(&key).await;
        let _guard = lock.lock().await;

        let levels = self
            .sr_levels
            .read()
            .await
            .get(&instrument.id)
            .cloned()
            .unwrap_or_default();

        match self.cache.plan(&key, candles).await {
            ScanPlan::Hit(patterns) => {
                debug!(
                    instrument = %instrument.id,
                    fingerprint = %state.fingerprint.short(),
                    patterns = patterns.len(),
                    "캐시 적중"
                );
                Ok(patterns)
            }
            ScanPlan::Extend { cached, from } => {
                let suffix = self
                    .run_scan(candles, from, state.snapshot.clone(), levels, instrument)
                    .await?;

                debug!(
                    instrument = %instrument.id,
                    fingerprint = %state.fingerprint.short(),
                    cached = cached.len(),
                    appended_candles = candles.len() - from,
                    new_patterns = suffix.len(),
                    "증분 확장"
                );

                let mut merged = cached;
                merged.extend(suffix);
                self.cache.store(key, candles, merged.clone()).await;
                Ok(merged)
            }
            ScanPlan::Fresh => {
                let patterns = self
                    .run_scan(candles, 0, state.snapshot.clone(), levels, instrument)
                    .await?;

                info!(
                    instrument = %instrument.id,
                    fingerprint = %state.fingerprint.short(),
                    candles = candles.len(),
                    patterns = patterns.len(),
                    "전체 스캔 완료"
                );

                self.cache.store(key, candles, patterns.clone()).await;
                Ok(patterns)
            }
        }
    }

    /// 스캔을 현재 디스패치 모드로 실행합니다.
    async fn run_scan(
        &self,
        candles: &[Candle],
        from: usize,
        config: Arc<ThresholdConfig>,
        levels: Vec<f64>,
        instrument: &Instrument,
    ) -> DojiResult<Vec<DojiPattern>> {
        if self.worker_enabled() {
            let candles = candles.to_vec();
            let instrument = instrument.clone();
            self.pool
                .run(move || scan_from(&candles, from, &config, &levels, &instrument))
                .await
        } else {
            Ok(scan_from(candles, from, &config, &levels, instrument))
        }
    }

    // ========================================================================
    // 설정
    // ========================================================================

    /// 활성 설정 스냅샷.
    pub async fn config(&self) -> Arc<ThresholdConfig> {
        self.config.read().await.snapshot.clone()
    }

    /// 활성 설정의 핑거프린트.
    pub async fn fingerprint(&self) -> ConfigFingerprint {
        self.config.read().await.fingerprint.clone()
    }

    /// 부분 변경을 병합하고 새 핑거프린트를 반환합니다.
    ///
    /// 이후의 감지는 새 캐시 버킷에 쌓이며, 이전 버킷의 결과는 변경되지
    /// 않습니다.
    pub async fn update_config(&self, overrides: &ThresholdOverrides) -> ConfigFingerprint {
        let mut state = self.config.write().await;
        let merged = state.snapshot.merged(overrides);
        *state = ConfigState::new(merged);

        info!(fingerprint = %state.fingerprint.short(), "설정 변경");
        state.fingerprint.clone()
    }

    // ========================================================================
    // 캐시
    // ========================================================================

    /// 캐시를 비웁니다 (종목 하나 또는 전체).
    pub async fn clear_cache(&self, instrument: Option<&InstrumentId>) {
        self.cache.clear(instrument).await;
        debug!(instrument = ?instrument.map(|id| id.as_str()), "캐시 삭제");
    }

    /// 캐시 상태 요약.
    pub async fn cache_status(&self) -> CacheStatus {
        self.cache.status().await
    }

    // ========================================================================
    // 지지/저항
    // ========================================================================

    /// 종목의 지지/저항 레벨을 등록합니다.
    ///
    /// 컨텍스트가 캐시된 패턴에 이미 구워져 있으므로 그 종목의 캐시
    /// 엔트리는 무효화됩니다.
    pub async fn set_support_resistance_levels(&self, instrument_id: &InstrumentId, levels: Vec<f64>) {
        {
            let mut sr = self.sr_levels.write().await;
            sr.insert(instrument_id.clone(), levels);
        }
        self.cache.clear(Some(instrument_id)).await;
        debug!(instrument = %instrument_id, "지지/저항 레벨 갱신, 캐시 무효화");
    }

    // ========================================================================
    // 워커 디스패치
    // ========================================================================

    /// 워커 디스패치를 켭니다.
    pub fn enable_worker(&self) {
        self.worker_enabled.store(true, Ordering::SeqCst);
    }

    /// 워커 디스패치를 끕니다.
    pub fn disable_worker(&self) {
        self.worker_enabled.store(false, Ordering::SeqCst);
    }

    /// 워커 디스패치 활성 여부.
    pub fn worker_enabled(&self) -> bool {
        self.worker_enabled.load(Ordering::SeqCst)
    }
}

// ============================================================================
// 순수 스캔 코어
// ============================================================================

/// 시계열 전체를 스캔합니다 (캐시/디스패치 없음, 결정적).
pub fn scan(
    candles: &[Candle],
    config: &ThresholdConfig,
    levels: &[f64],
    instrument: &Instrument,
) -> Vec<DojiPattern> {
    scan_from(candles, 0, config, levels, instrument)
}

/// `from` 인덱스부터 스캔합니다.
///
/// 컨텍스트는 항상 시퀀스 전체를 기준으로 계산하므로, 접미사만 스캔해도
/// 전체를 새로 스캔한 결과와 같습니다.
fn scan_from(
    candles: &[Candle],
    from: usize,
    config: &ThresholdConfig,
    levels: &[f64],
    instrument: &Instrument,
) -> Vec<DojiPattern> {
    let mut patterns = Vec::new();

    for (i, candle) in candles.iter().enumerate().skip(from) {
        let classified = match classifier::classify(candle, config) {
            Some(classified) => classified,
            None => continue,
        };

        let context = PatternContext {
            trend: determine_trend(candles, i, config),
            volume_change_percent: volume_change_percent(candles, i, config),
            near_support_resistance: near_level(candle.close, levels, config),
        };

        patterns.push(DojiPattern {
            id: Uuid::new_v4(),
            instrument_id: instrument.id.clone(),
            instrument_name: instrument.name.clone(),
            timestamp: candle.timestamp,
            pattern_type: classified.doji_type,
            candle: *candle,
            significance: classified.significance,
            context,
        });
    }

    patterns
}

/// 룩백 윈도우의 종가 변화로 직전 추세를 판정합니다.
///
/// `closes[i - lookback]`에서 `closes[i - 1]`까지의 변화율이 임계값을
/// 넘으면 상승/하락, 그 외(데이터 부족, 기준가 0 포함)는 횡보입니다.
fn determine_trend(candles: &[Candle], index: usize, config: &ThresholdConfig) -> TrendDirection {
    let lookback = config.trend_lookback;
    if lookback == 0 || index < lookback {
        return TrendDirection::Sideways;
    }

    let base = candles[index - lookback].close;
    let last = candles[index - 1].close;
    if base == 0.0 {
        return TrendDirection::Sideways;
    }

    let change = (last - base) / base * 100.0;
    if change > config.trend_threshold_percent {
        TrendDirection::Uptrend
    } else if change < -config.trend_threshold_percent {
        TrendDirection::Downtrend
    } else {
        TrendDirection::Sideways
    }
}

/// 직전 윈도우 평균 대비 거래량 변화율 (%).
///
/// 선행 캔들이 없거나 평균이 0이면 0입니다.
fn volume_change_percent(candles: &[Candle], index: usize, config: &ThresholdConfig) -> f64 {
    if index == 0 {
        return 0.0;
    }

    let window = config.volume_window.max(1);
    let start = index.saturating_sub(window);
    let preceding = &candles[start..index];

    let mean = preceding.iter().map(|c| c.volume).sum::<f64>() / preceding.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }

    (candles[index].volume / mean - 1.0) * 100.0
}

/// 종가가 등록된 레벨 중 하나에 허용 오차 내로 근접했는지 확인합니다.
fn near_level(close: f64, levels: &[f64], config: &ThresholdConfig) -> bool {
    levels.iter().any(|&level| {
        if level == 0.0 {
            return close == 0.0;
        }
        (close - level).abs() / level.abs() * 100.0 <= config.sr_tolerance_percent
    })
}
