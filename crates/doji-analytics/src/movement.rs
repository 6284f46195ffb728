//! 패턴 발생 후 움직임 분석.
//!
//! 분석 지평은 고정입니다 (가격 1/3/5/10일, 거래량 1/3/5일). 데이터가
//! 지평에 못 미치는 항목은 실패가 아니라 0으로 남고, 소스 조회 실패만
//! 오류로 전파됩니다.

use crate::similarity::similarity;
use chrono::{Duration, Utc};
use doji_core::{
    nearest_price_horizon, Candle, CandleSource, DistributionBucket, DojiPattern, DojiResult,
    DojiType, Granularity, HistoricalPatternStore, MovementAnalysis, PriceChanges,
    PriceDistribution, SimilarPattern, SuccessRate, VolumeChanges,
};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

/// 성공률/분포/유사도 집계의 기본 과거 조회 기간 (일).
const DEFAULT_HISTORY_DAYS: u32 = 365;

/// 유사 패턴 검색 결과 상한.
const SIMILAR_LIMIT: usize = 10;

/// 유사 패턴 움직임 보강에 쓰는 지평 (일).
const SIMILAR_MOVEMENT_HORIZON: u32 = 5;

/// 분포 히스토그램의 내부 경계 (%).
const BUCKET_EDGES: [f64; 8] = [-10.0, -5.0, -3.0, -1.0, 1.0, 3.0, 5.0, 10.0];

/// 패턴 사후 움직임 분석기.
#[derive(Clone)]
pub struct MovementAnalyzer {
    candle_source: Arc<dyn CandleSource>,
    pattern_store: Arc<dyn HistoricalPatternStore>,
    history_days: u32,
}

impl MovementAnalyzer {
    /// 새 분석기를 생성합니다.
    pub fn new(
        candle_source: Arc<dyn CandleSource>,
        pattern_store: Arc<dyn HistoricalPatternStore>,
    ) -> Self {
        Self {
            candle_source,
            pattern_store,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }

    /// 집계용 과거 조회 기간을 변경합니다.
    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }

    /// 패턴 발생 후 가격/거래량 움직임을 분석합니다.
    ///
    /// 발생 다음 날부터 최대 `look_ahead_days`개의 일봉을 관찰합니다.
    /// 지평별로 독립적으로 판정하며, 캔들이 지평에 못 미치거나 기준
    /// 값(종가/거래량)이 0인 지평은 0으로 남습니다.
    #[instrument(skip(self, pattern), fields(pattern_id = %pattern.id, instrument = %pattern.instrument_id))]
    pub async fn analyze_price_movement(
        &self,
        pattern: &DojiPattern,
        look_ahead_days: u32,
    ) -> DojiResult<MovementAnalysis> {
        let start = pattern.timestamp + Duration::days(1);
        let fetched = self
            .candle_source
            .candles(&pattern.instrument_id, start, Utc::now(), Granularity::Day)
            .await?;
        let window: Vec<&Candle> = fetched.iter().take(look_ahead_days as usize).collect();

        let base_close = pattern.candle.close;
        let price_at = |days: usize| -> f64 {
            if base_close == 0.0 || window.len() < days {
                return 0.0;
            }
            (window[days - 1].close - base_close) / base_close * 100.0
        };
        let price_changes = PriceChanges {
            day1: price_at(1),
            day3: price_at(3),
            day5: price_at(5),
            day10: price_at(10),
        };

        let base_volume = pattern.candle.volume;
        let volume_at = |days: usize| -> f64 {
            if base_volume == 0.0 || window.len() < days {
                return 0.0;
            }
            let mean = window[..days].iter().map(|c| c.volume).sum::<f64>() / days as f64;
            (mean / base_volume - 1.0) * 100.0
        };
        let volume_changes = VolumeChanges {
            day1: volume_at(1),
            day3: volume_at(3),
            day5: volume_at(5),
        };

        Ok(MovementAnalysis {
            pattern_id: pattern.id,
            price_changes,
            volume_changes,
            is_upward: price_changes.day5 > 0.0,
        })
    }

    /// 유형별 과거 성공률을 집계합니다.
    ///
    /// `timeframe_days`는 가장 가까운 가격 지평으로 매핑됩니다. 변화율이
    /// 정확히 0인 표본은 상방도 하방도 아니며 표본 수에만 들어갑니다.
    #[instrument(skip(self))]
    pub async fn calculate_success_rate(
        &self,
        doji_type: DojiType,
        timeframe_days: u32,
    ) -> DojiResult<SuccessRate> {
        let horizon = nearest_price_horizon(timeframe_days);
        let patterns = self
            .pattern_store
            .patterns_by_type(doji_type, self.history_days)
            .await?;
        if patterns.is_empty() {
            return Ok(SuccessRate::empty(doji_type));
        }

        let mut changes = Vec::with_capacity(patterns.len());
        for pattern in &patterns {
            let movement = self.analyze_price_movement(pattern, horizon).await?;
            changes.push(movement.price_changes.at_horizon(horizon));
        }

        let gains: Vec<f64> = changes.iter().copied().filter(|&c| c > 0.0).collect();
        let losses: Vec<f64> = changes.iter().copied().filter(|&c| c < 0.0).collect();

        let average_gain = if gains.is_empty() {
            0.0
        } else {
            gains.iter().sum::<f64>() / gains.len() as f64
        };
        let average_loss = if losses.is_empty() {
            0.0
        } else {
            (losses.iter().sum::<f64>() / losses.len() as f64).abs()
        };

        let rate = SuccessRate {
            pattern_type: doji_type,
            upward_probability: gains.len() as f64 / changes.len() as f64,
            average_gain,
            average_loss,
            sample_size: changes.len(),
        };

        debug!(
            pattern_type = %doji_type,
            horizon,
            sample_size = rate.sample_size,
            upward_probability = rate.upward_probability,
            "성공률 집계 완료"
        );
        Ok(rate)
    }

    /// 유형별 가격 변화 분포를 집계합니다.
    ///
    /// 고정 경계 (-10, -5, -3, -1, 1, 3, 5, 10)%의 아홉 구간
    /// 히스토그램입니다. 구간 판정은 `min < change <= max`입니다.
    #[instrument(skip(self))]
    pub async fn price_distribution(
        &self,
        doji_type: DojiType,
        days: u32,
    ) -> DojiResult<PriceDistribution> {
        let horizon = nearest_price_horizon(days);
        let patterns = self
            .pattern_store
            .patterns_by_type(doji_type, self.history_days)
            .await?;

        let mut changes = Vec::with_capacity(patterns.len());
        for pattern in &patterns {
            let movement = self.analyze_price_movement(pattern, horizon).await?;
            changes.push(movement.price_changes.at_horizon(horizon));
        }

        let mut buckets = distribution_buckets();
        for &change in &changes {
            if let Some(bucket) = buckets.iter_mut().find(|b| b.contains(change)) {
                bucket.count += 1;
            }
        }
        if !changes.is_empty() {
            let total = changes.len() as f64;
            for bucket in &mut buckets {
                bucket.percentage = bucket.count as f64 / total * 100.0;
            }
        }

        Ok(PriceDistribution {
            pattern_type: doji_type,
            days: horizon,
            buckets,
            total_samples: changes.len(),
        })
    }

    /// 주어진 패턴과 유사한 과거 패턴을 찾습니다.
    ///
    /// 같은 유형의 과거 패턴을 유사도 내림차순으로 최대 10건 반환하며,
    /// 각 항목에 사후 움직임을 보강합니다. 개별 움직임 조회 실패는 전체
    /// 검색을 깨지 않고 해당 항목만 `None`으로 남깁니다.
    #[instrument(skip(self, pattern), fields(pattern_id = %pattern.id))]
    pub async fn find_similar_patterns(
        &self,
        pattern: &DojiPattern,
    ) -> DojiResult<Vec<SimilarPattern>> {
        let history = self
            .pattern_store
            .patterns_by_type(pattern.pattern_type, self.history_days)
            .await?;

        let mut scored: Vec<(DojiPattern, f64)> = history
            .into_iter()
            .filter(|candidate| candidate.id != pattern.id)
            .map(|candidate| {
                let score = similarity(pattern, &candidate);
                (candidate, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(SIMILAR_LIMIT);

        let mut results = Vec::with_capacity(scored.len());
        for (candidate, score) in scored {
            let movement = match self
                .analyze_price_movement(&candidate, SIMILAR_MOVEMENT_HORIZON)
                .await
            {
                Ok(movement) => Some(movement),
                Err(error) => {
                    debug!(
                        candidate_id = %candidate.id,
                        error = %error,
                        "유사 패턴 움직임 보강 실패"
                    );
                    None
                }
            };
            results.push(SimilarPattern {
                pattern: candidate,
                similarity: score,
                movement,
            });
        }
        Ok(results)
    }
}

/// 고정 경계의 빈 히스토그램 구간을 생성합니다.
fn distribution_buckets() -> Vec<DistributionBucket> {
    let mut buckets = Vec::with_capacity(BUCKET_EDGES.len() + 1);

    buckets.push(DistributionBucket {
        label: format!("<= {}%", BUCKET_EDGES[0]),
        min: None,
        max: Some(BUCKET_EDGES[0]),
        count: 0,
        percentage: 0.0,
    });
    for pair in BUCKET_EDGES.windows(2) {
        buckets.push(DistributionBucket {
            label: format!("{}% ~ {}%", pair[0], pair[1]),
            min: Some(pair[0]),
            max: Some(pair[1]),
            count: 0,
            percentage: 0.0,
        });
    }
    buckets.push(DistributionBucket {
        label: format!("> {}%", BUCKET_EDGES[BUCKET_EDGES.len() - 1]),
        min: Some(BUCKET_EDGES[BUCKET_EDGES.len() - 1]),
        max: None,
        count: 0,
        percentage: 0.0,
    });

    buckets
}
