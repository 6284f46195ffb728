//! 시장 전체 스크리닝 파이프라인.
//!
//! 수집 -> 필터 -> 움직임 분석 -> 정렬 -> 페이지네이션의 단방향
//! 파이프라인입니다. 종목별 수집과 패턴별 분석은 `buffer_unordered`로
//! 병렬화하며, 소스 오류 하나라도 발생하면 부분 결과 없이 전체가
//! 실패합니다.

use crate::criteria::{
    PatternSubscription, ScreenCriteria, ScreenReport, ScreenResultItem, SortDirection, SortField,
};
use chrono::Utc;
use doji_analytics::MovementAnalyzer;
use doji_core::{
    nearest_price_horizon, DojiPattern, DojiResult, DojiType, HistoricalPatternStore, InstrumentId,
    MarketRegimeSource, MovementAnalysis, UniverseSource,
};
use futures::stream::{self, StreamExt};
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// 상방 전환 검색의 관찰 지평 (일).
const UPWARD_HORIZON: u32 = 5;

/// 상방 전환 패턴 한 건.
#[derive(Debug, Clone, PartialEq)]
pub struct UpwardPattern {
    /// 패턴
    pub pattern: DojiPattern,
    /// 사후 움직임
    pub movement: MovementAnalysis,
}

/// 도지 스크리너.
pub struct DojiScreener {
    universe: Arc<dyn UniverseSource>,
    pattern_store: Arc<dyn HistoricalPatternStore>,
    analyzer: MovementAnalyzer,
    regime_source: Option<Arc<dyn MarketRegimeSource>>,
    max_parallelism: usize,
    subscriptions: RwLock<Vec<PatternSubscription>>,
}

impl DojiScreener {
    /// 새 스크리너를 생성합니다.
    ///
    /// `regime_source`가 없으면 시장 국면 조건은 적용하지 않고
    /// 건너뜁니다.
    pub fn new(
        universe: Arc<dyn UniverseSource>,
        pattern_store: Arc<dyn HistoricalPatternStore>,
        analyzer: MovementAnalyzer,
        regime_source: Option<Arc<dyn MarketRegimeSource>>,
        max_parallelism: usize,
    ) -> Self {
        Self {
            universe,
            pattern_store,
            analyzer,
            regime_source,
            max_parallelism: max_parallelism.max(1),
            subscriptions: RwLock::new(Vec::new()),
        }
    }

    /// 유니버스 전체의 최근 패턴을 수집합니다.
    ///
    /// 타임스탬프 내림차순으로 반환합니다.
    #[instrument(skip(self))]
    pub async fn recent_patterns(
        &self,
        days: u32,
        doji_type: Option<DojiType>,
    ) -> DojiResult<Vec<DojiPattern>> {
        let instruments = self.universe.instruments().await?;
        debug!(instruments = instruments.len(), days, "유니버스 수집 시작");

        let store = self.pattern_store.clone();
        let per_instrument: Vec<_> = stream::iter(instruments)
            .map(|instrument| {
                let store = store.clone();
                async move { store.patterns_for_instrument(&instrument.id, days).await }
            })
            .buffer_unordered(self.max_parallelism)
            .collect()
            .await;

        let mut patterns = Vec::new();
        for result in per_instrument {
            patterns.extend(result?);
        }

        if let Some(doji_type) = doji_type {
            patterns.retain(|p| p.pattern_type == doji_type);
        }
        // 병렬 수집 완료 순서와 무관하게 동률까지 전순서로 고정합니다
        patterns.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.instrument_id.cmp(&b.instrument_id))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(patterns)
    }

    /// 발생 후 상방으로 움직인 패턴을 찾습니다.
    ///
    /// 5일 지평 기준이며, `min_upward`를 주면 그 이상 상승한 것만
    /// 남깁니다. 5일 상승률 내림차순입니다.
    #[instrument(skip(self))]
    pub async fn upward_after_doji(
        &self,
        days: u32,
        min_upward: Option<f64>,
    ) -> DojiResult<Vec<UpwardPattern>> {
        let patterns = self.recent_patterns(days, None).await?;
        let movements = self.analyze_all(patterns, UPWARD_HORIZON).await?;

        let mut upward: Vec<UpwardPattern> = movements
            .into_iter()
            .filter(|(_, movement)| movement.is_upward)
            .filter(|(_, movement)| {
                min_upward.map_or(true, |min| movement.price_changes.day5 >= min)
            })
            .map(|(pattern, movement)| UpwardPattern { pattern, movement })
            .collect();

        upward.sort_by(|a, b| {
            b.movement
                .price_changes
                .day5
                .partial_cmp(&a.movement.price_changes.day5)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.pattern.instrument_id.cmp(&b.pattern.instrument_id))
                .then_with(|| a.pattern.id.cmp(&b.pattern.id))
        });
        Ok(upward)
    }

    /// 조건 기반 스크리닝을 수행합니다.
    #[instrument(skip(self, criteria), fields(days = criteria.days_range, limit = criteria.limit))]
    pub async fn screen(&self, criteria: &ScreenCriteria) -> DojiResult<ScreenReport> {
        let horizon = nearest_price_horizon(criteria.days_range);

        let mut patterns = self.recent_patterns(criteria.days_range, None).await?;
        patterns.retain(|p| criteria.matches_type(p.pattern_type));

        let analyzed = self.analyze_all(patterns, horizon).await?;
        let mut candidates = Vec::with_capacity(analyzed.len());
        for (pattern, movement) in analyzed {
            let price_change = movement.price_changes.at_horizon(horizon);
            if let Some(min) = criteria.min_upward_percent {
                if price_change < min {
                    continue;
                }
            }

            if let (Some(wanted), Some(source)) =
                (criteria.market_condition, self.regime_source.as_ref())
            {
                let regime = source.regime_at(&pattern.instrument_id, pattern.timestamp).await?;
                if regime != wanted {
                    continue;
                }
            }

            candidates.push(ScreenResultItem {
                instrument_id: pattern.instrument_id.clone(),
                instrument_name: pattern.instrument_name.clone(),
                pattern_type: pattern.pattern_type,
                pattern_date: pattern.timestamp,
                price_change,
                volume_change: movement.volume_changes.at_horizon(horizon),
                significance: pattern.significance,
                rank: 0,
            });
        }

        sort_items(&mut candidates, criteria.sort_by, criteria.sort_direction);

        let total = candidates.len();
        let start = (criteria.effective_page() - 1).saturating_mul(criteria.limit);
        let mut items: Vec<ScreenResultItem> = candidates
            .into_iter()
            .skip(start)
            .take(criteria.limit)
            .collect();
        for (offset, item) in items.iter_mut().enumerate() {
            item.rank = start + offset + 1;
        }

        info!(
            total,
            returned = items.len(),
            page = criteria.effective_page(),
            "스크리닝 완료"
        );
        Ok(ScreenReport {
            items,
            total,
            criteria: criteria.clone(),
        })
    }

    /// 패턴 알림 구독을 등록합니다.
    ///
    /// 등록은 항상 성공하며 구독 ID를 반환합니다.
    pub async fn subscribe_to_patterns(
        &self,
        instrument_ids: Vec<InstrumentId>,
        pattern_types: Vec<DojiType>,
    ) -> Uuid {
        let subscription = PatternSubscription {
            id: Uuid::new_v4(),
            instrument_ids,
            pattern_types,
            created_at: Utc::now(),
        };
        let id = subscription.id;

        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.push(subscription);
        debug!(subscription_id = %id, total = subscriptions.len(), "구독 등록");
        id
    }

    /// 등록된 구독 목록.
    pub async fn subscriptions(&self) -> Vec<PatternSubscription> {
        self.subscriptions.read().await.clone()
    }

    /// 패턴별 움직임 분석을 병렬로 수행합니다.
    async fn analyze_all(
        &self,
        patterns: Vec<DojiPattern>,
        look_ahead_days: u32,
    ) -> DojiResult<Vec<(DojiPattern, MovementAnalysis)>> {
        let analyzer = self.analyzer.clone();
        let results: Vec<_> = stream::iter(patterns)
            .map(|pattern| {
                let analyzer = analyzer.clone();
                async move {
                    let movement = analyzer
                        .analyze_price_movement(&pattern, look_ahead_days)
                        .await?;
                    Ok::<_, doji_core::DojiError>((pattern, movement))
                }
            })
            .buffer_unordered(self.max_parallelism)
            .collect()
            .await;

        results.into_iter().collect()
    }
}

/// 조건에 따라 결과를 정렬합니다.
///
/// 정렬 값이 같은 항목은 발생 시각, 종목 코드 순의 보조 키로 고정합니다.
/// 입력이 병렬 분석의 완료 순서라 호출마다 달라지므로, 보조 키 없이는
/// 동률 항목이 페이지 경계에서 호출 간에 자리를 바꿀 수 있습니다.
fn sort_items(items: &mut [ScreenResultItem], field: SortField, direction: SortDirection) {
    items.sort_by(|a, b| {
        let ordering = match field {
            SortField::PriceChange => a
                .price_change
                .partial_cmp(&b.price_change)
                .unwrap_or(Ordering::Equal),
            SortField::VolumeChange => a
                .volume_change
                .partial_cmp(&b.volume_change)
                .unwrap_or(Ordering::Equal),
            SortField::PatternDate => a.pattern_date.cmp(&b.pattern_date),
            SortField::Significance => a
                .significance
                .partial_cmp(&b.significance)
                .unwrap_or(Ordering::Equal),
        };
        let ordering = match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering
            .then_with(|| a.pattern_date.cmp(&b.pattern_date))
            .then_with(|| a.instrument_id.cmp(&b.instrument_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};

    fn item(code: &str, price: f64, significance: f64, date: DateTime<Utc>) -> ScreenResultItem {
        ScreenResultItem {
            instrument_id: InstrumentId::from(code),
            instrument_name: code.to_string(),
            pattern_type: DojiType::Standard,
            pattern_date: date,
            price_change: price,
            volume_change: 0.0,
            significance,
            rank: 0,
        }
    }

    #[test]
    fn test_sort_by_price_desc() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut items = vec![
            item("A", 1.0, 0.5, now),
            item("B", 5.0, 0.5, now),
            item("C", -2.0, 0.5, now),
        ];
        sort_items(&mut items, SortField::PriceChange, SortDirection::Desc);

        let prices: Vec<f64> = items.iter().map(|i| i.price_change).collect();
        assert_eq!(prices, vec![5.0, 1.0, -2.0]);
    }

    #[test]
    fn test_sort_by_date_asc() {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let later = base + chrono::Duration::days(3);
        let mut items = vec![item("A", 0.0, 0.5, later), item("B", 0.0, 0.5, base)];
        sort_items(&mut items, SortField::PatternDate, SortDirection::Asc);
        assert_eq!(items[0].pattern_date, base);
    }

    #[test]
    fn test_sort_ties_resolve_to_single_order() {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let earlier = base - chrono::Duration::days(1);
        // 정렬 값이 전부 동률인 항목을 서로 다른 입력 순서로 정렬해도
        // 결과는 한 가지여야 합니다
        let mut first = vec![
            item("C", 3.0, 0.5, base),
            item("A", 3.0, 0.5, base),
            item("B", 3.0, 0.5, earlier),
        ];
        let mut second = vec![
            item("B", 3.0, 0.5, earlier),
            item("C", 3.0, 0.5, base),
            item("A", 3.0, 0.5, base),
        ];
        sort_items(&mut first, SortField::PriceChange, SortDirection::Desc);
        sort_items(&mut second, SortField::PriceChange, SortDirection::Desc);

        assert_eq!(first, second);
        // 동률은 발생 시각, 그 다음 종목 코드 순
        let codes: Vec<&str> = first.iter().map(|i| i.instrument_id.as_str()).collect();
        assert_eq!(codes, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_sort_ignores_nan_poisoning() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut items = vec![item("A", f64::NAN, 0.5, now), item("B", 1.0, 0.5, now)];
        // NaN이 있어도 패닉 없이 정렬되어야 합니다
        sort_items(&mut items, SortField::PriceChange, SortDirection::Desc);
        assert_eq!(items.len(), 2);
    }
}
