//! 패턴 발생 후 움직임 분석 결과 타입.
//!
//! 모든 타입은 파생 값이며 언제든 원본 캔들에서 재계산할 수 있습니다.

use crate::domain::pattern::{DojiPattern, DojiType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 가격 변화를 관찰하는 고정 지평 (일).
pub const PRICE_HORIZONS: [u32; 4] = [1, 3, 5, 10];

/// 거래량 변화를 관찰하는 고정 지평 (일).
pub const VOLUME_HORIZONS: [u32; 3] = [1, 3, 5];

/// 임의의 일수에 가장 가까운 가격 지평을 반환합니다.
///
/// 거리가 같으면 더 긴 지평을 선택합니다 (예: 2일 -> 3일 지평).
pub fn nearest_price_horizon(days: u32) -> u32 {
    nearest_horizon(&PRICE_HORIZONS, days)
}

/// 임의의 일수에 가장 가까운 거래량 지평을 반환합니다.
pub fn nearest_volume_horizon(days: u32) -> u32 {
    nearest_horizon(&VOLUME_HORIZONS, days)
}

fn nearest_horizon(horizons: &[u32], days: u32) -> u32 {
    let mut best = horizons[0];
    let mut best_dist = i64::MAX;
    for &h in horizons {
        let dist = (i64::from(h) - i64::from(days)).abs();
        if dist < best_dist || (dist == best_dist && h > best) {
            best = h;
            best_dist = dist;
        }
    }
    best
}

/// 지평별 가격 변화율 (%).
///
/// 데이터가 부족한 지평은 0으로 남습니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PriceChanges {
    /// 1일 후
    pub day1: f64,
    /// 3일 후
    pub day3: f64,
    /// 5일 후
    pub day5: f64,
    /// 10일 후
    pub day10: f64,
}

impl PriceChanges {
    /// 지정한 가격 지평의 변화율.
    ///
    /// `days`는 `PRICE_HORIZONS`의 원소여야 하며, 그 외 값은 가장 가까운
    /// 지평으로 매핑됩니다.
    pub fn at_horizon(&self, days: u32) -> f64 {
        match nearest_price_horizon(days) {
            1 => self.day1,
            3 => self.day3,
            5 => self.day5,
            _ => self.day10,
        }
    }
}

/// 지평별 거래량 변화율 (%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct VolumeChanges {
    /// 1일 후 (직접 비교)
    pub day1: f64,
    /// 3일 평균
    pub day3: f64,
    /// 5일 평균
    pub day5: f64,
}

impl VolumeChanges {
    /// 지정한 거래량 지평의 변화율.
    pub fn at_horizon(&self, days: u32) -> f64 {
        match nearest_volume_horizon(days) {
            1 => self.day1,
            3 => self.day3,
            _ => self.day5,
        }
    }
}

/// 단일 패턴의 사후 움직임 분석.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementAnalysis {
    /// 대상 패턴 ID
    pub pattern_id: Uuid,
    /// 지평별 가격 변화
    pub price_changes: PriceChanges,
    /// 지평별 거래량 변화
    pub volume_changes: VolumeChanges,
    /// 상방 여부 (5일 가격 변화 > 0)
    pub is_upward: bool,
}

impl MovementAnalysis {
    /// 데이터가 부족할 때의 중립 기본값.
    pub fn neutral(pattern_id: Uuid) -> Self {
        Self {
            pattern_id,
            price_changes: PriceChanges::default(),
            volume_changes: VolumeChanges::default(),
            is_upward: false,
        }
    }
}

/// 패턴 유형별 과거 성공률 통계.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessRate {
    /// 패턴 유형
    pub pattern_type: DojiType,
    /// 상방 확률 (0.0 ~ 1.0)
    pub upward_probability: f64,
    /// 상방 사례 평균 상승률 (%)
    pub average_gain: f64,
    /// 하방 사례 평균 하락 크기 (%, 양수로 보고)
    pub average_loss: f64,
    /// 표본 수
    pub sample_size: usize,
}

impl SuccessRate {
    /// 표본이 없을 때의 영(0) 통계.
    pub fn empty(pattern_type: DojiType) -> Self {
        Self {
            pattern_type,
            upward_probability: 0.0,
            average_gain: 0.0,
            average_loss: 0.0,
            sample_size: 0,
        }
    }
}

/// 가격 변화 분포의 단일 구간.
///
/// 구간 판정은 `min < change <= max`이며, 경계가 없는 쪽은 `None`입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
    /// 구간 라벨 (예: "-5% ~ -3%")
    pub label: String,
    /// 하한 (초과)
    pub min: Option<f64>,
    /// 상한 (이하)
    pub max: Option<f64>,
    /// 구간 내 표본 수
    pub count: usize,
    /// 전체 대비 비율 (%)
    pub percentage: f64,
}

impl DistributionBucket {
    /// 변화율이 이 구간에 속하는지 판정합니다.
    pub fn contains(&self, change: f64) -> bool {
        self.min.map_or(true, |m| change > m) && self.max.map_or(true, |m| change <= m)
    }
}

/// 패턴 유형별 가격 변화 분포.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDistribution {
    /// 패턴 유형
    pub pattern_type: DojiType,
    /// 관찰 지평 (일)
    pub days: u32,
    /// 고정 구간 히스토그램
    pub buckets: Vec<DistributionBucket>,
    /// 전체 표본 수
    pub total_samples: usize,
}

/// 유사 패턴 검색 결과 항목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPattern {
    /// 유사한 과거 패턴
    pub pattern: DojiPattern,
    /// 유사도 (0.0 ~ 1.0)
    pub similarity: f64,
    /// 해당 패턴의 사후 움직임 (조회 실패 시 None)
    pub movement: Option<MovementAnalysis>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_price_horizon() {
        assert_eq!(nearest_price_horizon(1), 1);
        assert_eq!(nearest_price_horizon(5), 5);
        assert_eq!(nearest_price_horizon(7), 5);
        assert_eq!(nearest_price_horizon(8), 10);
        assert_eq!(nearest_price_horizon(30), 10);
        // 동률은 긴 쪽
        assert_eq!(nearest_price_horizon(2), 3);
        assert_eq!(nearest_price_horizon(4), 5);
    }

    #[test]
    fn test_nearest_volume_horizon() {
        assert_eq!(nearest_volume_horizon(1), 1);
        assert_eq!(nearest_volume_horizon(10), 5);
        assert_eq!(nearest_volume_horizon(2), 3);
    }

    #[test]
    fn test_price_changes_at_horizon() {
        let changes = PriceChanges {
            day1: 1.0,
            day3: 3.0,
            day5: 5.0,
            day10: 10.0,
        };
        assert_eq!(changes.at_horizon(1), 1.0);
        assert_eq!(changes.at_horizon(7), 5.0);
        assert_eq!(changes.at_horizon(10), 10.0);
    }

    #[test]
    fn test_neutral_movement() {
        let id = Uuid::new_v4();
        let movement = MovementAnalysis::neutral(id);
        assert_eq!(movement.pattern_id, id);
        assert_eq!(movement.price_changes.day5, 0.0);
        assert!(!movement.is_upward);
    }

    #[test]
    fn test_bucket_contains_half_open() {
        let bucket = DistributionBucket {
            label: "-1% ~ 1%".to_string(),
            min: Some(-1.0),
            max: Some(1.0),
            count: 0,
            percentage: 0.0,
        };
        assert!(bucket.contains(0.0));
        assert!(bucket.contains(1.0));
        assert!(!bucket.contains(-1.0));
        assert!(!bucket.contains(1.01));
    }

    #[test]
    fn test_unbounded_bucket() {
        let bucket = DistributionBucket {
            label: "> 10%".to_string(),
            min: Some(10.0),
            max: None,
            count: 0,
            percentage: 0.0,
        };
        assert!(bucket.contains(10.5));
        assert!(bucket.contains(1e9));
        assert!(!bucket.contains(10.0));
    }
}
