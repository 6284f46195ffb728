//! 도지 변형 분류기.
//!
//! 한 캔들을 네 가지 도지 변형과 비교해 정확히 하나의 유형(또는 없음)을
//! 반환합니다. 여러 변형이 동시에 맞으면 고정 순서(긴다리형 → 잠자리형 →
//! 비석형 → 표준)로 가장 구체적인 유형이 이깁니다.
//!
//! 허용 오차는 캔들마다 기준가에서 파생됩니다:
//! - `shadow_tolerance = shadow_tolerance_percent / 100 * 기준가`
//! - `long_leg_min = long_leg_threshold * long_leg_unit_percent / 100 * 기준가`

use crate::geometry;
use doji_core::{Candle, DojiError, DojiResult, DojiType, ThresholdConfig};

/// 분류 결과.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedDoji {
    /// 판정된 변형
    pub doji_type: DojiType,
    /// 유의성 점수 (0.0 ~ 1.0)
    pub significance: f64,
}

/// 한 캔들을 분류합니다.
///
/// 유효하지 않은 캔들(NaN/무한대, OHLC 관계 위반)은 `None`입니다.
pub fn classify(candle: &Candle, config: &ThresholdConfig) -> Option<ClassifiedDoji> {
    classify_with_threshold(candle, config, config.equal_price_threshold)
}

/// 민감도를 적용해 분류합니다.
///
/// 민감도는 `[0, 1]` 범위여야 하며 범위를 벗어나면 즉시 실패합니다.
/// 민감도가 높을수록 시가-종가 동등성 판정이 엄격해집니다
/// (`equal_price_threshold * (1 - sensitivity)`). 민감도 0은 기본
/// 분류기와 같습니다.
pub fn classify_with_sensitivity(
    candle: &Candle,
    sensitivity: f64,
    config: &ThresholdConfig,
) -> DojiResult<Option<ClassifiedDoji>> {
    if !(0.0..=1.0).contains(&sensitivity) {
        return Err(DojiError::InvalidSensitivity { value: sensitivity });
    }

    let adjusted = config.equal_price_threshold * (1.0 - sensitivity);
    Ok(classify_with_threshold(candle, config, adjusted))
}

fn classify_with_threshold(
    candle: &Candle,
    config: &ThresholdConfig,
    equal_threshold: f64,
) -> Option<ClassifiedDoji> {
    if !candle.is_valid() {
        return None;
    }
    if !geometry::is_price_equal(candle.open, candle.close, equal_threshold) {
        return None;
    }

    let upper = geometry::upper_shadow(candle);
    let lower = geometry::lower_shadow(candle);
    let reference = geometry::reference_price(candle);
    let shadow_tolerance = config.shadow_tolerance_percent / 100.0 * reference;
    let long_leg_min = config.long_leg_threshold * config.long_leg_unit_percent / 100.0 * reference;

    // 고정 순서 판정: 가장 구체적인 변형이 이깁니다.
    let doji_type = if upper > 0.0 && lower > 0.0 && upper >= long_leg_min && lower >= long_leg_min
    {
        DojiType::LongLegged
    } else if upper <= shadow_tolerance && lower > shadow_tolerance {
        DojiType::Dragonfly
    } else if lower <= shadow_tolerance && upper > shadow_tolerance {
        DojiType::Gravestone
    } else if (upper > 0.0 && lower > 0.0) || (upper == 0.0 && lower == 0.0) {
        // 완전히 평평한 캔들은 퇴화했지만 유효한 표준 도지입니다.
        // 한쪽 그림자만 0이면 탈락입니다.
        DojiType::Standard
    } else {
        return None;
    };

    let significance = significance(
        candle,
        doji_type,
        equal_threshold,
        shadow_tolerance,
        long_leg_min,
    );

    Some(ClassifiedDoji {
        doji_type,
        significance,
    })
}

/// 유의성 점수: 가격 동등성 40% + 유형별 형태 품질 60%.
fn significance(
    candle: &Candle,
    doji_type: DojiType,
    equal_threshold: f64,
    shadow_tolerance: f64,
    long_leg_min: f64,
) -> f64 {
    let diff = geometry::relative_diff_percent(candle.open, candle.close).unwrap_or(0.0);
    let equality = equality_score(diff, equal_threshold);

    let upper = geometry::upper_shadow(candle);
    let lower = geometry::lower_shadow(candle);

    let shape = match doji_type {
        DojiType::Standard => {
            let longest = upper.max(lower);
            if longest == 0.0 {
                0.0
            } else {
                1.0 - (upper - lower).abs() / longest
            }
        }
        DojiType::Dragonfly => tolerance_tightness(upper, shadow_tolerance),
        DojiType::Gravestone => tolerance_tightness(lower, shadow_tolerance),
        DojiType::LongLegged => {
            if long_leg_min <= 0.0 {
                1.0
            } else {
                let avg_shadow = (upper + lower) / 2.0;
                (avg_shadow / (2.0 * long_leg_min)).min(1.0)
            }
        }
    };

    (0.4 * equality + 0.6 * shape).clamp(0.0, 1.0)
}

/// 동등성 점수: 정확히 같으면 1, 임계값에 도달하면 0.
fn equality_score(diff_percent: f64, threshold: f64) -> f64 {
    if diff_percent == 0.0 {
        return 1.0;
    }
    if threshold <= 0.0 {
        return 0.0;
    }
    (1.0 - (diff_percent / threshold).min(1.0)).max(0.0)
}

/// 허용 오차 대비 그림자가 얼마나 0에 가까운지 (잠자리/비석형 형태 점수).
fn tolerance_tightness(shadow: f64, tolerance: f64) -> f64 {
    if tolerance <= 0.0 {
        // 오차 0에서 그림자가 정확히 0이어야만 변형이 성립합니다.
        return if shadow == 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - shadow / tolerance).clamp(0.0, 1.0)
}
