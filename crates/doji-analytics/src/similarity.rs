//! 패턴 유사도.
//!
//! 유사도는 두 성분의 가중합입니다:
//! - 형태 (70%) - OHLC를 캔들 범위 내 상대 위치로 정규화한 뒤 성분별
//!   차이의 평균. 절대 가격 수준과 무관합니다.
//! - 컨텍스트 (30%) - 추세 일치, 지지/저항 근접 일치, 거래량 변화율
//!   근접.
//!
//! 유형이 다른 패턴의 유사도는 항상 0입니다.

use doji_core::{Candle, DojiPattern};

/// 범위 내 상대 위치로 정규화한 캔들 형태.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NormalizedShape {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl NormalizedShape {
    /// 캔들을 `[0, 1]` 위치로 정규화합니다.
    ///
    /// 범위가 0인 퇴화 캔들은 중앙값 형태로 취급합니다.
    fn from_candle(candle: &Candle) -> Self {
        let range = candle.high - candle.low;
        if range == 0.0 {
            return Self {
                open: 0.5,
                high: 1.0,
                low: 0.0,
                close: 0.5,
            };
        }

        let pos = |value: f64| (value - candle.low) / range;
        Self {
            open: pos(candle.open),
            high: 1.0,
            low: 0.0,
            close: pos(candle.close),
        }
    }

    /// 성분별 차이 평균 기반의 형태 점수 (0.0 ~ 1.0).
    fn score_against(&self, other: &Self) -> f64 {
        let diff = (self.open - other.open).abs()
            + (self.high - other.high).abs()
            + (self.low - other.low).abs()
            + (self.close - other.close).abs();
        (1.0 - diff / 4.0).clamp(0.0, 1.0)
    }
}

/// 컨텍스트 일치 점수 (0.0 ~ 1.0).
fn context_score(a: &DojiPattern, b: &DojiPattern) -> f64 {
    let trend = if a.context.trend == b.context.trend {
        1.0
    } else {
        0.0
    };
    let sr = if a.context.near_support_resistance == b.context.near_support_resistance {
        1.0
    } else {
        0.0
    };
    let volume_gap = (a.context.volume_change_percent - b.context.volume_change_percent).abs();
    let volume = (1.0 - volume_gap / 100.0).max(0.0);

    trend * 0.4 + sr * 0.3 + volume * 0.3
}

/// 두 패턴의 유사도 (0.0 ~ 1.0).
pub fn similarity(a: &DojiPattern, b: &DojiPattern) -> f64 {
    if a.pattern_type != b.pattern_type {
        return 0.0;
    }

    let shape_a = NormalizedShape::from_candle(&a.candle);
    let shape_b = NormalizedShape::from_candle(&b.candle);
    let shape = shape_a.score_against(&shape_b);

    (shape * 0.7 + context_score(a, b) * 0.3).clamp(0.0, 1.0)
}
