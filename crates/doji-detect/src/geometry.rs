//! 캔들 기하 순수 함수.
//!
//! 모든 분류기가 공유하는 수치 헬퍼입니다. 부수 효과가 없으며, 퇴화
//! 캔들(`range == 0`)은 0으로 나누는 대신 0 비율을 반환합니다.

use doji_core::Candle;

/// 몸통 크기 (`|close - open|`).
pub fn body_size(candle: &Candle) -> f64 {
    (candle.close - candle.open).abs()
}

/// 전체 범위 (`high - low`).
pub fn range(candle: &Candle) -> f64 {
    candle.high - candle.low
}

/// 위 그림자 (`high - max(open, close)`).
pub fn upper_shadow(candle: &Candle) -> f64 {
    candle.high - candle.open.max(candle.close)
}

/// 아래 그림자 (`min(open, close) - low`).
pub fn lower_shadow(candle: &Candle) -> f64 {
    candle.open.min(candle.close) - candle.low
}

/// 몸통/전체 범위 비율. 범위가 0이면 0.
pub fn body_ratio(candle: &Candle) -> f64 {
    let r = range(candle);
    if r == 0.0 {
        return 0.0;
    }
    body_size(candle) / r
}

/// (위, 아래) 그림자/전체 범위 비율. 범위가 0이면 (0, 0).
pub fn shadow_ratios(candle: &Candle) -> (f64, f64) {
    let r = range(candle);
    if r == 0.0 {
        return (0.0, 0.0);
    }
    (upper_shadow(candle) / r, lower_shadow(candle) / r)
}

/// 허용 오차 계산의 기준가 (`(|open| + |close|) / 2`).
pub fn reference_price(candle: &Candle) -> f64 {
    (candle.open.abs() + candle.close.abs()) / 2.0
}

/// 두 값의 상대 차이 (%).
///
/// 분모는 절대값 평균입니다. `a == b`이면 0, 분모가 0이면 `None`
/// (0은 정확히 같을 때만 동등으로 취급).
pub fn relative_diff_percent(a: f64, b: f64) -> Option<f64> {
    if a == b {
        return Some(0.0);
    }
    let denom = (a.abs() + b.abs()) / 2.0;
    if denom == 0.0 {
        return None;
    }
    Some((a - b).abs() / denom * 100.0)
}

/// 상대 차이 기준의 가격 동등성 판정.
///
/// 정확히 같으면 항상 동등이고, 그 외에는 상대 차이가
/// `threshold_percent` 이하일 때 동등입니다.
pub fn is_price_equal(a: f64, b: f64, threshold_percent: f64) -> bool {
    match relative_diff_percent(a, b) {
        Some(diff) => diff <= threshold_percent,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(Utc::now(), open, high, low, close, 1000.0)
    }

    #[test]
    fn test_body_and_shadows() {
        let c = candle(100.0, 110.0, 90.0, 102.0);
        assert_eq!(body_size(&c), 2.0);
        assert_eq!(range(&c), 20.0);
        assert_eq!(upper_shadow(&c), 8.0);
        assert_eq!(lower_shadow(&c), 10.0);
    }

    #[test]
    fn test_ratios() {
        let c = candle(100.0, 110.0, 90.0, 102.0);
        assert_eq!(body_ratio(&c), 0.1);
        let (upper, lower) = shadow_ratios(&c);
        assert_eq!(upper, 0.4);
        assert_eq!(lower, 0.5);
    }

    #[test]
    fn test_degenerate_candle_zero_ratios() {
        let c = candle(100.0, 100.0, 100.0, 100.0);
        assert_eq!(body_ratio(&c), 0.0);
        assert_eq!(shadow_ratios(&c), (0.0, 0.0));
    }

    #[test]
    fn test_relative_diff_percent() {
        assert_eq!(relative_diff_percent(100.0, 100.0), Some(0.0));
        let diff = relative_diff_percent(100.0, 101.0).unwrap();
        assert!((diff - 0.995_024_875_621_890_5).abs() < 1e-12);
        // 분모 0은 판정 불가
        assert_eq!(relative_diff_percent(0.0, 0.0), Some(0.0));
    }

    #[test]
    fn test_price_equal_threshold_boundary() {
        // 100 대 100.09는 0.1% 이하
        assert!(is_price_equal(100.0, 100.09, 0.1));
        // 100 대 100.11은 0.1% 초과
        assert!(!is_price_equal(100.0, 100.11, 0.1));
    }

    #[test]
    fn test_zero_reference_exact_only() {
        assert!(is_price_equal(0.0, 0.0, 0.1));
        assert!(!is_price_equal(0.0, 0.001, 100.0));
    }

    #[test]
    fn test_negative_prices() {
        let c = candle(-100.0, -95.0, -105.0, -100.0);
        assert_eq!(reference_price(&c), 100.0);
        assert_eq!(upper_shadow(&c), 5.0);
        assert_eq!(lower_shadow(&c), 5.0);
        assert!(is_price_equal(-100.0, -100.05, 0.1));
    }
}
