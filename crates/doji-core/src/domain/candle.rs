//! OHLCV 캔들 데이터.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV 캔들.
///
/// 가격과 거래량은 f64로 표현합니다. NaN/무한대 판정과 허용 오차 비율
/// 계산이 분류 규칙의 일부이기 때문입니다. `is_valid`를 통과하지 못한
/// 캔들은 패턴 분류 대상에서 조용히 제외됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시각
    pub timestamp: DateTime<Utc>,
    /// 시가
    pub open: f64,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: f64,
}

impl Candle {
    /// 새 캔들을 생성합니다.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// OHLC 관계와 수치 유효성을 검사합니다.
    ///
    /// 유효 조건:
    /// - 모든 값이 유한(finite)
    /// - `low <= min(open, close) <= max(open, close) <= high`
    ///
    /// 음수 가격도 관계가 성립하면 유효합니다.
    pub fn is_valid(&self) -> bool {
        let finite = self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite();
        if !finite {
            return false;
        }

        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        self.low <= body_low && body_high <= self.high
    }

    /// 상승 캔들 여부.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 하락 캔들 여부.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}
