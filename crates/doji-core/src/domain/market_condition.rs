//! 시장 국면 분류.

use crate::domain::pattern::TrendDirection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 시장 전체의 거시 국면.
///
/// 스크리닝 조건의 한 축으로 쓰입니다. 국면 판정 자체는 주입된
/// `MarketRegimeSource`가 담당하며 엔진은 결과만 소비합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarketCondition {
    /// 강세장
    Bull,
    /// 약세장
    Bear,
    /// 중립/횡보
    #[default]
    Neutral,
}

impl MarketCondition {
    /// 진입 우호적 국면 여부.
    pub fn is_entry_friendly(self) -> bool {
        matches!(self, Self::Bull)
    }

    /// 종목 추세와 국면이 같은 방향인지 확인합니다.
    pub fn agrees_with(self, trend: TrendDirection) -> bool {
        matches!(
            (self, trend),
            (Self::Bull, TrendDirection::Uptrend)
                | (Self::Bear, TrendDirection::Downtrend)
                | (Self::Neutral, TrendDirection::Sideways)
        )
    }
}

impl fmt::Display for MarketCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bull => "bull",
            Self::Bear => "bear",
            Self::Neutral => "neutral",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_neutral() {
        assert_eq!(MarketCondition::default(), MarketCondition::Neutral);
    }

    #[test]
    fn test_entry_friendly() {
        assert!(MarketCondition::Bull.is_entry_friendly());
        assert!(!MarketCondition::Bear.is_entry_friendly());
        assert!(!MarketCondition::Neutral.is_entry_friendly());
    }

    #[test]
    fn test_agrees_with_trend() {
        assert!(MarketCondition::Bull.agrees_with(TrendDirection::Uptrend));
        assert!(MarketCondition::Bear.agrees_with(TrendDirection::Downtrend));
        assert!(!MarketCondition::Bull.agrees_with(TrendDirection::Downtrend));
    }

    #[test]
    fn test_display() {
        assert_eq!(MarketCondition::Bull.to_string(), "bull");
        assert_eq!(MarketCondition::Neutral.to_string(), "neutral");
    }
}
