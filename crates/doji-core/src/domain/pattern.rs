//! 도지 패턴 도메인 타입.
//!
//! 도지는 시가와 종가가 거의 같은 캔들로, 시장의 우유부단을 나타냅니다.
//! 그림자 형태에 따라 네 가지 변형으로 분류합니다:
//! - **표준 (Standard)**: 양쪽 그림자가 모두 존재
//! - **잠자리형 (Dragonfly)**: 위 그림자가 거의 없고 아래 그림자가 김
//! - **비석형 (Gravestone)**: 아래 그림자가 거의 없고 위 그림자가 김
//! - **긴다리형 (Long-legged)**: 양쪽 그림자가 모두 김

use crate::domain::candle::Candle;
use crate::types::InstrumentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 도지 패턴의 네 가지 변형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DojiType {
    /// 표준 도지
    Standard,
    /// 잠자리형 도지 (강세 반전 시그널)
    Dragonfly,
    /// 비석형 도지 (약세 반전 시그널)
    Gravestone,
    /// 긴다리형 도지 (높은 변동성 속 우유부단)
    LongLegged,
}

impl DojiType {
    /// 변형 우선순위 (높을수록 구체적).
    ///
    /// 한 캔들이 여러 변형을 동시에 만족하면 우선순위가 높은 쪽으로
    /// 판정합니다. 잠자리형과 비석형은 기하학적으로 상호 배타적이므로
    /// 같은 순위를 공유합니다.
    pub fn priority(self) -> u8 {
        match self {
            Self::LongLegged => 4,
            Self::Dragonfly => 3,
            Self::Gravestone => 3,
            Self::Standard => 1,
        }
    }

    /// 전체 변형 목록 (판정 순서).
    pub const ALL: [DojiType; 4] = [
        Self::LongLegged,
        Self::Dragonfly,
        Self::Gravestone,
        Self::Standard,
    ];
}

impl fmt::Display for DojiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Standard => "standard",
            Self::Dragonfly => "dragonfly",
            Self::Gravestone => "gravestone",
            Self::LongLegged => "longLegged",
        };
        write!(f, "{}", s)
    }
}

/// 패턴 발생 직전의 추세 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// 상승 추세
    Uptrend,
    /// 하락 추세
    Downtrend,
    /// 횡보
    #[default]
    Sideways,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uptrend => "uptrend",
            Self::Downtrend => "downtrend",
            Self::Sideways => "sideways",
        };
        write!(f, "{}", s)
    }
}

/// 패턴 주변 시장 컨텍스트.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PatternContext {
    /// 직전 추세
    pub trend: TrendDirection,
    /// 직전 윈도우 평균 대비 거래량 변화율 (%)
    pub volume_change_percent: f64,
    /// 지지/저항선 근접 여부
    pub near_support_resistance: bool,
}

/// 감지된 도지 패턴.
///
/// 생성 이후 불변입니다. 캔들 스냅샷과 컨텍스트를 함께 보관하므로
/// 원본 시계열 없이도 하위 분석이 가능합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DojiPattern {
    /// 패턴 고유 ID
    pub id: Uuid,
    /// 종목 코드
    pub instrument_id: InstrumentId,
    /// 종목 이름
    pub instrument_name: String,
    /// 패턴 캔들 시각
    pub timestamp: DateTime<Utc>,
    /// 변형 유형
    pub pattern_type: DojiType,
    /// 패턴 캔들 스냅샷
    pub candle: Candle,
    /// 유의성 점수 (0.0 ~ 1.0)
    pub significance: f64,
    /// 시장 컨텍스트
    pub context: PatternContext,
}
