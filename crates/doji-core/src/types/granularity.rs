//! 캔들 집계 단위.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 캔들 하나가 집계하는 시간 단위.
///
/// 도지 스크리닝은 일봉 중심이므로 기본값은 `Day`입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// 분봉
    Minute,
    /// 시간봉
    Hour,
    /// 일봉
    #[default]
    Day,
    /// 주봉
    Week,
}

impl Granularity {
    /// 단위 하나가 차지하는 시간.
    pub fn duration(self) -> Duration {
        match self {
            Self::Minute => Duration::minutes(1),
            Self::Hour => Duration::hours(1),
            Self::Day => Duration::days(1),
            Self::Week => Duration::weeks(1),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Minute => "1m",
            Self::Hour => "1h",
            Self::Day => "1d",
            Self::Week => "1w",
        };
        write!(f, "{}", s)
    }
}
