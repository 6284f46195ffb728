//! 외부 데이터 소스 trait 정의.
//!
//! 엔진은 데이터를 직접 가져오지 않습니다. 캔들/유니버스/시장 국면/과거
//! 패턴은 모두 생성 시점에 주입되는 trait 구현을 통해 공급되며, 전송
//! 방식(HTTP, DB, 메모리)은 구현체의 책임입니다.

use crate::domain::candle::Candle;
use crate::domain::market_condition::MarketCondition;
use crate::domain::pattern::{DojiPattern, DojiType};
use crate::types::{Granularity, Instrument, InstrumentId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// 외부 소스 오류.
///
/// 상위 서비스 오류는 `Upstream`으로 감싸 가공 없이 호출자까지
/// 전파됩니다. 엔진 내부에서 재시도하거나 삼키지 않습니다.
#[derive(Debug, Error)]
pub enum SourceError {
    /// 데이터 조회 실패
    #[error("데이터 조회 실패: {0}")]
    Fetch(String),

    /// 대상 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 상위 서비스 오류 (가공 없이 전파)
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// 소스 작업 Result 타입.
pub type SourceResult<T> = Result<T, SourceError>;

/// 캔들 데이터 소스.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// 기간 내 캔들을 타임스탬프 오름차순으로 반환합니다.
    ///
    /// # 인자
    /// * `instrument_id` - 대상 종목
    /// * `start` - 조회 시작 시각 (포함)
    /// * `end` - 조회 종료 시각 (포함)
    /// * `granularity` - 캔들 집계 단위
    async fn candles(
        &self,
        instrument_id: &InstrumentId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> SourceResult<Vec<Candle>>;
}

/// 스크리닝 유니버스 소스.
#[async_trait]
pub trait UniverseSource: Send + Sync {
    /// 스크리닝 대상 전체 종목 목록.
    async fn instruments(&self) -> SourceResult<Vec<Instrument>>;
}

/// 시장 국면 소스.
///
/// 선택적 협력자입니다. 스크리너에 주입되지 않으면 국면 조건은
/// 건너뜁니다.
#[async_trait]
pub trait MarketRegimeSource: Send + Sync {
    /// 특정 종목/시점의 시장 국면.
    async fn regime_at(
        &self,
        instrument_id: &InstrumentId,
        at: DateTime<Utc>,
    ) -> SourceResult<MarketCondition>;
}

/// 과거 패턴 저장소.
///
/// 이 엔진이 과거에 출력한 패턴일 수도, 외부 저장소의 레코드일 수도
/// 있습니다. 성공률/분포/유사도 집계는 유형별 조회를 사용합니다.
#[async_trait]
pub trait HistoricalPatternStore: Send + Sync {
    /// 종목의 최근 `days_range`일 내 패턴.
    async fn patterns_for_instrument(
        &self,
        instrument_id: &InstrumentId,
        days_range: u32,
    ) -> SourceResult<Vec<DojiPattern>>;

    /// 유형별 최근 `days_range`일 내 패턴 (전 종목).
    async fn patterns_by_type(
        &self,
        doji_type: DojiType,
        days_range: u32,
    ) -> SourceResult<Vec<DojiPattern>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_passes_through_display() {
        let upstream = anyhow::anyhow!("universe service unavailable");
        let err = SourceError::from(upstream);
        // transparent 변형은 원본 메시지를 그대로 노출해야 함
        assert_eq!(err.to_string(), "universe service unavailable");
    }

    #[test]
    fn test_fetch_error_display() {
        let err = SourceError::Fetch("timeout".to_string());
        assert_eq!(err.to_string(), "데이터 조회 실패: timeout");
    }
}
