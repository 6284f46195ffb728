//! 스크리닝 조건과 결과 타입.

use chrono::{DateTime, Utc};
use doji_core::{DojiType, InstrumentId, MarketCondition};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 결과 정렬 기준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// 지평 가격 변화율
    #[default]
    PriceChange,
    /// 지평 거래량 변화율
    VolumeChange,
    /// 패턴 발생 시각
    PatternDate,
    /// 유의성 점수
    Significance,
}

/// 정렬 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// 오름차순
    Asc,
    /// 내림차순
    #[default]
    Desc,
}

/// 스크리닝 조건.
///
/// 기본값은 전체 유형, 최근 7일, 가격 변화 내림차순, 20건, 1페이지입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenCriteria {
    /// 대상 패턴 유형 (빈 목록 = 전체)
    pub pattern_types: Vec<DojiType>,
    /// 조회 기간 (일)
    pub days_range: u32,
    /// 지평 가격 변화율 하한 (%)
    pub min_upward_percent: Option<f64>,
    /// 시장 국면 조건
    pub market_condition: Option<MarketCondition>,
    /// 정렬 기준
    pub sort_by: SortField,
    /// 정렬 방향
    pub sort_direction: SortDirection,
    /// 페이지 크기
    pub limit: usize,
    /// 페이지 번호 (1부터, 없으면 1)
    pub page: Option<usize>,
}

impl Default for ScreenCriteria {
    fn default() -> Self {
        Self {
            pattern_types: Vec::new(),
            days_range: 7,
            min_upward_percent: None,
            market_condition: None,
            sort_by: SortField::default(),
            sort_direction: SortDirection::default(),
            limit: 20,
            page: None,
        }
    }
}

impl ScreenCriteria {
    /// 대상 패턴 유형을 설정합니다.
    pub fn with_pattern_types(mut self, types: Vec<DojiType>) -> Self {
        self.pattern_types = types;
        self
    }

    /// 조회 기간을 설정합니다.
    pub fn with_days_range(mut self, days: u32) -> Self {
        self.days_range = days;
        self
    }

    /// 가격 변화율 하한을 설정합니다.
    pub fn with_min_upward_percent(mut self, percent: f64) -> Self {
        self.min_upward_percent = Some(percent);
        self
    }

    /// 시장 국면 조건을 설정합니다.
    pub fn with_market_condition(mut self, condition: MarketCondition) -> Self {
        self.market_condition = Some(condition);
        self
    }

    /// 정렬 기준과 방향을 설정합니다.
    pub fn with_sort(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort_by = field;
        self.sort_direction = direction;
        self
    }

    /// 페이지 크기를 설정합니다.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// 페이지 번호를 설정합니다.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// 유형이 조건에 부합하는지 판정합니다.
    pub fn matches_type(&self, doji_type: DojiType) -> bool {
        self.pattern_types.is_empty() || self.pattern_types.contains(&doji_type)
    }

    /// 유효 페이지 번호 (1 미만은 1로 보정).
    pub fn effective_page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
}

/// 스크리닝 결과 한 건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenResultItem {
    /// 종목 코드
    pub instrument_id: InstrumentId,
    /// 종목 이름
    pub instrument_name: String,
    /// 패턴 유형
    pub pattern_type: DojiType,
    /// 패턴 발생 시각
    pub pattern_date: DateTime<Utc>,
    /// 지평 가격 변화율 (%)
    pub price_change: f64,
    /// 지평 거래량 변화율 (%)
    pub volume_change: f64,
    /// 유의성 점수
    pub significance: f64,
    /// 전체 정렬 기준 순위 (1부터)
    pub rank: usize,
}

/// 스크리닝 결과 봉투.
///
/// `total`은 페이지네이션 전의 전체 부합 건수입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenReport {
    /// 요청 페이지의 결과
    pub items: Vec<ScreenResultItem>,
    /// 전체 부합 건수
    pub total: usize,
    /// 적용된 조건
    pub criteria: ScreenCriteria,
}

/// 패턴 알림 구독.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSubscription {
    /// 구독 ID
    pub id: Uuid,
    /// 대상 종목 (빈 목록 = 전체)
    pub instrument_ids: Vec<InstrumentId>,
    /// 대상 유형 (빈 목록 = 전체)
    pub pattern_types: Vec<DojiType>,
    /// 등록 시각
    pub created_at: DateTime<Utc>,
}
