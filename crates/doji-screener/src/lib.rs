//! # Doji Screener
//!
//! 시장 전체 도지 스크리닝 크레이트.
//!
//! - `criteria` - 스크리닝 조건, 결과 항목, 구독 타입
//! - `screener` - 유니버스 수집, 필터링, 정렬, 페이지네이션 파이프라인

pub mod criteria;
pub mod screener;

pub use criteria::{
    PatternSubscription, ScreenCriteria, ScreenReport, ScreenResultItem, SortDirection, SortField,
};
pub use screener::{DojiScreener, UpwardPattern};
