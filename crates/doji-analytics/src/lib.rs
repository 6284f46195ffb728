//! # Doji Analytics
//!
//! 감지된 도지 패턴의 사후 분석 크레이트.
//!
//! - `movement` - 발생 후 가격/거래량 움직임, 유형별 성공률과 분포,
//!   유사 패턴 검색
//! - `similarity` - 정규화 형태 + 컨텍스트 기반 패턴 유사도

pub mod movement;
pub mod similarity;

pub use movement::MovementAnalyzer;
pub use similarity::similarity;
