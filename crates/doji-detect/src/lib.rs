//! # Doji Detect
//!
//! 도지 패턴 감지 크레이트.
//!
//! 세 개의 층으로 구성됩니다:
//! - `geometry` - 캔들 기하 순수 함수 (몸통, 그림자, 상대 동등성)
//! - `classifier` - 네 가지 변형 판정과 유의성 점수
//! - `detector` - 시계열 감지 서비스 (컨텍스트 부착, 증분 캐시, 워커
//!   디스패치)

pub mod cache;
pub mod classifier;
pub mod detector;
pub mod dispatch;
pub mod geometry;

pub use cache::{CacheStatus, PatternCache};
pub use classifier::{classify, classify_with_sensitivity, ClassifiedDoji};
pub use detector::{scan, DojiPatternDetector};
pub use dispatch::ScanPool;
