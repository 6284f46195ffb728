//! # Doji Core
//!
//! 도지 패턴 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 엔진 전반에서 사용되는 기본 타입을 제공합니다:
//! - OHLCV 캔들 및 유효성 검사
//! - 도지 패턴 변형과 컨텍스트 타입
//! - 움직임 분석 결과 타입
//! - 주입형 외부 데이터 소스 trait
//! - 임계값 스냅샷 및 핑거프린트
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
