//! 엔진 공통 오류 타입.

use crate::domain::sources::SourceError;
use thiserror::Error;

/// 도지 엔진 최상위 오류.
///
/// 분류 규칙의 원칙에 따라 잘못된 캔들 데이터는 오류가 아니라 조용한
/// 제외로 처리합니다. 이 타입은 호출자 입력 검증 실패, 외부 소스 전파,
/// 디스패치 실패 같은 실제 실패만 다룹니다.
#[derive(Debug, Error)]
pub enum DojiError {
    /// 민감도 범위 오류
    #[error("잘못된 민감도: {value} (0.0 ~ 1.0 범위여야 합니다)")]
    InvalidSensitivity { value: f64 },

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidParameter(String),

    /// 외부 소스 에러
    #[error("소스 에러: {0}")]
    Source(#[from] SourceError),

    /// 워커 작업 실패
    #[error("워커 작업 실패: {0}")]
    Task(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(#[from] config::ConfigError),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 엔진 작업을 위한 Result 타입.
pub type DojiResult<T> = Result<T, DojiError>;

impl DojiError {
    /// 호출자 입력 문제로 생긴 오류인지 확인합니다.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidSensitivity { .. } | Self::InvalidParameter(_)
        )
    }

    /// 외부 소스에서 전파된 오류인지 확인합니다.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Source(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitivity_error_display() {
        let err = DojiError::InvalidSensitivity { value: 1.5 };
        assert!(err.to_string().contains("1.5"));
        assert!(err.is_invalid_input());
        assert!(!err.is_upstream());
    }

    #[test]
    fn test_source_error_conversion() {
        let source = SourceError::Fetch("connection refused".to_string());
        let err: DojiError = source.into();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_upstream_message_preserved() {
        let upstream = anyhow::anyhow!("universe 503");
        let err: DojiError = DojiError::Source(SourceError::Upstream(upstream));
        assert!(err.to_string().contains("universe 503"));
    }
}
