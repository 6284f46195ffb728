//! 종목 식별 타입.
//!
//! 이 모듈은 스크리닝 대상 종목 관련 타입을 정의합니다:
//! - `InstrumentId` - 데이터 소스가 부여한 종목 코드
//! - `Instrument` - 코드와 표시 이름의 쌍

use serde::{Deserialize, Serialize};
use std::fmt;

/// 종목 식별자.
///
/// 데이터 소스가 부여한 문자열 코드를 감싸는 newtype입니다.
/// 예: 한국 주식의 "005930", 미국 주식의 "AAPL".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(String);

impl InstrumentId {
    /// 새 식별자를 생성합니다.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 내부 문자열 참조를 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for InstrumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// 스크리닝 대상 종목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// 종목 코드
    pub id: InstrumentId,
    /// 표시 이름
    pub name: String,
}

impl Instrument {
    /// 새 종목을 생성합니다.
    pub fn new(id: impl Into<InstrumentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_id_from_str() {
        let id = InstrumentId::from("005930");
        assert_eq!(id.as_str(), "005930");
        assert_eq!(id.to_string(), "005930");
    }

    #[test]
    fn test_instrument_display() {
        let instrument = Instrument::new("005930", "삼성전자");
        assert_eq!(instrument.to_string(), "삼성전자(005930)");
    }

    #[test]
    fn test_instrument_id_serde_transparent() {
        let id = InstrumentId::new("AAPL");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"AAPL\"");
    }
}
