//! 설정 관리.
//!
//! 이 모듈은 두 층의 설정을 정의합니다:
//! - `ThresholdConfig` - 패턴 분류 임계값의 불변 스냅샷. 변경은 항상 새
//!   스냅샷을 만들고, 스냅샷마다 핑거프린트가 달라져 캐시 버킷이
//!   분리됩니다.
//! - `EngineConfig` - 파일/환경 변수에서 로드하는 엔진 전역 설정.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// 패턴 분류 임계값 스냅샷.
///
/// 기본값은 행태 픽스처로 보정된 상수입니다. 수치의 의미 검증은 하지
/// 않으며, 극단적인 값을 넣으면 분류 결과가 그만큼 극단적으로 변할
/// 뿐입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// 시가-종가 동등성 임계값 (상대 차이 %, 기본 0.1)
    pub equal_price_threshold: f64,
    /// 몸통/전체 범위 비율 임계값 (기본 0.1)
    pub body_threshold: f64,
    /// 긴다리형 최소 그림자 배수 (기본 2.0)
    pub long_leg_threshold: f64,
    /// 잠자리/비석형 그림자 허용 오차 (기준가 대비 %, 기본 1.5)
    pub shadow_tolerance_percent: f64,
    /// 긴다리형 판정의 최소 분해 단위 (기준가 대비 %, 기본 3.0)
    pub long_leg_unit_percent: f64,
    /// 추세 판정 룩백 캔들 수 (기본 5)
    pub trend_lookback: usize,
    /// 추세 판정 변화율 임계값 (%, 기본 3.0)
    pub trend_threshold_percent: f64,
    /// 거래량 비교 윈도우 크기 (기본 20)
    pub volume_window: usize,
    /// 지지/저항 근접 허용 오차 (%, 기본 1.0)
    pub sr_tolerance_percent: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            equal_price_threshold: 0.1,
            body_threshold: 0.1,
            long_leg_threshold: 2.0,
            shadow_tolerance_percent: 1.5,
            long_leg_unit_percent: 3.0,
            trend_lookback: 5,
            trend_threshold_percent: 3.0,
            volume_window: 20,
            sr_tolerance_percent: 1.0,
        }
    }
}

impl ThresholdConfig {
    /// 부분 변경을 병합한 새 스냅샷을 반환합니다.
    ///
    /// 기존 스냅샷은 변경되지 않습니다.
    pub fn merged(&self, overrides: &ThresholdOverrides) -> Self {
        Self {
            equal_price_threshold: overrides
                .equal_price_threshold
                .unwrap_or(self.equal_price_threshold),
            body_threshold: overrides.body_threshold.unwrap_or(self.body_threshold),
            long_leg_threshold: overrides
                .long_leg_threshold
                .unwrap_or(self.long_leg_threshold),
            shadow_tolerance_percent: overrides
                .shadow_tolerance_percent
                .unwrap_or(self.shadow_tolerance_percent),
            long_leg_unit_percent: overrides
                .long_leg_unit_percent
                .unwrap_or(self.long_leg_unit_percent),
            trend_lookback: overrides.trend_lookback.unwrap_or(self.trend_lookback),
            trend_threshold_percent: overrides
                .trend_threshold_percent
                .unwrap_or(self.trend_threshold_percent),
            volume_window: overrides.volume_window.unwrap_or(self.volume_window),
            sr_tolerance_percent: overrides
                .sr_tolerance_percent
                .unwrap_or(self.sr_tolerance_percent),
        }
    }

    /// 스냅샷 핑거프린트.
    ///
    /// 전체 필드의 정규 바이트 인코딩(f64 비트 패턴, usize는 u64
    /// big-endian)에 대한 SHA-256 해시입니다. 캐시 키의 일부로 사용되어
    /// 설정이 다른 결과가 한 버킷에 섞이지 않게 합니다.
    pub fn fingerprint(&self) -> ConfigFingerprint {
        let mut hasher = Sha256::new();
        for value in [
            self.equal_price_threshold,
            self.body_threshold,
            self.long_leg_threshold,
            self.shadow_tolerance_percent,
            self.long_leg_unit_percent,
            self.trend_threshold_percent,
            self.sr_tolerance_percent,
        ] {
            hasher.update(value.to_bits().to_be_bytes());
        }
        hasher.update((self.trend_lookback as u64).to_be_bytes());
        hasher.update((self.volume_window as u64).to_be_bytes());
        ConfigFingerprint(hex::encode(hasher.finalize()))
    }
}

/// 설정 스냅샷 핑거프린트.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigFingerprint(String);

impl ConfigFingerprint {
    /// 16진수 문자열 참조.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 로그용 축약 표현 (선두 12자).
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for ConfigFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 임계값 부분 변경.
///
/// `None` 필드는 기존 값을 유지합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdOverrides {
    pub equal_price_threshold: Option<f64>,
    pub body_threshold: Option<f64>,
    pub long_leg_threshold: Option<f64>,
    pub shadow_tolerance_percent: Option<f64>,
    pub long_leg_unit_percent: Option<f64>,
    pub trend_lookback: Option<usize>,
    pub trend_threshold_percent: Option<f64>,
    pub volume_window: Option<usize>,
    pub sr_tolerance_percent: Option<f64>,
}

impl ThresholdOverrides {
    /// 시가-종가 동등성 임계값을 설정합니다.
    pub fn with_equal_price_threshold(mut self, value: f64) -> Self {
        self.equal_price_threshold = Some(value);
        self
    }

    /// 긴다리형 그림자 배수를 설정합니다.
    pub fn with_long_leg_threshold(mut self, value: f64) -> Self {
        self.long_leg_threshold = Some(value);
        self
    }

    /// 그림자 허용 오차를 설정합니다.
    pub fn with_shadow_tolerance_percent(mut self, value: f64) -> Self {
        self.shadow_tolerance_percent = Some(value);
        self
    }

    /// 변경할 필드가 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// 엔진 전역 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 분류 임계값
    pub detection: ThresholdConfig,
    /// 워커 디스패치 설정
    pub worker: WorkerConfig,
    /// 스크리닝 설정
    pub screening: ScreeningConfig,
    /// 로깅 설정
    pub logging: LoggingSection,
}

/// 워커 디스패치 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// 시작 시 워커 디스패치 활성화 여부
    pub enabled: bool,
    /// 동시에 실행할 스캔 작업 상한
    pub pool_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            pool_size: 4,
        }
    }
}

/// 스크리닝 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// 종목 병렬 조회 폭
    pub max_parallelism: usize,
    /// 페이지 기본 크기
    pub default_limit: usize,
    /// 기본 조회 기간 (일)
    pub default_days_range: u32,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            max_parallelism: 8,
            default_limit: 20,
            default_days_range: 7,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSection {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl EngineConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값에서 시작하고, `DOJI__` 접두사 환경 변수가
    /// 모든 값을 오버라이드합니다 (예: `DOJI__WORKER__POOL_SIZE=8`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("DOJI")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
