//! 종목별 증분 감지 캐시.
//!
//! 캐시 키는 `(종목 ID, 설정 핑거프린트)`입니다. 설정이 바뀌면
//! 핑거프린트가 바뀌어 새 버킷이 생기므로, 이전 핑거프린트로 캐시된
//! 결과는 절대 제자리에서 변경되지 않습니다.
//!
//! 같은 키에 대한 동시 호출은 키별 Lock으로 직렬화하고(single-flight),
//! 서로 다른 키는 경합하지 않습니다.

use doji_core::{Candle, ConfigFingerprint, DojiPattern, InstrumentId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// 캐시 키.
pub type CacheKey = (InstrumentId, ConfigFingerprint);

/// 키 하나의 캐시 엔트리.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// 처리한 캔들 수
    pub candle_count: usize,
    /// 처리한 시퀀스의 첫 캔들 시각
    pub first_timestamp: DateTime<Utc>,
    /// 처리한 시퀀스의 마지막 캔들 시각
    pub last_timestamp: DateTime<Utc>,
    /// 감지된 패턴 (타임스탬프 오름차순)
    pub patterns: Vec<DojiPattern>,
}

/// 캐시 내부 상태 요약.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
    /// (종목, 핑거프린트) 엔트리 수
    pub entries: usize,
    /// 서로 다른 종목 수
    pub instruments: usize,
    /// 캐시된 패턴 총 수
    pub total_patterns: usize,
}

/// 한 번의 감지 호출이 해야 할 작업량.
#[derive(Debug, Clone)]
pub enum ScanPlan {
    /// 같은 시퀀스가 이미 처리됨 - 캐시 결과를 그대로 반환
    Hit(Vec<DojiPattern>),
    /// 캐시된 시퀀스의 확장 - `from` 이후 접미사만 처리
    Extend {
        /// 캐시된 접두사의 패턴
        cached: Vec<DojiPattern>,
        /// 새로 처리를 시작할 인덱스
        from: usize,
    },
    /// 관련 없는 시퀀스 - 전체를 새로 계산
    Fresh,
}

/// 키별 single-flight Lock 맵.
type FlightLockMap = Arc<RwLock<HashMap<CacheKey, Arc<Mutex<()>>>>>;

/// 종목별 증분 패턴 캐시.
#[derive(Debug, Default)]
pub struct PatternCache {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    flight_locks: FlightLockMap,
}

impl PatternCache {
    /// 빈 캐시를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 키의 single-flight Lock을 가져오거나 생성합니다.
    ///
    /// 호출자는 계획 수립부터 저장까지 이 Lock을 잡고 있어야 같은 키의
    /// 중복 계산과 접미사 병합 꼬임을 막을 수 있습니다.
    pub async fn flight_lock(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        let locks = self.flight_locks.read().await;
        if let Some(lock) = locks.get(key) {
            return lock.clone();
        }
        drop(locks);

        let mut locks = self.flight_locks.write().await;
        locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 주어진 시퀀스에 대한 작업 계획을 세웁니다.
    ///
    /// 확장으로 인정하려면 첫 캔들 시각과 캐시 경계 캔들 시각이 모두
    /// 일치해야 합니다. 그 외에는 전체 재계산입니다.
    pub async fn plan(&self, key: &CacheKey, candles: &[Candle]) -> ScanPlan {
        let entries = self.entries.read().await;
        let entry = match entries.get(key) {
            Some(entry) => entry,
            None => return ScanPlan::Fresh,
        };

        if entry.candle_count == 0 || candles.len() < entry.candle_count {
            return ScanPlan::Fresh;
        }

        let same_first = candles[0].timestamp == entry.first_timestamp;
        let same_boundary = candles[entry.candle_count - 1].timestamp == entry.last_timestamp;
        if !same_first || !same_boundary {
            return ScanPlan::Fresh;
        }

        if candles.len() == entry.candle_count {
            return ScanPlan::Hit(entry.patterns.clone());
        }

        ScanPlan::Extend {
            cached: entry.patterns.clone(),
            from: entry.candle_count,
        }
    }

    /// 시퀀스 전체에 대한 결과를 저장합니다.
    pub async fn store(&self, key: CacheKey, candles: &[Candle], patterns: Vec<DojiPattern>) {
        if candles.is_empty() {
            return;
        }

        let entry = CacheEntry {
            candle_count: candles.len(),
            first_timestamp: candles[0].timestamp,
            last_timestamp: candles[candles.len() - 1].timestamp,
            patterns,
        };

        let mut entries = self.entries.write().await;
        entries.insert(key, entry);
    }

    /// 캐시를 비웁니다.
    ///
    /// 종목을 지정하면 그 종목의 모든 핑거프린트 엔트리를, 지정하지
    /// 않으면 전체를 제거합니다.
    pub async fn clear(&self, instrument: Option<&InstrumentId>) {
        let mut entries = self.entries.write().await;
        match instrument {
            Some(id) => {
                entries.retain(|(key_id, _), _| key_id != id);
            }
            None => entries.clear(),
        }
    }

    /// 캐시 상태를 요약합니다.
    pub async fn status(&self) -> CacheStatus {
        let entries = self.entries.read().await;
        let mut instruments: Vec<&InstrumentId> = entries.keys().map(|(id, _)| id).collect();
        instruments.sort();
        instruments.dedup();

        CacheStatus {
            entries: entries.len(),
            instruments: instruments.len(),
            total_patterns: entries.values().map(|e| e.patterns.len()).sum(),
        }
    }
}
