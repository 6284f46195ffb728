//! 스캔 작업 디스패치.
//!
//! 감지 로직 자체는 순수 동기 함수이고, 이 모듈은 그 *실행 위치*만
//! 바꿉니다. 워커 모드에서는 세마포어로 동시 실행 수를 제한한 블로킹
//! 풀에서 스캔을 돌리고, 인라인 모드에서는 호출 태스크에서 바로
//! 실행합니다. 어느 쪽이든 결과 내용과 순서는 같습니다.

use doji_core::{DojiError, DojiResult};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// 세마포어로 제한된 블로킹 스캔 풀.
#[derive(Debug, Clone)]
pub struct ScanPool {
    semaphore: Arc<Semaphore>,
}

impl ScanPool {
    /// 동시 실행 상한이 `pool_size`인 풀을 생성합니다.
    pub fn new(pool_size: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(pool_size.max(1))),
        }
    }

    /// 사용 가능한 동시 실행 슬롯 수.
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// CPU 작업을 블로킹 풀에서 실행합니다.
    ///
    /// 슬롯이 빌 때까지 대기한 뒤 `spawn_blocking`으로 실행합니다.
    /// join 실패는 `DojiError::Task`로 보고됩니다.
    pub async fn run<T, F>(&self, job: F) -> DojiResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| DojiError::Task(e.to_string()))?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        handle.await.map_err(|e| DojiError::Task(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_returns_job_output() {
        let pool = ScanPool::new(2);
        let result = pool.run(|| 21 * 2).await.unwrap();
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn test_zero_pool_size_clamped_to_one() {
        let pool = ScanPool::new(0);
        assert_eq!(pool.available_slots(), 1);
        // 그래도 작업은 실행되어야 합니다
        let result = pool.run(|| "ok").await.unwrap();
        assert_eq!(result, "ok");
    }

    #[tokio::test]
    async fn test_concurrent_jobs_all_complete() {
        let pool = ScanPool::new(2);
        let mut handles = Vec::new();
        for i in 0..8 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move { pool.run(move || i * i).await }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }
        results.sort();
        assert_eq!(results, vec![0, 1, 4, 9, 16, 25, 36, 49]);
    }
}
