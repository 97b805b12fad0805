//! Bounded pool of blocking workers.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::error;

use crate::error::{EngineError, EngineResult, Operation};

/// Runs CPU-bound requests on at most `size` blocking threads at a time.
///
/// Each request holds one permit for its whole run. A request that panics
/// fails alone; its permit is released and the pool keeps serving.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Workers not currently running a request.
    pub fn idle(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `job` on a worker and wait for its result.
    pub async fn run<T, F>(&self, operation: Operation, job: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| EngineError::failure(operation, format!("Worker pool closed: {e}")))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| {
            error!(%operation, "Worker task failed: {e}");
            EngineError::failure(operation, format!("Worker task failed: {e}"))
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_returns_job_result() {
        let pool = WorkerPool::new(2);
        let value = pool.run(Operation::Divide, || Ok(21 * 2)).await.unwrap();
        assert_eq!(value, 42);

        let err = pool
            .run::<(), _>(Operation::Divide, || {
                Err(EngineError::parameter(Operation::Divide, "bad"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parameter);
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let pool = WorkerPool::new(1);
        let err = pool
            .run::<(), _>(Operation::Mitigate, || panic!("numerical blow-up"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Failure);
        assert_eq!(err.operation(), Operation::Mitigate);

        // The single permit came back.
        assert_eq!(pool.idle(), 1);
        assert_eq!(pool.run(Operation::Mitigate, || Ok(1)).await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs = (0..8).map(|_| {
            let (running, peak) = (Arc::clone(&running), Arc::clone(&peak));
            pool.run(Operation::Combine, move || {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(20));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            })
        });
        for result in futures::future::join_all(jobs).await {
            result.unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        assert_eq!(WorkerPool::new(0).size(), 1);
    }
}
