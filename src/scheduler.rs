//! Single-flight scheduler for outbound registry queries
//!
//! WHOIS servers enforce informal per-IP rate limits; running one lookup at a
//! time with a floor delay between completions is the cheapest defense
//! against getting throttled or blocked. The registrar-API provider does not
//! go through this scheduler: its transport rate-limits per request.

use crate::error::{DomainScoutError, Result};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Notify};

/// Queued unit of work plus the continuation that receives its outcome
struct QueueTask<T> {
    operation: BoxFuture<'static, Result<T>>,
    completion: oneshot::Sender<Result<T>>,
}

struct SchedulerState<T> {
    queue: Mutex<VecDeque<QueueTask<T>>>,
    notify: Notify,
    delay_ms: AtomicU64,
}

/// FIFO scheduler that executes submitted async tasks strictly one at a time,
/// sleeping a configurable delay between completions.
///
/// A single dedicated worker loop drains an explicit mutex-guarded queue, so
/// concurrent producers cannot re-enter the processing path. A failing task
/// rejects only its own submitter; the queue keeps moving.
pub struct SerialScheduler<T> {
    state: Arc<SchedulerState<T>>,
    worker: tokio::task::JoinHandle<()>,
}

impl<T: Send + 'static> SerialScheduler<T> {
    /// Create a scheduler with the given inter-task delay and start its worker.
    pub fn new(delay: Duration) -> Self {
        let state = Arc::new(SchedulerState {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            delay_ms: AtomicU64::new(delay.as_millis() as u64),
        });

        let worker_state = Arc::clone(&state);
        let worker = tokio::spawn(async move {
            loop {
                let task = loop {
                    if let Some(task) = worker_state.queue.lock().pop_front() {
                        break task;
                    }
                    worker_state.notify.notified().await;
                };

                let outcome = task.operation.await;
                // submitter may have given up waiting; that is its business
                let _ = task.completion.send(outcome);

                let delay = Duration::from_millis(worker_state.delay_ms.load(Ordering::Relaxed));
                if !delay.is_zero() && !worker_state.queue.lock().is_empty() {
                    tokio::time::sleep(delay).await;
                }
            }
        });

        Self { state, worker }
    }

    /// Enqueue an operation. The task is queued at call time; the returned
    /// future resolves or rejects with the task's own outcome.
    ///
    /// Submission order is execution order.
    pub fn submit<F>(&self, operation: F) -> impl Future<Output = Result<T>>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        {
            let mut queue = self.state.queue.lock();
            queue.push_back(QueueTask {
                operation: Box::pin(operation),
                completion: tx,
            });
        }
        self.state.notify.notify_one();

        async move {
            rx.await.unwrap_or_else(|_| {
                Err(DomainScoutError::internal(
                    "scheduled task was canceled before it ran",
                ))
            })
        }
    }

    /// Update the inter-task delay for subsequently processed tasks.
    /// A wait already in progress keeps its old duration.
    pub fn set_delay(&self, delay: Duration) {
        self.state
            .delay_ms
            .store(delay.as_millis() as u64, Ordering::Relaxed);
    }

    /// Current inter-task delay.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.state.delay_ms.load(Ordering::Relaxed))
    }

    /// Number of tasks waiting in the queue (excluding any task in flight).
    pub fn size(&self) -> usize {
        self.state.queue.lock().len()
    }

    /// Drop all pending tasks. The task currently executing is unaffected;
    /// canceled submitters receive an error.
    pub fn clear(&self) {
        self.state.queue.lock().clear();
    }
}

impl<T> Drop for SerialScheduler<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    #[tokio::test]
    async fn test_tasks_run_in_submission_order() {
        let scheduler = SerialScheduler::new(Duration::ZERO);
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..5usize {
            let log = Arc::clone(&log);
            handles.push(scheduler.submit(async move {
                log.lock().push(i);
                Ok(i)
            }));
        }
        let results = futures::future::join_all(handles).await;

        assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);
        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(result.unwrap(), i);
        }
    }

    #[tokio::test]
    async fn test_never_two_tasks_in_flight() {
        let scheduler = SerialScheduler::new(Duration::ZERO);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            handles.push(scheduler.submit(async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }));
        }
        futures::future::join_all(handles).await;

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delay_separates_completions() {
        let scheduler = SerialScheduler::new(Duration::from_millis(40));
        let stamps = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let stamps = Arc::clone(&stamps);
            handles.push(scheduler.submit(async move {
                stamps.lock().push(Instant::now());
                Ok(())
            }));
        }
        futures::future::join_all(handles).await;

        let stamps = stamps.lock();
        for pair in stamps.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(40));
        }
    }

    #[tokio::test]
    async fn test_failed_task_does_not_stall_queue() {
        let scheduler: SerialScheduler<u32> = SerialScheduler::new(Duration::ZERO);

        let failing = scheduler.submit(async { Err(DomainScoutError::internal("boom")) });
        let following = scheduler.submit(async { Ok(7) });

        let (failed, ok) = tokio::join!(failing, following);
        assert!(failed.is_err());
        assert_eq!(ok.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_clear_cancels_pending_only() {
        let scheduler: SerialScheduler<u32> = SerialScheduler::new(Duration::ZERO);

        // occupy the worker so later submissions stay queued
        let gate = Arc::new(Notify::new());
        let release = Arc::clone(&gate);
        let in_flight = scheduler.submit(async move {
            gate.notified().await;
            Ok(1)
        });
        let in_flight = tokio::spawn(in_flight);
        tokio::time::sleep(Duration::from_millis(10)).await;

        let pending = tokio::spawn(scheduler.submit(async { Ok(2) }));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(scheduler.size(), 1);

        scheduler.clear();
        assert_eq!(scheduler.size(), 0);

        release.notify_one();
        assert_eq!(in_flight.await.unwrap().unwrap(), 1);
        assert!(pending.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn test_set_delay_applies_to_later_tasks() {
        let scheduler: SerialScheduler<()> = SerialScheduler::new(Duration::from_millis(5));
        scheduler.set_delay(Duration::from_millis(30));
        assert_eq!(scheduler.delay(), Duration::from_millis(30));

        let stamps = Arc::new(Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for _ in 0..2 {
            let stamps = Arc::clone(&stamps);
            handles.push(scheduler.submit(async move {
                stamps.lock().push(Instant::now());
                Ok(())
            }));
        }
        futures::future::join_all(handles).await;

        let stamps = stamps.lock();
        assert!(stamps[1].duration_since(stamps[0]) >= Duration::from_millis(30));
    }
}
