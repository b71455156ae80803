//! Bounded-concurrency batch engine.
//!
//! [`run_batch`] fans a list of jobs out to a fixed pool of worker tasks and
//! fans their outcomes back in:
//!
//! ```text
//! producer ──► job channel (capacity 1) ──► worker 1..n ──► results  ──► drain ─► Vec<R>
//!                                                       └─► failures ──► drain ─► Vec<E>
//! ```
//!
//! Every job yields exactly one outcome. Failures are collected, never
//! short-circuit the batch, and are reported together once every job has
//! been attempted.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::config::Concurrency;

/// Aggregate outcome of a batch.
#[derive(Debug)]
pub struct BatchOutcome<R, E> {
    /// Values produced by successful jobs, in completion order.
    pub results: Vec<R>,
    /// Errors produced by failed jobs, in completion order.
    pub failures: Vec<E>,
    /// Number of worker tasks that were started.
    pub workers: usize,
}

impl<R, E> BatchOutcome<R, E> {
    fn empty() -> Self {
        Self {
            results: Vec::new(),
            failures: Vec::new(),
            workers: 0,
        }
    }

    /// Total number of jobs that reported an outcome.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Returns true if no job was processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if at least one job failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl<R, E: fmt::Display> BatchOutcome<R, E> {
    /// Splits the outcome into the successful results and, if anything
    /// failed, one error carrying every failure message.
    pub fn into_parts(self) -> (Vec<R>, Option<BatchError>) {
        let error = if self.failures.is_empty() {
            None
        } else {
            Some(BatchError::from_failures(&self.failures))
        };
        (self.results, error)
    }
}

/// Aggregate error for a batch with at least one failed job.
///
/// Displays as the newline-joined messages of all failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    messages: Vec<String>,
}

impl BatchError {
    /// Builds the aggregate from individual failures.
    pub fn from_failures<E: fmt::Display>(failures: &[E]) -> Self {
        Self {
            messages: failures.iter().map(ToString::to_string).collect(),
        }
    }

    /// Messages of the individual failures.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Number of failed jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if there are no failures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join("\n"))
    }
}

impl std::error::Error for BatchError {}

/// Runs `op` once for every job with at most `conn` calls in flight.
///
/// Exactly `min(conn, jobs.len())` workers are started; with no jobs the
/// function returns immediately without spawning anything. Each worker
/// processes one job at a time. Results and failures are unordered with
/// respect to `jobs`.
///
/// There is no cancellation: every job runs to success or failure. A panic
/// inside `op` is re-raised on the caller once the batch has settled.
pub async fn run_batch<J, R, E, F, Fut>(jobs: Vec<J>, conn: Concurrency, op: F) -> BatchOutcome<R, E>
where
    J: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(J) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let total = jobs.len();
    if total == 0 {
        tracing::debug!("batch has no jobs, no workers started");
        return BatchOutcome::empty();
    }

    let workers = conn.workers_for(total);
    tracing::debug!(jobs = total, workers, "dispatching batch");

    let (job_tx, job_rx) = mpsc::channel::<J>(1);
    let job_rx = Arc::new(Mutex::new(job_rx));
    let (result_tx, result_rx) = mpsc::unbounded_channel::<R>();
    let (failure_tx, failure_rx) = mpsc::unbounded_channel::<E>();

    let results_drain = tokio::spawn(drain(result_rx));
    let failures_drain = tokio::spawn(drain(failure_rx));

    // Dropping the sender at the end closes the job channel.
    let producer = tokio::spawn(async move {
        for job in jobs {
            if job_tx.send(job).await.is_err() {
                break;
            }
        }
    });

    let op = Arc::new(op);
    let mut handles = Vec::with_capacity(workers);
    for worker in 0..workers {
        let job_rx = Arc::clone(&job_rx);
        let op = Arc::clone(&op);
        let result_tx = result_tx.clone();
        let failure_tx = failure_tx.clone();

        handles.push(tokio::spawn(async move {
            let mut processed = 0usize;
            loop {
                let next = job_rx.lock().await.recv().await;
                let Some(job) = next else {
                    break;
                };
                match op(job).await {
                    Ok(result) => {
                        let _ = result_tx.send(result);
                    }
                    Err(failure) => {
                        let _ = failure_tx.send(failure);
                    }
                }
                processed += 1;
            }
            tracing::trace!(worker, processed, "worker finished");
        }));
    }

    // First barrier: every worker has exited and the producer is done.
    for handle in handles {
        settle(handle).await;
    }
    settle(producer).await;

    // Workers held the only other senders, so this closes both channels.
    drop(result_tx);
    drop(failure_tx);

    // Second barrier: both drains have consumed everything in flight.
    let results = settle(results_drain).await.unwrap_or_default();
    let failures = settle(failures_drain).await.unwrap_or_default();

    tracing::debug!(
        succeeded = results.len(),
        failed = failures.len(),
        "batch complete"
    );

    BatchOutcome {
        results,
        failures,
        workers,
    }
}

async fn drain<T>(mut rx: mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Some(item) = rx.recv().await {
        items.push(item);
    }
    items
}

/// Waits for a task, re-raising its panic if it had one.
async fn settle<T>(handle: JoinHandle<T>) -> Option<T> {
    match handle.await {
        Ok(value) => Some(value),
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => {
            tracing::error!("batch task did not complete: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn conn(n: usize) -> Concurrency {
        Concurrency::new(n).unwrap()
    }

    fn jobs(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("job-{i}")).collect()
    }

    #[tokio::test]
    async fn empty_batch_starts_no_workers() {
        let outcome: BatchOutcome<String, String> =
            run_batch(Vec::<String>::new(), conn(4), |job| async move { Ok(job) }).await;

        assert_eq!(outcome.workers, 0);
        assert!(outcome.is_empty());
        let (results, error) = outcome.into_parts();
        assert!(results.is_empty());
        assert!(error.is_none());
    }

    #[tokio::test]
    async fn every_job_succeeds_for_any_connection_count() {
        for total in [1, 2, 5, 17] {
            for limit in [1, 2, total, total + 3] {
                let outcome: BatchOutcome<String, String> =
                    run_batch(jobs(total), conn(limit), |job| async move { Ok(job) }).await;

                assert_eq!(outcome.workers, limit.min(total), "conn={limit} jobs={total}");
                let (results, error) = outcome.into_parts();
                assert!(error.is_none());
                assert_eq!(results.len(), total);

                let unique: HashSet<_> = results.iter().collect();
                assert_eq!(unique.len(), total, "each job processed exactly once");
            }
        }
    }

    #[tokio::test]
    async fn failing_jobs_are_reported_and_others_kept() {
        let failing: HashSet<String> = ["job-1", "job-4", "job-7"].iter().map(|s| s.to_string()).collect();
        let failing = Arc::new(failing);

        for limit in [1, 3, 10, 12] {
            let failing_ref = Arc::clone(&failing);
            let outcome = run_batch(jobs(10), conn(limit), move |job| {
                let failing = Arc::clone(&failing_ref);
                async move {
                    if failing.contains(&job) {
                        Err(format!("{job} failed"))
                    } else {
                        Ok(job)
                    }
                }
            })
            .await;

            assert_eq!(outcome.len(), 10);
            let (results, error) = outcome.into_parts();
            assert_eq!(results.len(), 7);
            let error = error.expect("batch should report failures");
            assert_eq!(error.len(), 3);
            for name in failing.iter() {
                assert!(error.to_string().contains(name.as_str()));
            }
        }
    }

    #[tokio::test]
    async fn single_failure_among_five() {
        let input: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();

        let outcome = run_batch(input, conn(2), |job| async move {
            if job == "c" {
                Err(format!("could not process {job}"))
            } else {
                Ok(job)
            }
        })
        .await;

        assert_eq!(outcome.workers, 2);
        assert_eq!(outcome.results.len(), 4);
        assert_eq!(outcome.failures, vec!["could not process c".to_string()]);

        let (results, error) = outcome.into_parts();
        let mut results = results;
        results.sort();
        assert_eq!(results, vec!["a", "b", "d", "e"]);
        assert_eq!(error.unwrap().to_string(), "could not process c");
    }

    #[tokio::test]
    async fn failure_messages_are_newline_joined() {
        let outcome: BatchOutcome<(), String> = run_batch(vec!["x", "y"], conn(1), |job| async move {
            Err(format!("{job} broke"))
        })
        .await;

        let (_, error) = outcome.into_parts();
        let message = error.unwrap().to_string();
        let mut lines: Vec<_> = message.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines, vec!["x broke", "y broke"]);
    }

    #[tokio::test]
    async fn in_flight_operations_never_exceed_limit() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (in_flight_op, peak_op) = (Arc::clone(&in_flight), Arc::clone(&peak));
        let outcome: BatchOutcome<usize, String> = run_batch((0..24).collect(), conn(3), move |job: usize| {
            let in_flight = Arc::clone(&in_flight_op);
            let peak = Arc::clone(&peak_op);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(job)
            }
        })
        .await;

        assert_eq!(outcome.results.len(), 24);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn one_connection_processes_sequentially_in_order() {
        let outcome: BatchOutcome<String, String> =
            run_batch(jobs(6), conn(1), |job| async move { Ok(job) }).await;

        assert_eq!(outcome.workers, 1);
        assert_eq!(outcome.results, jobs(6));
    }

    #[tokio::test]
    async fn duplicate_jobs_are_processed_independently() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_op = Arc::clone(&calls);

        let outcome: BatchOutcome<&str, String> = run_batch(vec!["dup", "dup", "dup"], conn(2), move |job| {
            let calls = Arc::clone(&calls_op);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(job)
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.results, vec!["dup", "dup", "dup"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn outcome_count_matches_jobs_on_multi_thread_runtime() {
        let outcome = run_batch((0..200).collect::<Vec<u32>>(), conn(8), |job| async move {
            tokio::task::yield_now().await;
            if job % 7 == 0 {
                Err(format!("job {job} failed"))
            } else {
                Ok(job)
            }
        })
        .await;

        assert_eq!(outcome.len(), 200);
        assert_eq!(outcome.failures.len(), 29);
        let mut seen: Vec<u32> = outcome.results.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 171);
    }

    #[tokio::test]
    #[should_panic(expected = "op exploded")]
    async fn panicking_operation_is_propagated() {
        let _: BatchOutcome<(), String> = run_batch(vec![1], conn(1), |job: i32| async move {
            if job == 1 {
                panic!("op exploded");
            }
            Ok(())
        })
        .await;
    }
}
