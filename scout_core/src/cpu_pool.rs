//! Dedicated rayon pool for local text analysis.

use crate::error::ProviderError;
use once_cell::sync::Lazy;
use rayon::ThreadPool;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Jobs slower than this are logged at info.
const SLOW_JOB: Duration = Duration::from_millis(500);

/// One core stays free for the async runtime.
static WORKERS: Lazy<usize> = Lazy::new(|| {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(4)
        .clamp(2, 8)
});

/// `None` when the pool could not be built; jobs then run on the caller.
static POOL: Lazy<Option<ThreadPool>> = Lazy::new(|| {
    rayon::ThreadPoolBuilder::new()
        .num_threads(*WORKERS)
        .thread_name(|idx| format!("scout-cpu-{idx}"))
        .build()
        .map_err(|err| {
            warn!(target: "scout.cpu_pool", error = %err, "CPU pool unavailable, running jobs inline");
        })
        .ok()
});

static QUEUED: AtomicUsize = AtomicUsize::new(0);

/// Counts a job as queued until dropped.
struct Ticket {
    label: &'static str,
    started: Instant,
}

impl Ticket {
    fn issue(label: &'static str) -> Self {
        let depth = QUEUED.fetch_add(1, Ordering::Relaxed) + 1;
        if depth > *WORKERS * 2 {
            info!(target: "scout.cpu_pool", job = label, depth, workers = *WORKERS, "CPU backlog growing");
        } else {
            debug!(target: "scout.cpu_pool", job = label, depth, "CPU job queued");
        }
        Self {
            label,
            started: Instant::now(),
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let depth = QUEUED.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
        let elapsed = self.started.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;
        if elapsed > SLOW_JOB {
            info!(target: "scout.cpu_pool", job = self.label, depth, elapsed_ms, "slow CPU job finished");
        } else {
            debug!(target: "scout.cpu_pool", job = self.label, depth, elapsed_ms, "CPU job finished");
        }
    }
}

/// Text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|msg| (*msg).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn run_caught<F, R>(label: &'static str, job: F) -> Result<R, ProviderError>
where
    F: FnOnce() -> Result<R, ProviderError>,
{
    catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
        Err(ProviderError::Other(format!(
            "{} panicked: {}",
            label,
            panic_message(payload.as_ref())
        )))
    })
}

/// Run `job` off the async runtime. Panics come back as errors.
pub async fn spawn_cpu<F, R>(label: &'static str, job: F) -> Result<R, ProviderError>
where
    F: FnOnce() -> Result<R, ProviderError> + Send + 'static,
    R: Send + 'static,
{
    let ticket = Ticket::issue(label);
    let Some(pool) = POOL.as_ref() else {
        let result = run_caught(label, job);
        drop(ticket);
        return result;
    };

    let (tx, rx) = oneshot::channel();
    pool.spawn(move || {
        let result = run_caught(label, job);
        drop(ticket);
        let _ = tx.send(result);
    });
    rx.await
        .map_err(|_| ProviderError::Other(format!("{} was dropped by the CPU pool", label)))?
}

pub fn worker_count() -> usize {
    *WORKERS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_cpu_returns_value() {
        let words = spawn_cpu("count", || Ok("a b c".split_whitespace().count()))
            .await
            .unwrap();
        assert_eq!(words, 3);
        assert!(worker_count() >= 2);
    }

    #[tokio::test]
    async fn test_spawn_cpu_catches_panics() {
        let err = spawn_cpu::<_, ()>("explode", || panic!("boom"))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("explode panicked"));
        assert!(message.contains("boom"));
    }
}
