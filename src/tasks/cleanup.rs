//! Cleanup Scheduler
//!
//! Background task that periodically removes expired cache entries and then
//! evicts down to capacity. The task is owned by a `CleanupScheduler`, which
//! cancels it on `stop()` or when dropped.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{CacheState, SharedState};
use crate::error::{CacheError, Result};

// == Sweep Report ==
/// What a single sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: usize,
    pub evicted: usize,
}

// == Sweep ==
/// Runs one maintenance pass: eager expiration, then eviction if still over capacity.
///
/// Hit and miss counters are left untouched.
pub fn sweep<K, V>(state: &mut CacheState<K, V>) -> SweepReport
where
    K: Eq + Hash + Clone,
{
    let expired = state.purge_expired();
    let evicted = if state.store.is_over_capacity() {
        state.enforce_capacity()
    } else {
        0
    };

    SweepReport { expired, evicted }
}

// == Cleanup Scheduler ==
/// Owns the periodic sweep task for one cache instance.
pub struct CleanupScheduler<K, V> {
    state: SharedState<K, V>,
    interval: Duration,
    cancellation: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl<K, V> CleanupScheduler<K, V> {
    /// Creates a stopped scheduler. `interval` must be non-zero.
    pub fn new(state: SharedState<K, V>, interval: Duration) -> Self {
        Self {
            state,
            interval,
            cancellation: CancellationToken::new(),
            handle: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Stop ==
    /// Cancels the sweep task. Idempotent.
    ///
    /// A sweep already holding the state lock finishes before this returns; no
    /// sweep starts afterwards.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        self.cancellation.cancel();
        // Wait out an in-flight sweep; the loop re-checks the token under the lock.
        drop(self.state.lock());
        handle.abort();

        info!("Cleanup task stopped");
    }
}

impl<K, V> CleanupScheduler<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    // == Start ==
    /// Spawns the sweep task on the current Tokio runtime.
    ///
    /// Starting a running scheduler is a no-op; a stopped one restarts with a
    /// fresh cancellation token.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|e| CacheError::NoRuntime(e.to_string()))?;

        self.cancellation = CancellationToken::new();
        let state = Arc::clone(&self.state);
        let cancel = self.cancellation.clone();
        let interval = self.interval;

        self.handle = Some(runtime.spawn(cleanup_loop(state, interval, cancel)));

        info!(
            "Starting cache cleanup task with interval of {} ms",
            interval.as_millis()
        );
        Ok(())
    }
}

impl<K, V> Drop for CleanupScheduler<K, V> {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("CleanupScheduler dropped while running; cancelling task");
        }
        self.stop();
    }
}

async fn cleanup_loop<K, V>(
    state: SharedState<K, V>,
    interval: Duration,
    cancel: CancellationToken,
) where
    K: Eq + Hash + Clone,
{
    // First sweep happens one full interval after start
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Cleanup loop cancelled");
                break;
            }
            _ = ticker.tick() => {
                let Some(report) = run_tick(&state, &cancel) else {
                    break;
                };

                if report.expired > 0 || report.evicted > 0 {
                    info!(
                        "Cache cleanup: removed {} expired and evicted {} entries",
                        report.expired, report.evicted
                    );
                } else {
                    debug!("Cache cleanup: nothing to remove");
                }
            }
        }
    }
}

/// Sweeps under the lock unless the scheduler was stopped meanwhile.
fn run_tick<K, V>(state: &SharedState<K, V>, cancel: &CancellationToken) -> Option<SweepReport>
where
    K: Eq + Hash + Clone,
{
    let mut guard = state.lock();
    if cancel.is_cancelled() {
        return None;
    }
    Some(sweep(&mut guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Ttl;

    fn shared(max_size: usize) -> SharedState<&'static str, &'static str> {
        CacheState::shared(max_size)
    }

    #[test]
    fn test_sweep_expires_then_evicts() {
        let mut state: CacheState<&str, u32> = CacheState::new(1);
        let ttl = Ttl::from_secs(60).unwrap();
        state.store.set("a", 1, ttl);
        state.store.set("b", 2, ttl);
        state.store.get("b");

        let report = sweep(&mut state);
        assert_eq!(report, SweepReport { expired: 0, evicted: 1 });
        assert!(state.store.has("b"));
        assert_eq!(state.stats.evictions, 1);
        assert_eq!(state.stats.total_hits, 0, "Sweeps never record hits");
        assert_eq!(state.stats.total_misses, 0, "Sweeps never record misses");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_removes_expired_entries() {
        let state = shared(100);
        state
            .lock()
            .store
            .set("expire_soon", "value", Ttl::from_millis(100).unwrap());

        let mut scheduler = CleanupScheduler::new(state.clone(), Duration::from_millis(50));
        scheduler.start().unwrap();
        assert!(scheduler.is_running());

        // Ticks at 50, 100 and 150 ms; the entry is stale from 101 ms on
        tokio::time::sleep(Duration::from_millis(175)).await;

        {
            let guard = state.lock();
            assert!(guard.store.is_empty(), "Expired entry should have been swept");
            assert_eq!(guard.stats.expirations, 1);
        }

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_preserves_valid_entries() {
        let state = shared(100);
        state
            .lock()
            .store
            .set("long_lived", "value", Ttl::from_secs(3600).unwrap());

        let mut scheduler = CleanupScheduler::new(state.clone(), Duration::from_secs(1));
        scheduler.start().unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;

        assert!(state.lock().store.has("long_lived"));
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_evicts_over_capacity() {
        let state = shared(2);
        {
            let mut guard = state.lock();
            let ttl = Ttl::from_secs(3600).unwrap();
            guard.store.set("a", "1", ttl);
            guard.store.set("b", "2", ttl);
            guard.store.set("c", "3", ttl);
        }

        let mut scheduler = CleanupScheduler::new(state.clone(), Duration::from_millis(10));
        scheduler.start().unwrap();

        tokio::time::sleep(Duration::from_millis(15)).await;

        {
            let mut guard = state.lock();
            assert_eq!(guard.store.len(), 2);
            assert!(!guard.store.has("a"), "Oldest zero-hit entry is evicted first");
            assert_eq!(guard.stats.evictions, 1);
        }

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_sweeps() {
        let state = shared(100);
        let mut scheduler = CleanupScheduler::new(state.clone(), Duration::from_millis(10));
        scheduler.start().unwrap();

        scheduler.stop();
        assert!(!scheduler.is_running());

        state
            .lock()
            .store
            .set("stale", "value", Ttl::from_millis(1).unwrap());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(state.lock().store.len(), 1, "No sweep may run after stop");

        // Stopping twice is harmless
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let state = shared(100);
        let mut scheduler = CleanupScheduler::new(state.clone(), Duration::from_millis(10));
        scheduler.start().unwrap();
        scheduler.stop();

        state
            .lock()
            .store
            .set("stale", "value", Ttl::from_millis(1).unwrap());
        scheduler.start().unwrap();
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(state.lock().store.is_empty());

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_task() {
        let state = shared(100);
        let mut scheduler = CleanupScheduler::new(state.clone(), Duration::from_millis(10));
        scheduler.start().unwrap();
        assert_eq!(Arc::strong_count(&state), 3);

        drop(scheduler);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(
            Arc::strong_count(&state),
            1,
            "Background task should have released the shared state"
        );
    }

    #[test]
    fn test_start_without_runtime_fails() {
        let mut scheduler = CleanupScheduler::new(shared(10), Duration::from_secs(1));
        assert!(matches!(scheduler.start(), Err(CacheError::NoRuntime(_))));
        assert!(!scheduler.is_running());
    }
}
