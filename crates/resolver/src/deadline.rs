//! Deadline allocation for a resolution batch.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::ResolverConfig;

/// The time bound and cancellation signal of one batch.
///
/// Every worker of the batch holds its own clone.
#[derive(Clone, Debug)]
pub struct BatchScope {
    deadline: Instant,
    cancel_rx: watch::Receiver<bool>,
}

impl BatchScope {
    /// Returns the instant by which the batch must be done.
    #[inline]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Returns `true` if the batch has been cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    /// Waits until the batch is cancelled.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe.
    pub async fn cancelled(&mut self) {
        // A dropped guard counts as a cancellation too.
        self.cancel_rx.wait_for(|cancelled| *cancelled).await.ok();
    }
}

/// Cancels the associated [`BatchScope`] when consumed or dropped.
#[derive(Debug)]
#[must_use = "dropping the guard cancels the batch immediately"]
pub struct CancelGuard {
    cancel_tx: watch::Sender<bool>,
}

impl CancelGuard {
    /// Cancels the batch.
    #[inline]
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.cancel_tx.send_replace(true);
    }
}

// About 30 years, well within the range of every platform clock.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Returns the instant `duration` after `now`.
///
/// Durations too large to represent, such as [`Duration::MAX`], saturate
/// to a far-future instant instead of overflowing.
pub fn instant_after(now: Instant, duration: Duration) -> Instant {
    now.checked_add(duration.min(FAR_FUTURE))
        .unwrap_or(now)
}

/// Derives the scope of one batch from the caller's deadline.
///
/// The batch never outlives `parent_deadline`, and never takes longer
/// than the configured cap even if the caller has more time left. A
/// caller without a deadline gets the default budget.
pub fn allocate(
    parent_deadline: Option<Instant>,
    config: &ResolverConfig,
) -> (BatchScope, CancelGuard) {
    let now = Instant::now();
    let deadline = match parent_deadline {
        Some(parent)
            if parent.saturating_duration_since(now) > config.batch_cap =>
        {
            instant_after(now, config.batch_cap)
        }
        Some(parent) => parent,
        None => instant_after(now, config.default_batch_budget),
    };
    trace!(
        "allocated batch deadline in {:?}",
        deadline.saturating_duration_since(now)
    );

    let (cancel_tx, cancel_rx) = watch::channel(false);
    (
        BatchScope {
            deadline,
            cancel_rx,
        },
        CancelGuard { cancel_tx },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfigBuilder;

    #[tokio::test(start_paused = true)]
    async fn test_short_parent_deadline_is_reused() {
        let config = ResolverConfig::default();
        let parent = Instant::now() + Duration::from_secs(5);
        let (scope, _guard) = allocate(Some(parent), &config);
        assert_eq!(scope.deadline(), parent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_deadline_at_cap_is_reused() {
        let config = ResolverConfig::default();
        let parent = Instant::now() + Duration::from_secs(20);
        let (scope, _guard) = allocate(Some(parent), &config);
        assert_eq!(scope.deadline(), parent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_parent_deadline_is_capped() {
        let config = ResolverConfig::default();
        let now = Instant::now();
        let parent = now + Duration::from_secs(60);
        let (scope, _guard) = allocate(Some(parent), &config);
        assert_eq!(scope.deadline(), now + Duration::from_secs(20));
        assert!(scope.deadline() < parent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_parent_deadline() {
        let config = ResolverConfig::default();
        let now = Instant::now();
        let (scope, _guard) = allocate(None, &config);
        assert_eq!(scope.deadline(), now + Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_parent_deadline() {
        let config = ResolverConfig::default();
        let parent = Instant::now();
        tokio::time::advance(Duration::from_secs(1)).await;
        let (scope, _guard) = allocate(Some(parent), &config);
        assert_eq!(scope.deadline(), parent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_budget_saturates() {
        let config = ResolverConfigBuilder::new()
            .with_default_batch_budget(Duration::MAX)
            .with_batch_cap(Duration::MAX)
            .build();
        let now = Instant::now();

        let (scope, _guard) = allocate(None, &config);
        assert_eq!(scope.deadline(), now + FAR_FUTURE);

        let parent = now + Duration::from_secs(3600);
        let (scope, _guard) = allocate(Some(parent), &config);
        assert_eq!(scope.deadline(), parent);
    }

    #[test]
    fn test_instant_after() {
        let now = Instant::now();
        assert_eq!(
            instant_after(now, Duration::from_secs(15)),
            now + Duration::from_secs(15)
        );
        assert!(instant_after(now, Duration::MAX) > now);
    }

    #[tokio::test]
    async fn test_cancel_guard() {
        let config = ResolverConfig::default();
        let (mut scope, guard) = allocate(None, &config);
        let mut other = scope.clone();
        assert!(!scope.is_cancelled());

        guard.cancel();
        assert!(scope.is_cancelled());
        scope.cancelled().await;
        other.cancelled().await;
    }

    #[tokio::test]
    async fn test_dropped_guard_cancels() {
        let config = ResolverConfig::default();
        let (mut scope, guard) = allocate(None, &config);
        drop(guard);
        scope.cancelled().await;
        assert!(scope.is_cancelled());
    }
}
