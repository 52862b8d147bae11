use std::time::Duration;

/// Default number of concurrent workers per batch.
pub const DEFAULT_WORKERS: usize = 8;
/// Default timeout of a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
/// Default cap of a batch when the caller has more time than that left.
pub const DEFAULT_BATCH_CAP: Duration = Duration::from_secs(20);
/// Default budget of a batch when the caller has no deadline.
pub const DEFAULT_BATCH_BUDGET: Duration = Duration::from_secs(15);

/// Builder for [`ResolverConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResolverConfigBuilder {
    workers: Option<usize>,
    probe_timeout: Option<Duration>,
    batch_cap: Option<Duration>,
    default_batch_budget: Option<Duration>,
}

impl ResolverConfigBuilder {
    /// Creates a builder with every value left at its default.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of workers. Zero is treated as one.
    #[inline]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Sets the timeout of a single probe.
    #[inline]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    /// Sets the longest time a batch may take when the caller's own
    /// deadline is further away.
    #[inline]
    pub fn with_batch_cap(mut self, cap: Duration) -> Self {
        self.batch_cap = Some(cap);
        self
    }

    /// Sets the time a batch may take when the caller has no deadline.
    #[inline]
    pub fn with_default_batch_budget(mut self, budget: Duration) -> Self {
        self.default_batch_budget = Some(budget);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> ResolverConfig {
        ResolverConfig {
            workers: self.workers.unwrap_or(DEFAULT_WORKERS).max(1),
            probe_timeout: self.probe_timeout.unwrap_or(DEFAULT_PROBE_TIMEOUT),
            batch_cap: self.batch_cap.unwrap_or(DEFAULT_BATCH_CAP),
            default_batch_budget: self
                .default_batch_budget
                .unwrap_or(DEFAULT_BATCH_BUDGET),
        }
    }
}

/// Tunables of the redirect resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResolverConfig {
    pub(crate) workers: usize,
    pub(crate) probe_timeout: Duration,
    pub(crate) batch_cap: Duration,
    pub(crate) default_batch_budget: Duration,
}

impl ResolverConfig {
    /// Returns the number of workers.
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the timeout of a single probe.
    #[inline]
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }
}

impl Default for ResolverConfig {
    #[inline]
    fn default() -> Self {
        ResolverConfigBuilder::new().build()
    }
}
