use std::pin::pin;
use std::sync::Arc;

use grounded_search_model::{Attribution, RedirectProbe};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::Instrument;

use crate::config::ResolverConfig;
use crate::deadline::{self, BatchScope};
use crate::pool::{self, ResolveJob};

/// Resolves the redirecting URLs of attributions in batches.
///
/// Each call to [`Resolver::resolve_all`] is one independent batch with
/// its own workers and channels. Only the probe is shared between
/// batches.
#[derive(Debug)]
pub struct Resolver<P> {
    probe: Arc<P>,
    config: ResolverConfig,
}

impl<P> Clone for Resolver<P> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            probe: Arc::clone(&self.probe),
            config: self.config,
        }
    }
}

impl<P: RedirectProbe> Resolver<P> {
    /// Creates a resolver with the given probe and configuration.
    #[inline]
    pub fn new(probe: P, config: ResolverConfig) -> Self {
        Self {
            probe: Arc::new(probe),
            config,
        }
    }

    /// Returns the configuration of this resolver.
    #[inline]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Replaces the URL of every attribution with the target it redirects
    /// to, in place.
    ///
    /// Attributions with an empty URL are skipped. A URL that fails to
    /// resolve, or that is still pending when the batch deadline expires,
    /// is left unchanged; such failures are only logged and never
    /// surface to the caller. The batch deadline is derived from
    /// `parent_deadline`, see [`deadline::allocate`].
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the future cancels all
    /// in-flight probes of the batch, and attributions resolved so far
    /// keep their new URLs.
    pub async fn resolve_all(
        &self,
        parent_deadline: Option<Instant>,
        attributions: &mut [Attribution],
    ) {
        if attributions.is_empty() {
            return;
        }

        let jobs: Vec<_> = attributions
            .iter()
            .enumerate()
            .filter(|(_, attribution)| !attribution.url.is_empty())
            .map(|(index, attribution)| ResolveJob {
                index,
                url: attribution.url.clone(),
            })
            .collect();
        if jobs.is_empty() {
            trace!("no URL to resolve");
            return;
        }

        let (scope, guard) = deadline::allocate(parent_deadline, &self.config);
        let span = debug_span!("resolve batch", jobs = jobs.len());
        self.run_batch(jobs, &scope, attributions)
            .instrument(span)
            .await;
        guard.cancel();
    }

    async fn run_batch(
        &self,
        jobs: Vec<ResolveJob>,
        scope: &BatchScope,
        attributions: &mut [Attribution],
    ) {
        let expected = jobs.len();
        let (job_tx, job_rx) = mpsc::channel(expected);
        let (result_tx, mut result_rx) = mpsc::channel(expected);
        pool::spawn_workers(
            self.config.workers.min(expected),
            &self.probe,
            job_rx,
            &result_tx,
            scope,
        );
        drop(result_tx);

        for job in jobs {
            // The queue is sized to the batch, so this never waits.
            if job_tx.send(job).await.is_err() {
                warn!("all workers exited before the jobs were submitted");
                return;
            }
        }
        drop(job_tx);

        let mut deadline = pin!(sleep_until(scope.deadline()));
        let mut received = 0;
        while received < expected {
            let result = select! {
                biased;

                result = result_rx.recv() => result,
                _ = &mut deadline => {
                    warn!(
                        "batch deadline exceeded, {} of {expected} URLs left unresolved",
                        expected - received
                    );
                    break;
                }
            };
            let Some(result) = result else {
                warn!("workers exited with {} results missing", expected - received);
                break;
            };
            received += 1;

            let index = result.index;
            match result.outcome {
                Ok(url) if !url.is_empty() => {
                    let Some(attribution) = attributions.get_mut(index) else {
                        continue;
                    };
                    if attribution.url != url {
                        debug!("resolved #{index}: {} -> {url}", attribution.url);
                        attribution.url = url;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("failed to resolve URL #{index}: {err}");
                }
            }
        }
        trace!("collected {received} of {expected} results");
    }
}
