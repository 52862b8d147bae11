use std::sync::Arc;

use grounded_search_model::{ProbeError, RedirectProbe};
use tokio::select;
use tokio::sync::{Mutex, mpsc};
use tracing::Instrument;

use crate::deadline::BatchScope;

/// A URL to probe, tagged with the position of its attribution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ResolveJob {
    pub index: usize,
    pub url: String,
}

/// The outcome of one [`ResolveJob`].
#[derive(Debug)]
pub(crate) struct ResolveResult {
    pub index: usize,
    pub outcome: Result<String, ProbeError>,
}

type JobQueue = Arc<Mutex<mpsc::Receiver<ResolveJob>>>;

/// Spawns `count` workers that drain `jobs` until it's closed and
/// exhausted, or until the scope is cancelled.
pub(crate) fn spawn_workers<P: RedirectProbe>(
    count: usize,
    probe: &Arc<P>,
    jobs: mpsc::Receiver<ResolveJob>,
    results: &mpsc::Sender<ResolveResult>,
    scope: &BatchScope,
) {
    let jobs: JobQueue = Arc::new(Mutex::new(jobs));
    for id in 0..count {
        let worker = run_worker(
            Arc::clone(probe),
            Arc::clone(&jobs),
            results.clone(),
            scope.clone(),
        );
        tokio::spawn(worker.instrument(trace_span!("resolve worker", id)));
    }
}

async fn run_worker<P: RedirectProbe>(
    probe: Arc<P>,
    jobs: JobQueue,
    results: mpsc::Sender<ResolveResult>,
    mut scope: BatchScope,
) {
    trace!("started");
    loop {
        let job = {
            let mut jobs = jobs.lock().await;
            select! {
                biased;

                _ = scope.cancelled() => None,
                job = jobs.recv() => job,
            }
        };
        let Some(job) = job else {
            break;
        };

        let outcome = select! {
            biased;

            _ = scope.cancelled() => Err(ProbeError::cancelled()),
            outcome = probe.probe(&job.url) => outcome,
        };
        trace!("probed #{}: {outcome:?}", job.index);

        let result = ResolveResult {
            index: job.index,
            outcome,
        };
        if results.send(result).await.is_err() {
            // The batch has returned already.
            break;
        }
    }
    trace!("will terminate");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use grounded_search_model::ProbeErrorKind;
    use grounded_search_test_provider::{PresetProbe, TestProbe};

    use super::*;
    use crate::config::ResolverConfig;
    use crate::deadline::allocate;

    #[tokio::test]
    async fn test_one_result_per_job() {
        let mut probe = TestProbe::default();
        probe.add_route("http://a", PresetProbe::redirect_to("http://a2"));
        probe.add_route("http://b", PresetProbe::failure());
        let probe = Arc::new(probe);

        let (scope, _guard) = allocate(None, &ResolverConfig::default());
        let (job_tx, job_rx) = mpsc::channel(3);
        let (result_tx, mut result_rx) = mpsc::channel(3);
        spawn_workers(2, &probe, job_rx, &result_tx, &scope);
        drop(result_tx);

        for (index, url) in ["http://a", "http://b", "http://c"].iter().enumerate()
        {
            let url = url.to_string();
            job_tx.send(ResolveJob { index, url }).await.unwrap();
        }
        drop(job_tx);

        let mut results = vec![];
        while let Some(result) = result_rx.recv().await {
            results.push(result);
        }
        results.sort_by_key(|r| r.index);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].outcome.as_deref(), Ok("http://a2"));
        assert!(results[1].outcome.is_err());
        assert_eq!(results[2].outcome.as_deref(), Ok("http://c"));
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_mid_probe() {
        let mut probe = TestProbe::default();
        probe.add_route(
            "http://slow",
            PresetProbe::no_redirect().with_delay(Duration::from_secs(10)),
        );
        let probe = Arc::new(probe);

        let (scope, guard) = allocate(None, &ResolverConfig::default());
        let (job_tx, job_rx) = mpsc::channel(1);
        let (result_tx, mut result_rx) = mpsc::channel(1);
        spawn_workers(1, &probe, job_rx, &result_tx, &scope);
        drop(result_tx);

        let url = "http://slow".to_owned();
        job_tx.send(ResolveJob { index: 0, url }).await.unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(probe.in_flight(), 1);
        guard.cancel();

        let result = result_rx.recv().await.unwrap();
        let err = result.outcome.unwrap_err();
        assert_eq!(err.kind(), ProbeErrorKind::Cancelled);
        assert_eq!(probe.in_flight(), 0);

        // The worker stops taking jobs once cancelled.
        assert!(result_rx.recv().await.is_none());
    }
}
