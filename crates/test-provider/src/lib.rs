//! Local fake providers and probes for testing purpose.

mod preset;

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use grounded_search_model::{
    ErrorKind, GenerationProvider, GenerationRequest, GroundedResponse,
    ProbeError, ProviderError, RedirectProbe,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: String,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A local fake generation provider for testing purpose.
///
/// Before sending requests, you need to setup the responses keyed by the
/// prompts they answer. Requesting a prompt without a preset fails with
/// [`ErrorKind::NoContent`], and preset failures fail with
/// [`ErrorKind::Server`].
#[derive(Clone, Default)]
pub struct TestGenerationProvider {
    presets: HashMap<String, PresetResponse>,
    delay: Option<Duration>,
}

impl TestGenerationProvider {
    #[inline]
    pub fn add_response<S: Into<String>>(
        &mut self,
        prompt: S,
        response: GroundedResponse,
    ) {
        self.presets
            .insert(prompt.into(), PresetResponse::Response(response));
    }

    #[inline]
    pub fn add_failure<S: Into<String>, M: Into<String>>(
        &mut self,
        prompt: S,
        message: M,
    ) {
        self.presets
            .insert(prompt.into(), PresetResponse::Failure(message.into()));
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }
}

impl GenerationProvider for TestGenerationProvider {
    type Error = crate::Error;

    fn generate(
        &self,
        req: &GenerationRequest,
    ) -> impl Future<Output = Result<GroundedResponse, Self::Error>> + Send + 'static
    {
        let preset = self.presets.get(&req.prompt).cloned();
        let delay = self.delay.unwrap_or(Duration::from_millis(1));
        async move {
            sleep(delay).await;
            match preset {
                Some(PresetResponse::Response(response)) => Ok(response),
                Some(PresetResponse::Failure(message)) => Err(Error {
                    message,
                    kind: ErrorKind::Server,
                }),
                None => Err(Error {
                    message: "no preset for the prompt".to_owned(),
                    kind: ErrorKind::NoContent,
                }),
            }
        }
    }
}

#[derive(Default)]
struct ProbeStats {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

// Keeps `in_flight` accurate even when a probe is dropped halfway.
struct InFlight(Arc<ProbeStats>);

impl InFlight {
    fn enter(stats: Arc<ProbeStats>) -> Self {
        stats.calls.fetch_add(1, Ordering::SeqCst);
        let current = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.max_in_flight.fetch_max(current, Ordering::SeqCst);
        Self(stats)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A local fake redirect probe for testing purpose.
///
/// URLs without a preset don't redirect. Clones share their call
/// statistics, so you can hand a clone to the code under test and
/// inspect the original afterwards.
#[derive(Clone, Default)]
pub struct TestProbe {
    routes: HashMap<String, PresetProbe>,
    stats: Arc<ProbeStats>,
}

impl TestProbe {
    #[inline]
    pub fn add_route<S: Into<String>>(&mut self, url: S, preset: PresetProbe) {
        self.routes.insert(url.into(), preset);
    }

    /// Returns how many probes have been started.
    #[inline]
    pub fn calls(&self) -> usize {
        self.stats.calls.load(Ordering::SeqCst)
    }

    /// Returns how many probes are running right now.
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.stats.in_flight.load(Ordering::SeqCst)
    }

    /// Returns the highest number of probes that ran at the same time.
    #[inline]
    pub fn max_in_flight(&self) -> usize {
        self.stats.max_in_flight.load(Ordering::SeqCst)
    }
}

impl RedirectProbe for TestProbe {
    fn probe(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<String, ProbeError>> + Send + 'static
    {
        let url = url.to_owned();
        let preset = self
            .routes
            .get(&url)
            .cloned()
            .unwrap_or_else(PresetProbe::no_redirect);
        let stats = Arc::clone(&self.stats);
        async move {
            let _in_flight = InFlight::enter(stats);
            sleep(preset.delay).await;
            match preset.outcome {
                PresetOutcome::RedirectTo(target) => Ok(target),
                PresetOutcome::NoRedirect => Ok(url),
                PresetOutcome::Failure => Err(ProbeError::transport()
                    .with_reason(format!("connection refused: {url}"))),
            }
        }
    }
}
