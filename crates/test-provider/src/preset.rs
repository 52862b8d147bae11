use std::time::Duration;

use grounded_search_model::GroundedResponse;
use serde::{Deserialize, Serialize};

/// The preset outcome of a generation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetResponse {
    /// The request succeeds with a response.
    #[serde(rename = "response")]
    Response(GroundedResponse),
    /// The request fails with a message.
    #[serde(rename = "failure")]
    Failure(String),
}

/// What a preset probe reports.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PresetOutcome {
    /// The URL redirects to the given target.
    RedirectTo(String),
    /// The URL doesn't redirect.
    NoRedirect,
    /// The probe fails with a transport error.
    Failure,
}

/// The preset behavior of probing one URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PresetProbe {
    /// The outcome of the probe.
    pub outcome: PresetOutcome,
    /// How long the probe takes.
    pub delay: Duration,
}

impl PresetProbe {
    /// Creates a probe that reports a redirect to `target`.
    #[inline]
    pub fn redirect_to<S: Into<String>>(target: S) -> Self {
        Self::with_outcome(PresetOutcome::RedirectTo(target.into()))
    }

    /// Creates a probe that reports no redirect.
    #[inline]
    pub fn no_redirect() -> Self {
        Self::with_outcome(PresetOutcome::NoRedirect)
    }

    /// Creates a probe that fails.
    #[inline]
    pub fn failure() -> Self {
        Self::with_outcome(PresetOutcome::Failure)
    }

    #[inline]
    fn with_outcome(outcome: PresetOutcome) -> Self {
        Self {
            outcome,
            delay: Duration::from_millis(1),
        }
    }

    /// Sets how long the probe takes.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}
