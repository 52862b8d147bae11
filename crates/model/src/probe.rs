use std::error::Error;
use std::fmt::{self, Display};

/// The kind of a probe failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbeErrorKind {
    /// The connection or the request failed.
    Transport,
    /// The probe did not complete within its own timeout.
    Timeout,
    /// The batch the probe belongs to was cancelled.
    Cancelled,
}

impl Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeErrorKind::Transport => write!(f, "transport error"),
            ProbeErrorKind::Timeout => write!(f, "probe timed out"),
            ProbeErrorKind::Cancelled => write!(f, "probe cancelled"),
        }
    }
}

/// Describes a failed probe.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProbeError {
    kind: ProbeErrorKind,
    reason: Option<String>,
}

impl ProbeError {
    /// Creates a new error with the `Transport` kind.
    #[inline]
    pub fn transport() -> Self {
        Self {
            kind: ProbeErrorKind::Transport,
            reason: None,
        }
    }

    /// Creates a new error with the `Timeout` kind.
    #[inline]
    pub fn timeout() -> Self {
        Self {
            kind: ProbeErrorKind::Timeout,
            reason: None,
        }
    }

    /// Creates a new error with the `Cancelled` kind.
    #[inline]
    pub fn cancelled() -> Self {
        Self {
            kind: ProbeErrorKind::Cancelled,
            reason: None,
        }
    }

    /// Attaches a reason to the error.
    #[inline]
    pub fn with_reason<S: Into<String>>(self, reason: S) -> Self {
        Self {
            kind: self.kind,
            reason: Some(reason.into()),
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ProbeErrorKind {
        self.kind
    }
}

impl Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {reason}", self.kind),
            None => Display::fmt(&self.kind, f),
        }
    }
}

impl Error for ProbeError {}

/// A type that inspects a URL for a single redirect hop.
///
/// Implementations issue one request per call and must not follow the
/// redirect they discover, since callers only ask for the first hop.
/// The probe is shared by all workers of a batch, so it should be cheap
/// to call concurrently.
pub trait RedirectProbe: Send + Sync + 'static {
    /// Probes `url` and returns the redirect target, or `url` itself if
    /// the endpoint doesn't redirect.
    fn probe(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<String, ProbeError>> + Send + 'static;
}
