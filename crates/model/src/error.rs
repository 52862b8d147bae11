use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No API key was configured.
    MissingApiKey,
    /// A parameter or option was out of its valid range.
    InvalidParameter,
    /// The provider rejected the credentials.
    Authentication,
    /// The provider quota is exhausted or the caller is rate limited.
    QuotaExceeded,
    /// The provider rejected the request as malformed.
    InvalidRequest,
    /// The prompt or the generated content is blocked by safety filters.
    ContentBlocked,
    /// The call succeeded but the model produced nothing usable.
    NoContent,
    /// The provider failed on its side.
    Server,
    /// The request did not complete before its deadline.
    Timeout,
    /// Any other errors.
    Other,
}

impl ErrorKind {
    /// Returns `true` if retrying the same request later may succeed.
    #[inline]
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKind::QuotaExceeded | ErrorKind::Server | ErrorKind::Timeout
        )
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::MissingApiKey => "API key is missing",
            ErrorKind::InvalidParameter => "invalid parameter",
            ErrorKind::Authentication => "authentication failed",
            ErrorKind::QuotaExceeded => "quota exceeded",
            ErrorKind::InvalidRequest => "invalid request",
            ErrorKind::ContentBlocked => "content blocked",
            ErrorKind::NoContent => "no content generated",
            ErrorKind::Server => "server error",
            ErrorKind::Timeout => "timed out",
            ErrorKind::Other => "other error",
        };
        f.write_str(s)
    }
}
