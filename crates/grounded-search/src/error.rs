use std::error::Error as StdError;
use std::fmt::{self, Display};

use grounded_search_model::{ErrorKind, ProbeError, ProviderError};

/// Error type for [`Client`](crate::Client).
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    #[inline]
    pub(crate) fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub(crate) fn from_provider<E: ProviderError>(err: E) -> Self {
        Self::new(err.to_string(), err.kind())
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Error {}

impl ProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<ProbeError> for Error {
    fn from(err: ProbeError) -> Self {
        Self::new(
            format!("failed to create redirect probe: {err}"),
            ErrorKind::Other,
        )
    }
}
