use std::error::Error;

use crate::error::ErrorKind;
use crate::request::GenerationRequest;
use crate::response::GroundedResponse;

/// The error type for a generation provider.
pub trait ProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a grounded generation provider.
///
/// Once the provider is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the provider should be prepared for being dropped anytime.
pub trait GenerationProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ProviderError;

    /// Sends a generation request and waits for the complete response.
    ///
    /// The attributions in the returned response keep the order the
    /// provider reported them in, and their URLs may still point to
    /// redirecting endpoints.
    fn generate(
        &self,
        req: &GenerationRequest,
    ) -> impl Future<Output = Result<GroundedResponse, Self::Error>> + Send + 'static;
}
