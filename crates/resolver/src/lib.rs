//! Resolves the redirecting source URLs of grounded responses.
//!
//! Grounding providers often cite sources through their own redirect
//! endpoints. The [`Resolver`] probes those URLs concurrently with a
//! bounded pool of workers and writes the discovered targets back into
//! the attributions, within a deadline derived from the caller's own.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod batch;
mod config;
pub mod deadline;
mod http;
mod pool;

pub use batch::Resolver;
pub use config::{
    DEFAULT_BATCH_BUDGET, DEFAULT_BATCH_CAP, DEFAULT_PROBE_TIMEOUT,
    DEFAULT_WORKERS, ResolverConfig, ResolverConfigBuilder,
};
use grounded_search_model::ProbeError;
pub use http::HttpProbe;

impl Resolver<HttpProbe> {
    /// Creates a resolver that probes over HTTP with a default transport.
    #[inline]
    pub fn with_http_probe(config: ResolverConfig) -> Result<Self, ProbeError> {
        let probe = HttpProbe::new(config.probe_timeout())?;
        Ok(Self::new(probe, config))
    }
}
