//! Grounded generation with resolved source URLs.
//!
//! A [`Client`] sends a prompt to a [`GenerationProvider`], then resolves
//! the redirecting URLs of the cited sources before handing the response
//! back:
//!
//! ```no_run
//! use grounded_search::{ClientBuilder, GeminiConfigBuilder, GeminiProvider};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GeminiConfigBuilder::with_api_key("<API key>").build()?;
//! let client = ClientBuilder::with_provider(GeminiProvider::new(config)).build()?;
//!
//! let resp = client
//!     .generate_grounded_content("What are the recent developments in quantum computing?")
//!     .await?;
//! println!("{}", resp.generated_text);
//! for attribution in &resp.attributions {
//!     println!("- {} ({})", attribution.title, attribution.url);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod client;
mod error;

pub use client::{Client, ClientBuilder, DEFAULT_REQUEST_TIMEOUT};
pub use error::Error;
pub use grounded_search_gemini::{
    DEFAULT_MODEL, GeminiConfig, GeminiConfigBuilder, GeminiProvider,
};
pub use grounded_search_model::{
    Attribution, AttributionSegment, ErrorKind, GenerationProvider,
    GenerationRequest, GroundedResponse, ProviderError, RedirectProbe,
    SafetySetting, ThinkingConfig, ThinkingLevel,
};
pub use grounded_search_resolver::{
    HttpProbe, ResolverConfig, ResolverConfigBuilder,
};
