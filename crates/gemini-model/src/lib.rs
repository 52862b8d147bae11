//! A grounded generation provider for the Gemini API.
//!
//! Requests are sent with the Google Search tool attached, so the model
//! answers from up-to-date web results and cites them in its grounding
//! metadata. The cited URLs usually point to Google's redirect endpoint.

#[macro_use]
extern crate tracing;

mod config;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use grounded_search_model::{
    ErrorKind, GenerationProvider, GenerationRequest, GroundedResponse,
    ProviderError,
};
use mime::Mime;
use reqwest::{Client, header};

pub use config::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE, GeminiConfig,
    GeminiConfigBuilder,
};
use proto::GenerateContentResponse;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Error type for [`GeminiProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gemini: {} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Gemini grounded generation provider.
#[derive(Clone, Debug)]
pub struct GeminiProvider {
    client: Client,
    config: Arc<GeminiConfig>,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider` with the given configuration.
    #[inline]
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: config.http_client.clone().unwrap_or_default(),
            config: Arc::new(config),
        }
    }
}

impl GenerationProvider for GeminiProvider {
    type Error = Error;

    fn generate(
        &self,
        req: &GenerationRequest,
    ) -> impl Future<Output = Result<GroundedResponse, Self::Error>> + Send + 'static
    {
        let model = req.model.as_deref().unwrap_or(&self.config.model);
        let invalid = if req.prompt.is_empty() {
            Some(Error::new("prompt cannot be empty", ErrorKind::InvalidParameter))
        } else if model.is_empty() {
            Some(Error::new(
                "model name is invalid or empty",
                ErrorKind::InvalidParameter,
            ))
        } else {
            None
        };

        let payload = proto::create_request(req, &self.config);
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, model
        );
        trace!("sending request to {url}");
        let resp_fut = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(header::ACCEPT, "application/json")
            .json(&payload)
            .send();

        async move {
            if let Some(err) = invalid {
                return Err(err);
            }

            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) if err.is_timeout() => {
                    return Err(Error::new(format!("{err}"), ErrorKind::Timeout));
                }
                Err(err) => {
                    return Err(Error::new(format!("{err}"), ErrorKind::Other));
                }
            };

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(response::api_error(status, &body));
            }

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_json = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.subtype() == mime::JSON)
                .unwrap_or(false);
            if !is_json {
                return Err(Error::new(
                    format!("Unexpected content type: {content_type:?}"),
                    ErrorKind::Other,
                ));
            }

            let body = resp
                .text()
                .await
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
            let resp = serde_json::from_str::<GenerateContentResponse>(&body)
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
            let resp = response::into_grounded_response(resp)?;
            debug!(
                "got {} attributions from {} chars of text",
                resp.attributions.len(),
                resp.generated_text.len()
            );
            Ok(resp)
        }
    }
}
