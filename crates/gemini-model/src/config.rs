use std::fmt::Debug;

use grounded_search_model::{ErrorKind, SafetySetting, ThinkingConfig};
use reqwest::Client;

use crate::Error;

/// The model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
/// The sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
/// The endpoint of the Gemini API.
pub const DEFAULT_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta";

/// Builder for [`GeminiConfig`].
#[derive(Clone)]
pub struct GeminiConfigBuilder {
    api_key: String,
    model: Option<String>,
    base_url: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<i32>,
    top_k: Option<i32>,
    top_p: Option<f32>,
    safety_settings: Vec<SafetySetting>,
    thinking_config: Option<ThinkingConfig>,
    search_tool_disabled: bool,
    http_client: Option<Client>,
}

impl GeminiConfigBuilder {
    /// Creates a builder with the given API key.
    #[inline]
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
            base_url: None,
            temperature: Some(DEFAULT_TEMPERATURE),
            max_output_tokens: None,
            top_k: None,
            top_p: None,
            safety_settings: vec![],
            thinking_config: None,
            search_tool_disabled: false,
            http_client: None,
        }
    }

    /// Sets the default model to use.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the default sampling temperature, in `0.0..=2.0`.
    #[inline]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the default maximum number of output tokens.
    #[inline]
    pub fn with_max_output_tokens(mut self, tokens: i32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Sets the default top-k sampling parameter.
    #[inline]
    pub fn with_top_k(mut self, k: i32) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Sets the default top-p sampling parameter, in `(0.0, 1.0]`.
    #[inline]
    pub fn with_top_p(mut self, p: f32) -> Self {
        self.top_p = Some(p);
        self
    }

    /// Sets the default safety settings.
    #[inline]
    pub fn with_safety_settings(
        mut self,
        settings: impl Into<Vec<SafetySetting>>,
    ) -> Self {
        self.safety_settings = settings.into();
        self
    }

    /// Sets the default thinking configuration.
    #[inline]
    pub fn with_thinking_config(mut self, config: ThinkingConfig) -> Self {
        self.thinking_config = Some(config);
        self
    }

    /// Stops attaching the Google Search tool to requests.
    #[inline]
    pub fn with_search_tool_disabled(mut self, disabled: bool) -> Self {
        self.search_tool_disabled = disabled;
        self
    }

    /// Sets the HTTP client used to call the API.
    #[inline]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Validates and builds the configuration.
    pub fn build(self) -> Result<GeminiConfig, Error> {
        if self.api_key.is_empty() {
            return Err(Error::new("API key is missing", ErrorKind::MissingApiKey));
        }
        if let Some(model) = &self.model {
            if model.is_empty() {
                return Err(invalid_parameter("model name cannot be empty"));
            }
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(invalid_parameter(format!(
                    "temperature must be between 0.0 and 2.0, got {temperature}"
                )));
            }
        }
        if let Some(tokens) = self.max_output_tokens {
            if tokens <= 0 {
                return Err(invalid_parameter(format!(
                    "max output tokens must be positive, got {tokens}"
                )));
            }
        }
        if let Some(k) = self.top_k {
            if k <= 0 {
                return Err(invalid_parameter(format!(
                    "top_k must be positive, got {k}"
                )));
            }
        }
        if let Some(p) = self.top_p {
            if p <= 0.0 || p > 1.0 {
                return Err(invalid_parameter(format!(
                    "top_p must be in (0.0, 1.0], got {p}"
                )));
            }
        }
        if self
            .safety_settings
            .iter()
            .any(|s| s.category.is_empty() || s.threshold.is_empty())
        {
            return Err(invalid_parameter(
                "safety setting category and threshold cannot be empty",
            ));
        }

        Ok(GeminiConfig {
            api_key: self.api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            top_k: self.top_k,
            top_p: self.top_p,
            safety_settings: self.safety_settings,
            thinking_config: self.thinking_config,
            search_tool_disabled: self.search_tool_disabled,
            http_client: self.http_client,
        })
    }
}

#[inline]
fn invalid_parameter(message: impl Into<String>) -> Error {
    Error::new(message, ErrorKind::InvalidParameter)
}

impl Debug for GeminiConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfigBuilder")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("search_tool_disabled", &self.search_tool_disabled)
            .finish_non_exhaustive()
    }
}

/// Configuration for the Gemini provider.
#[derive(Clone)]
pub struct GeminiConfig {
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) temperature: Option<f32>,
    pub(crate) max_output_tokens: Option<i32>,
    pub(crate) top_k: Option<i32>,
    pub(crate) top_p: Option<f32>,
    pub(crate) safety_settings: Vec<SafetySetting>,
    pub(crate) thinking_config: Option<ThinkingConfig>,
    pub(crate) search_tool_disabled: bool,
    pub(crate) http_client: Option<Client>,
}

impl GeminiConfig {
    /// Returns the default model.
    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("search_tool_disabled", &self.search_tool_disabled)
            .finish_non_exhaustive()
    }
}
