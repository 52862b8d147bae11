use std::error::Error;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A request to be sent to the generation provider.
///
/// Every `Option` field overrides the provider's configured default when
/// set, and leaves it alone otherwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationRequest {
    /// The user prompt.
    pub prompt: String,
    /// Overrides the model to use.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Top-k sampling parameter.
    pub top_k: Option<i32>,
    /// Top-p (nucleus) sampling parameter.
    pub top_p: Option<f32>,
    /// Maximum number of tokens to generate.
    pub max_output_tokens: Option<i32>,
    /// Number of candidates to generate.
    pub candidate_count: Option<i32>,
    /// Sequences that stop the generation.
    pub stop_sequences: Vec<String>,
    /// Safety settings for this request only.
    pub safety_settings: Vec<SafetySetting>,
    /// Thinking configuration for models that support it.
    pub thinking_config: Option<ThinkingConfig>,
}

impl GenerationRequest {
    /// Creates a request with only a prompt.
    #[inline]
    pub fn new<S: Into<String>>(prompt: S) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// A single safety filter setting.
///
/// Both fields are forwarded verbatim, e.g. `HARM_CATEGORY_HARASSMENT`
/// and `BLOCK_MEDIUM_AND_ABOVE`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SafetySetting {
    /// The harm category.
    pub category: String,
    /// The block threshold for the category.
    pub threshold: String,
}

/// Controls the thinking behavior of the model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ThinkingConfig {
    /// How much the model should think before answering.
    pub thinking_level: Option<ThinkingLevel>,
    /// Whether thought summaries should be included in the response.
    pub include_thoughts: bool,
}

/// The thinking level of the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThinkingLevel {
    /// Minimal thinking.
    Minimal,
    /// Low thinking.
    Low,
    /// Medium thinking.
    Medium,
    /// High thinking.
    High,
}

impl ThinkingLevel {
    /// Returns the wire name of this level.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ThinkingLevel::Minimal => "MINIMAL",
            ThinkingLevel::Low => "LOW",
            ThinkingLevel::Medium => "MEDIUM",
            ThinkingLevel::High => "HIGH",
        }
    }
}

impl FromStr for ThinkingLevel {
    type Err = ParseThinkingLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MINIMAL" => Ok(ThinkingLevel::Minimal),
            "LOW" => Ok(ThinkingLevel::Low),
            "MEDIUM" => Ok(ThinkingLevel::Medium),
            "HIGH" => Ok(ThinkingLevel::High),
            _ => Err(ParseThinkingLevelError(s.to_owned())),
        }
    }
}

/// The error returned when parsing an unknown thinking level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseThinkingLevelError(String);

impl Display for ParseThinkingLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid thinking level {:?}: must be one of minimal, low, medium, high",
            self.0
        )
    }
}

impl Error for ParseThinkingLevelError {}
