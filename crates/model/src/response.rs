use serde::{Deserialize, Serialize};

/// A complete grounded response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundedResponse {
    /// The generated text, concatenated from all text parts.
    pub generated_text: String,
    /// The cited sources, in the order the provider returned them.
    pub attributions: Vec<Attribution>,
    /// Search queries the provider used to ground the response.
    pub search_suggestions: Vec<String>,
    /// The reason the provider finished generating, if reported.
    pub finish_reason: Option<String>,
}

/// A cited source attached to a generated response.
///
/// The `url` may point to a redirecting endpoint until it has been
/// resolved. It is the only field a redirect resolver is allowed to
/// rewrite.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// Title of the source.
    pub title: String,
    /// Domain of the source, empty when the provider doesn't report one.
    pub domain: String,
    /// URL of the source.
    pub url: String,
    /// Parts of the generated text supported by this source.
    pub segments: Vec<AttributionSegment>,
}

impl Attribution {
    /// Creates an attribution with only a URL.
    #[inline]
    pub fn with_url<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// A piece of the generated text that a source supports.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributionSegment {
    /// Index of the content part the segment belongs to.
    pub part_index: usize,
    /// Start offset of the segment in the part, inclusive.
    pub start_index: usize,
    /// End offset of the segment in the part, exclusive.
    pub end_index: usize,
    /// The segment text.
    pub text: String,
    /// Confidence that the source supports the segment.
    pub confidence_score: f32,
}
