use grounded_search_model::{GenerationRequest, SafetySetting, ThinkingConfig};
use serde::{Deserialize, Serialize};

use crate::GeminiConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
    pub block_reason_message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<Option<GroundingChunk>>,
    #[serde(default)]
    pub grounding_supports: Vec<Option<GroundingSupport>>,
    #[serde(default)]
    pub web_search_queries: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunk {
    pub web: Option<ChunkSource>,
    pub retrieved_context: Option<ChunkSource>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ChunkSource {
    pub uri: Option<String>,
    pub title: Option<String>,
    pub domain: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingSupport {
    pub segment: Option<Segment>,
    #[serde(default)]
    pub grounding_chunk_indices: Vec<i64>,
    #[serde(default)]
    pub confidence_scores: Vec<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(default)]
    pub part_index: usize,
    #[serde(default)]
    pub start_index: usize,
    #[serde(default)]
    pub end_index: usize,
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

// ---------------------------
// Types sent to and from both
// ---------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct GoogleSearch {}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfigPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_level: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    include_thoughts: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidate_count: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfigPayload>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
    generation_config: GenerationConfig,
}

// -----------
// Conversions
// -----------

/// Merges the per-request overrides of `req` over the defaults of
/// `config`.
pub fn create_request(
    req: &GenerationRequest,
    config: &GeminiConfig,
) -> GenerateContentRequest {
    let safety_settings = if req.safety_settings.is_empty() {
        config.safety_settings.clone()
    } else {
        req.safety_settings.clone()
    };
    let tools = if config.search_tool_disabled {
        vec![]
    } else {
        vec![Tool {
            google_search: GoogleSearch {},
        }]
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_owned()),
            parts: vec![Part {
                text: Some(req.prompt.clone()),
                thought: None,
            }],
        }],
        tools,
        safety_settings,
        generation_config: GenerationConfig {
            temperature: req.temperature.or(config.temperature),
            top_k: req.top_k.or(config.top_k),
            top_p: req.top_p.or(config.top_p),
            max_output_tokens: req
                .max_output_tokens
                .or(config.max_output_tokens),
            candidate_count: req.candidate_count,
            stop_sequences: req.stop_sequences.clone(),
            thinking_config: req
                .thinking_config
                .or(config.thinking_config)
                .map(create_thinking_config),
        },
    }
}

#[inline]
fn create_thinking_config(config: ThinkingConfig) -> ThinkingConfigPayload {
    ThinkingConfigPayload {
        thinking_level: config.thinking_level.map(|level| level.as_str()),
        include_thoughts: config.include_thoughts,
    }
}

#[cfg(test)]
mod tests {
    use grounded_search_model::ThinkingLevel;
    use serde_json::json;

    use super::*;
    use crate::GeminiConfigBuilder;

    #[test]
    fn test_create_request() {
        let config = GeminiConfigBuilder::with_api_key("xxx")
            .with_top_k(20)
            .with_thinking_config(ThinkingConfig {
                thinking_level: Some(ThinkingLevel::Low),
                include_thoughts: false,
            })
            .build()
            .unwrap();
        let request = GenerationRequest {
            temperature: Some(0.5),
            stop_sequences: vec!["END".to_owned()],
            ..GenerationRequest::new("Who won the 2022 World Cup?")
        };

        let payload = serde_json::to_value(create_request(&request, &config))
            .unwrap();
        assert_eq!(
            payload,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "text": "Who won the 2022 World Cup?" }],
                }],
                "tools": [{ "googleSearch": {} }],
                "generationConfig": {
                    "temperature": 0.5,
                    "topK": 20,
                    "stopSequences": ["END"],
                    "thinkingConfig": { "thinkingLevel": "LOW" },
                },
            })
        );
    }

    #[test]
    fn test_request_overrides_and_disabled_tool() {
        let default_setting = SafetySetting {
            category: "HARM_CATEGORY_HARASSMENT".to_owned(),
            threshold: "BLOCK_NONE".to_owned(),
        };
        let request_setting = SafetySetting {
            category: "HARM_CATEGORY_HATE_SPEECH".to_owned(),
            threshold: "BLOCK_LOW_AND_ABOVE".to_owned(),
        };
        let config = GeminiConfigBuilder::with_api_key("xxx")
            .with_safety_settings([default_setting.clone()])
            .with_search_tool_disabled(true)
            .build()
            .unwrap();

        let payload = create_request(&GenerationRequest::new("Hi"), &config);
        assert!(payload.tools.is_empty());
        assert_eq!(payload.safety_settings, [default_setting]);
        assert_eq!(payload.generation_config.temperature, Some(0.0));

        let request = GenerationRequest {
            safety_settings: vec![request_setting.clone()],
            max_output_tokens: Some(64),
            ..GenerationRequest::new("Hi")
        };
        let payload = create_request(&request, &config);
        assert_eq!(payload.safety_settings, [request_setting]);
        assert_eq!(payload.generation_config.max_output_tokens, Some(64));
    }

    #[test]
    fn test_parse_response() {
        let body = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "Argentina won." }],
                },
                "finishReason": "STOP",
                "groundingMetadata": {
                    "webSearchQueries": ["2022 world cup winner"],
                    "groundingChunks": [{
                        "web": {
                            "uri": "https://vertexaisearch.cloud.google.com/grounding-api-redirect/abc",
                            "title": "fifa.com",
                        },
                    }],
                    "groundingSupports": [{
                        "segment": { "endIndex": 14, "text": "Argentina won." },
                        "groundingChunkIndices": [0],
                        "confidenceScores": [0.9],
                    }],
                },
            }],
        });
        let resp: GenerateContentResponse =
            serde_json::from_value(body).unwrap();

        let candidate = &resp.candidates[0];
        assert_eq!(candidate.finish_reason.as_deref(), Some("STOP"));
        let metadata = candidate.grounding_metadata.as_ref().unwrap();
        assert_eq!(metadata.grounding_chunks.len(), 1);
        let segment = metadata.grounding_supports[0]
            .as_ref()
            .and_then(|s| s.segment.as_ref())
            .unwrap();
        assert_eq!(segment.start_index, 0);
        assert_eq!(segment.end_index, 14);
    }
}
