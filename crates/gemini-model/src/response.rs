use grounded_search_model::{
    Attribution, AttributionSegment, ErrorKind, GroundedResponse,
};
use reqwest::StatusCode;

use crate::Error;
use crate::proto::{ErrorResponse, GenerateContentResponse, GroundingMetadata};

const BLOCK_REASON_UNSPECIFIED: &str = "BLOCKED_REASON_UNSPECIFIED";
const FINISH_REASON_SAFETY: &str = "SAFETY";

/// Classifies a non-success response of the API.
pub fn api_error(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|resp| resp.error.message)
        .unwrap_or_else(|_| body.trim().to_owned());

    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ErrorKind::Authentication
        }
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::QuotaExceeded,
        StatusCode::BAD_REQUEST
            if message.to_ascii_uppercase().contains("SAFETY") =>
        {
            ErrorKind::ContentBlocked
        }
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
            ErrorKind::InvalidRequest
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ErrorKind::Timeout
        }
        status if status.is_server_error() => ErrorKind::Server,
        _ => ErrorKind::Other,
    };
    Error::new(format!("API error (status: {status}): {message}"), kind)
}

/// Converts a successful API response into a [`GroundedResponse`].
///
/// Only the first candidate is used.
pub fn into_grounded_response(
    resp: GenerateContentResponse,
) -> Result<GroundedResponse, Error> {
    if let Some(feedback) = &resp.prompt_feedback {
        if let Some(reason) = feedback
            .block_reason
            .as_deref()
            .filter(|r| *r != BLOCK_REASON_UNSPECIFIED)
        {
            let detail = feedback.block_reason_message.as_deref().unwrap_or("");
            return Err(Error::new(
                format!("prompt blocked due to {reason}: {detail}"),
                ErrorKind::ContentBlocked,
            ));
        }
    }

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Err(no_content());
    };
    if candidate.finish_reason.as_deref() == Some(FINISH_REASON_SAFETY) {
        return Err(Error::new(
            "content generation stopped due to safety filters",
            ErrorKind::ContentBlocked,
        ));
    }
    let Some(content) = candidate.content.filter(|c| !c.parts.is_empty())
    else {
        return Err(no_content());
    };

    let generated_text: String = content
        .parts
        .iter()
        .filter(|part| part.thought != Some(true))
        .filter_map(|part| part.text.as_deref())
        .collect();
    let metadata = candidate.grounding_metadata.unwrap_or_default();
    let attributions = extract_attributions(&metadata);
    if generated_text.is_empty() && attributions.is_empty() {
        return Err(no_content());
    }

    Ok(GroundedResponse {
        generated_text,
        attributions,
        search_suggestions: metadata.web_search_queries,
        finish_reason: candidate.finish_reason,
    })
}

#[inline]
fn no_content() -> Error {
    Error::new("model generated no content", ErrorKind::NoContent)
}

/// Builds one attribution per grounding chunk, then attaches every
/// supported segment to all the chunks it references.
pub fn extract_attributions(metadata: &GroundingMetadata) -> Vec<Attribution> {
    let mut attributions: Vec<_> = metadata
        .grounding_chunks
        .iter()
        .map(|chunk| {
            let Some(chunk) = chunk else {
                return Attribution::default();
            };
            if let Some(web) = &chunk.web {
                Attribution {
                    title: web.title.clone().unwrap_or_default(),
                    domain: web.domain.clone().unwrap_or_default(),
                    url: web.uri.clone().unwrap_or_default(),
                    segments: vec![],
                }
            } else if let Some(context) = &chunk.retrieved_context {
                Attribution {
                    title: context.title.clone().unwrap_or_default(),
                    url: context.uri.clone().unwrap_or_default(),
                    ..Default::default()
                }
            } else {
                Attribution::default()
            }
        })
        .collect();
    if attributions.is_empty() {
        return attributions;
    }

    for support in metadata.grounding_supports.iter().flatten() {
        let Some(segment) = &support.segment else {
            continue;
        };
        let segment = AttributionSegment {
            part_index: segment.part_index,
            start_index: segment.start_index,
            end_index: segment.end_index,
            text: segment.text.clone(),
            confidence_score: support
                .confidence_scores
                .first()
                .copied()
                .unwrap_or(0.0),
        };
        for &index in &support.grounding_chunk_indices {
            match usize::try_from(index)
                .ok()
                .and_then(|i| attributions.get_mut(i))
            {
                Some(attribution) => {
                    attribution.segments.push(segment.clone());
                }
                None => {
                    debug!("ignored invalid grounding chunk index {index}");
                }
            }
        }
    }
    attributions
}

#[cfg(test)]
mod tests {
    use grounded_search_model::ProviderError;
    use serde_json::json;

    use super::*;

    fn parse(body: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_extract_attributions() {
        let resp = parse(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "A. B." }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://r/1", "title": "one", "domain": "one.example" } },
                        null,
                        { "retrievedContext": { "uri": "https://r/3", "title": "three" } },
                    ],
                    "groundingSupports": [
                        {
                            "segment": { "startIndex": 0, "endIndex": 2, "text": "A." },
                            "groundingChunkIndices": [0, 2, 7, -1],
                            "confidenceScores": [0.8, 0.1],
                        },
                        {
                            "segment": { "partIndex": 0, "startIndex": 3, "endIndex": 5, "text": "B." },
                            "groundingChunkIndices": [2],
                        },
                        { "groundingChunkIndices": [0] },
                        null,
                    ],
                },
            }],
        }));
        let metadata = resp.candidates[0].grounding_metadata.as_ref().unwrap();
        let attributions = extract_attributions(metadata);

        assert_eq!(attributions.len(), 3);
        assert_eq!(attributions[0].url, "https://r/1");
        assert_eq!(attributions[0].domain, "one.example");
        assert_eq!(attributions[0].segments.len(), 1);
        assert_eq!(attributions[0].segments[0].confidence_score, 0.8);

        assert_eq!(attributions[1], Attribution::default());

        assert_eq!(attributions[2].title, "three");
        assert_eq!(attributions[2].domain, "");
        let texts: Vec<_> = attributions[2]
            .segments
            .iter()
            .map(|s| (s.text.as_str(), s.confidence_score))
            .collect();
        assert_eq!(texts, [("A.", 0.8), ("B.", 0.0)]);
    }

    #[test]
    fn test_into_grounded_response() {
        let resp = parse(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "Hello, " },
                        { "text": "world!" },
                    ],
                },
                "finishReason": "STOP",
                "groundingMetadata": {
                    "webSearchQueries": ["hello world"],
                    "groundingChunks": [{ "web": { "uri": "https://r/1" } }],
                },
            }],
        }));
        let resp = into_grounded_response(resp).unwrap();

        assert_eq!(resp.generated_text, "Hello, world!");
        assert_eq!(resp.attributions.len(), 1);
        assert_eq!(resp.search_suggestions, ["hello world"]);
        assert_eq!(resp.finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_no_content() {
        let bodies = [
            json!({}),
            json!({ "candidates": [{ "finishReason": "STOP" }] }),
            json!({ "candidates": [{ "content": { "parts": [] } }] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "" }] } }] }),
        ];
        for body in bodies {
            let err = into_grounded_response(parse(body)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NoContent);
        }
    }

    #[test]
    fn test_blocked() {
        let resp = parse(json!({
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "unsafe prompt",
            },
        }));
        let err = into_grounded_response(resp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContentBlocked);
        assert!(err.message().contains("unsafe prompt"));

        let resp = parse(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "partial" }] },
                "finishReason": "SAFETY",
            }],
        }));
        let err = into_grounded_response(resp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContentBlocked);

        let resp = parse(json!({
            "promptFeedback": { "blockReason": "BLOCKED_REASON_UNSPECIFIED" },
            "candidates": [{ "content": { "parts": [{ "text": "fine" }] } }],
        }));
        assert!(into_grounded_response(resp).is_ok());
    }

    #[test]
    fn test_api_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let cases = [
            (StatusCode::UNAUTHORIZED, body, ErrorKind::Authentication),
            (StatusCode::FORBIDDEN, body, ErrorKind::Authentication),
            (StatusCode::TOO_MANY_REQUESTS, body, ErrorKind::QuotaExceeded),
            (StatusCode::BAD_REQUEST, body, ErrorKind::InvalidRequest),
            (
                StatusCode::BAD_REQUEST,
                r#"{"error":{"message":"blocked by safety settings"}}"#,
                ErrorKind::ContentBlocked,
            ),
            (StatusCode::SERVICE_UNAVAILABLE, "overloaded", ErrorKind::Server),
            (StatusCode::GATEWAY_TIMEOUT, "", ErrorKind::Timeout),
            (StatusCode::IM_A_TEAPOT, "", ErrorKind::Other),
        ];
        for (status, body, kind) in cases {
            let err = api_error(status, body);
            assert_eq!(err.kind(), kind, "{status}");
        }

        let err = api_error(StatusCode::BAD_REQUEST, body);
        assert!(err.message().contains("API key not valid"));
    }
}
