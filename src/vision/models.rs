//! Vision API models and data structures

use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

use crate::types::{BoxSpec, ScreenFrame};

/// One part of a content turn: text or inline image data
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ContentPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn inline_image(mime_type: impl Into<String>, data_base64: impl Into<String>) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data_base64.into(),
            }),
            ..Self::default()
        }
    }
}

/// Inline binary payload, base64-encoded
#[derive(Debug, Serialize, Deserialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// One content turn
#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<ContentPart>,
}

/// Generation request
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Generation configuration
#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
}

/// Response candidate
#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Content,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Prompt feedback carried alongside a blocked response
#[derive(Debug, Deserialize)]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Generation response
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentRequest {
    /// Build the locate request: the captured frame plus a prompt that pins
    /// the reply to a bare JSON array of 0-1000 corner boxes.
    pub fn new_locate(query: &str, frame: &ScreenFrame) -> Self {
        let prompt = format!(
            "Find \"{query}\" in this screenshot. Respond with ONLY a JSON array of \
             bounding boxes, no prose: [{{\"x1\": 0, \"y1\": 0, \"x2\": 0, \"y2\": 0}}]. \
             Coordinates are integers on a 0-1000 scale for both axes; x1,y1 is the \
             top-left corner and x2,y2 the bottom-right. Return [] if the element is \
             not visible."
        );

        Self {
            contents: vec![Content {
                parts: vec![
                    ContentPart::inline_image(
                        frame.mime_type.clone(),
                        general_purpose::STANDARD.encode(&frame.data),
                    ),
                    ContentPart::text(prompt),
                ],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.0),
                top_p: None,
                max_output_tokens: Some(512),
                candidate_count: Some(1),
            }),
        }
    }
}

impl GenerateContentResponse {
    /// Get the text content from the first candidate
    pub fn get_text(&self) -> Option<String> {
        self.candidates
            .first()?
            .content
            .parts
            .iter()
            .find_map(|part| part.text.clone())
    }

    /// Check if the response was blocked by safety filters
    pub fn is_blocked(&self) -> bool {
        self.prompt_feedback
            .as_ref()
            .and_then(|pf| pf.block_reason.as_ref())
            .is_some()
            || self.candidates.is_empty()
    }
}

/// Extract corner boxes from a model reply.
///
/// Tolerates markdown fences and stray prose around the array: everything
/// between the first `[` and the last `]` is parsed, and anything that does
/// not parse reads as "nothing found".
pub fn parse_locate_boxes(reply: &str) -> Vec<BoxSpec> {
    let Some(start) = reply.find('[') else {
        return Vec::new();
    };
    let Some(end) = reply.rfind(']') else {
        return Vec::new();
    };
    if start >= end {
        return Vec::new();
    }

    serde_json::from_str::<Vec<BoxSpec>>(&reply[start..=end]).unwrap_or_default()
}
