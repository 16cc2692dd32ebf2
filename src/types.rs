//! Wire types shared by the overlay engine and the tool boundary.
//!
//! Every optional numeric field deserializes leniently: JSON numbers pass,
//! numeric strings parse, booleans coerce to 0/1, anything else reads as
//! absent. Range clamping happens inside the overlay modules, so a malformed
//! sub-field can degrade a highlight but never reject a request.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Coordinate system a request's positions are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSystem {
    /// The fixed 1920x1080 canvas all overlay geometry is authored in.
    #[default]
    Logical1920x1080,
    /// The 0-1000 per-axis scale the vision locator reports boxes in,
    /// chosen for model stability across screenshot resolutions.
    Normalized1000,
}

impl CoordinateSystem {
    /// Wire name of the coordinate system.
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateSystem::Logical1920x1080 => "logical_1920x1080",
            CoordinateSystem::Normalized1000 => "normalized_1000",
        }
    }

    /// Parse a wire name; anything unrecognized falls back to the logical
    /// canvas, matching the lenient numeric handling elsewhere.
    pub fn parse(value: &str) -> Self {
        match value {
            "normalized_1000" => CoordinateSystem::Normalized1000,
            _ => CoordinateSystem::Logical1920x1080,
        }
    }
}

impl std::fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Custom serializer implementation to ensure wire names are used in JSON
impl Serialize for CoordinateSystem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CoordinateSystem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

// Implement schema generation manually since the serialized form is a plain
// string enum rather than the derived variant encoding
impl JsonSchema for CoordinateSystem {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "CoordinateSystem".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "string",
            "enum": ["logical_1920x1080", "normalized_1000"],
            "description": "Use 'logical_1920x1080' or 'normalized_1000'"
        })
    }
}

/// One dot to light, in raw caller units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DotSpec {
    /// X coordinate (0-1919 logical, or 0-1000 normalized)
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Y coordinate (0-1079 logical, or 0-1000 normalized)
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Dot size multiplier (default 1, clamped to 0.25-8)
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// Brightness from 0 to 1 (default 1)
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
}

/// One rectangular region to outline, in raw caller units.
///
/// Two forms are accepted: opposite corners (`x1,y1,x2,y2` — the form the
/// vision locator reports) and origin plus extent (`x,y,width,height`). The
/// corner form wins when `x1` is present; missing fields read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoxSpec {
    /// Left X of the corner-pair form
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub x1: Option<f64>,
    /// Top Y of the corner-pair form
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub y1: Option<f64>,
    /// Right X of the corner-pair form
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub x2: Option<f64>,
    /// Bottom Y of the corner-pair form
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub y2: Option<f64>,
    /// Top-left X of the origin+extent form
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Top-left Y of the origin+extent form
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Box width of the origin+extent form
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Box height of the origin+extent form
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl BoxSpec {
    /// Corner-pair constructor, mostly for the vision locator and tests.
    pub fn corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: Some(x1),
            y1: Some(y1),
            x2: Some(x2),
            y2: Some(y2),
            ..Self::default()
        }
    }
}

/// One timed step of a multi-frame overlay animation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FrameSpec {
    /// Dots to light for this frame
    #[serde(default, deserialize_with = "lenient::vec_of", skip_serializing_if = "Vec::is_empty")]
    pub dots: Vec<DotSpec>,
    /// Boxes to outline for this frame
    #[serde(default, deserialize_with = "lenient::vec_of", skip_serializing_if = "Vec::is_empty")]
    pub boxes: Vec<BoxSpec>,
    /// Frame duration in milliseconds (default 120, floor 16)
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

/// Top-level render request: a static set of dots/boxes, or an ordered list
/// of frames, plus style options shared by every frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Dots to light for a static render
    #[serde(default, deserialize_with = "lenient::vec_of", skip_serializing_if = "Vec::is_empty")]
    pub dots: Vec<DotSpec>,
    /// Boxes to outline for a static render
    #[serde(default, deserialize_with = "lenient::vec_of", skip_serializing_if = "Vec::is_empty")]
    pub boxes: Vec<BoxSpec>,
    /// Animation frames; when non-empty they take precedence over the
    /// static dots/boxes
    #[serde(default, deserialize_with = "lenient::vec_of", skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<FrameSpec>,
    /// Coordinate system for all positions in the request
    #[serde(default, deserialize_with = "lenient::coordinate_system")]
    pub coordinate_system: CoordinateSystem,
    /// CSS hex color for lit dots (default '#0b3d91')
    #[serde(default, deserialize_with = "lenient::string_opt", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Base dot radius in logical pixels (default 4, clamped to 0.25-8)
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Glow intensity around dots (default 8, clamped to 0-40)
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub glow_strength: Option<f64>,
    /// Cluster density per logical dot (default 2, clamped to 1-5)
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    /// How long to keep the final pattern before clearing, in milliseconds
    /// (default 2000; 0 keeps it until the next render)
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub persist_ms: Option<f64>,
    /// Spacing of outline dots along box edges (default 10, clamped to 1-60)
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub box_step: Option<f64>,
    /// Brightness for box-outline dots (default 1)
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub box_brightness: Option<f64>,
    /// Size multiplier for box-outline dots (default 1)
    #[serde(default, deserialize_with = "lenient::f64_opt", skip_serializing_if = "Option::is_none")]
    pub box_size: Option<f64>,
}

impl RenderRequest {
    /// True when the request carries nothing at all to draw.
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty() && self.boxes.is_empty() && self.frames.is_empty()
    }
}

/// What a render call reports back to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderSummary {
    /// The logical canvas the request was authored against, e.g. "1920x1080"
    pub logical_resolution: String,
    /// Number of dot and box entries in the request (not rasterized marks)
    pub dots_count: usize,
    /// Number of animation frames in the request
    pub frame_count: usize,
    /// Hold time applied before auto-clear, in milliseconds
    pub persist_ms: u64,
}

/// Parameters of the `locate_element` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocateParams {
    /// What to find on screen (e.g. 'the Chat text', 'Connect button')
    pub query: String,
    /// CSS hex color for the highlight dots (default '#0b3d91')
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub color: Option<String>,
    /// How long to keep the highlight visible in milliseconds (default 3000)
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub persist_ms: Option<f64>,
}

/// Structured result of the `locate_element` tool.
///
/// Lookup trouble (no capture stream, collaborator failure, element not
/// visible) is reported here rather than as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LocateOutcome {
    /// Whether the element was located and highlighted
    pub found: bool,
    /// Number of boxes highlighted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// The query that was resolved, echoed back on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Why the lookup could not run, when it could not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LocateOutcome {
    /// Lookup could not run at all (no stream, collaborator failure).
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            found: false,
            count: None,
            query: None,
            error: Some(error.into()),
        }
    }

    /// Lookup ran but the element is not visible.
    pub fn not_found() -> Self {
        Self {
            found: false,
            count: Some(0),
            query: None,
            error: None,
        }
    }

    /// Element located and highlighted.
    pub fn found(count: usize, query: impl Into<String>) -> Self {
        Self {
            found: true,
            count: Some(count),
            query: Some(query.into()),
            error: None,
        }
    }
}

/// One captured frame of the user's screen or camera, as raw encoded image
/// bytes plus their MIME type. Capture itself belongs to the embedding
/// layer; this is only the hand-off shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenFrame {
    pub mime_type: String,
    pub data: Vec<u8>,
}

pub(crate) mod lenient {
    //! JS-style coercion helpers used via `deserialize_with`.

    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::CoordinateSystem;

    /// Numbers pass, numeric strings parse, booleans coerce to 0/1,
    /// everything else reads as absent. Non-finite results also read as
    /// absent so documented defaults apply downstream.
    pub(crate) fn coerce_f64(value: &Value) -> Option<f64> {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        };
        number.filter(|n| n.is_finite())
    }

    pub(crate) fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(coerce_f64))
    }

    pub(crate) fn string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
    }

    /// Non-arrays read as empty. Malformed entries degrade to their default
    /// instead of dropping out: the entry count is part of the
    /// caller-visible summary.
    pub(crate) fn vec_of<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: serde::de::DeserializeOwned + Default,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
            _ => Vec::new(),
        })
    }

    pub(crate) fn coordinate_system<'de, D>(deserializer: D) -> Result<CoordinateSystem, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => CoordinateSystem::parse(&s),
            _ => CoordinateSystem::default(),
        })
    }
}
