//! Declarative edit configuration.
//!
//! An [`EditConfig`] maps operation names to parameters. Operations are
//! always applied in the fixed order trim, resize, fade_in, fade_out, volume,
//! text_overlays, effects, regardless of key order in the incoming JSON.
//! Unrecognized keys and unknown effect names are ignored.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Default fade duration in seconds.
pub const DEFAULT_FADE_SECS: f64 = 1.0;
/// Default text overlay font size.
pub const DEFAULT_OVERLAY_FONT_SIZE: u32 = 50;
/// Default text overlay color.
pub const DEFAULT_OVERLAY_COLOR: &str = "white";
/// Default text overlay font family.
pub const DEFAULT_OVERLAY_FONT: &str = "Arial";

/// Post-processing pass over a single video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EditConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<TrimParams>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize: Option<ResizeParams>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_in: Option<FadeParams>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_out: Option<FadeParams>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeParams>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_overlays: Vec<TextOverlay>,

    /// Effects in application order
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_effects"
    )]
    pub effects: Vec<Effect>,
}

impl EditConfig {
    /// True when no operation is requested (the pass becomes a plain re-encode).
    pub fn is_empty(&self) -> bool {
        self.trim.is_none()
            && self.resize.is_none()
            && self.fade_in.is_none()
            && self.fade_out.is_none()
            && self.volume.is_none()
            && self.text_overlays.is_empty()
            && self.effects.is_empty()
    }
}

/// `trim{start,end}` in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrimParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    /// Defaults to the full duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

/// `resize{width,height}` or `resize{scale}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResizeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

/// Resolved resize request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resize {
    Exact { width: u32, height: u32 },
    Scale(f64),
}

impl ResizeParams {
    /// Explicit dimensions win when both are present, otherwise `scale`.
    pub fn resolve(&self) -> Option<Resize> {
        match (self.width, self.height, self.scale) {
            (Some(width), Some(height), _) if width > 0 && height > 0 => {
                Some(Resize::Exact { width, height })
            }
            (_, _, Some(scale)) => Some(Resize::Scale(scale)),
            _ => None,
        }
    }
}

/// `fade_in{duration}` / `fade_out{duration}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FadeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl FadeParams {
    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration.unwrap_or(DEFAULT_FADE_SECS)
    }
}

/// `volume{factor}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VolumeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
}

impl VolumeParams {
    pub fn factor(&self) -> f64 {
        self.factor.unwrap_or(1.0)
    }
}

/// One burned-in text layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextOverlay {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    #[schemars(with = "serde_json::Value")]
    pub position: OverlayPosition,

    /// Seconds from the start of the (trimmed) clip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,

    /// Defaults to the remaining duration of the clip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fontsize: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
}

impl TextOverlay {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_position(mut self, x: PositionCoord, y: PositionCoord) -> Self {
        self.position = OverlayPosition { x, y };
        self
    }

    pub fn with_timing(mut self, start: f64, duration: f64) -> Self {
        self.start = Some(start);
        self.duration = Some(duration);
        self
    }

    pub fn with_style(mut self, fontsize: u32, color: impl Into<String>) -> Self {
        self.fontsize = Some(fontsize);
        self.color = Some(color.into());
        self
    }

    pub fn start_secs(&self) -> f64 {
        self.start.unwrap_or(0.0).max(0.0)
    }

    pub fn font_size(&self) -> u32 {
        self.fontsize.unwrap_or(DEFAULT_OVERLAY_FONT_SIZE)
    }

    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_OVERLAY_COLOR)
    }

    pub fn font(&self) -> &str {
        self.font.as_deref().unwrap_or(DEFAULT_OVERLAY_FONT)
    }
}

/// One axis of an overlay position: a keyword or a pixel offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PositionCoord {
    Offset(f64),
    Keyword(String),
}

impl PositionCoord {
    pub fn center() -> Self {
        PositionCoord::Keyword("center".to_string())
    }

    pub fn keyword(k: &str) -> Self {
        PositionCoord::Keyword(k.to_string())
    }
}

/// Overlay placement on the frame.
///
/// Accepts `"center"`, `["center", "bottom"]`, `[100, 200]` or
/// `{"x": ..., "y": ...}`. A single keyword names one edge and centers the
/// other axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPosition", into = "RawPosition")]
pub struct OverlayPosition {
    pub x: PositionCoord,
    pub y: PositionCoord,
}

impl Default for OverlayPosition {
    fn default() -> Self {
        Self {
            x: PositionCoord::center(),
            y: PositionCoord::center(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPosition {
    Keyword(String),
    Pair(PositionCoord, PositionCoord),
    Object { x: PositionCoord, y: PositionCoord },
}

impl From<RawPosition> for OverlayPosition {
    fn from(raw: RawPosition) -> Self {
        match raw {
            RawPosition::Keyword(k) => match k.to_lowercase().as_str() {
                "left" => Self {
                    x: PositionCoord::keyword("left"),
                    y: PositionCoord::center(),
                },
                "right" => Self {
                    x: PositionCoord::keyword("right"),
                    y: PositionCoord::center(),
                },
                "top" => Self {
                    x: PositionCoord::center(),
                    y: PositionCoord::keyword("top"),
                },
                "bottom" => Self {
                    x: PositionCoord::center(),
                    y: PositionCoord::keyword("bottom"),
                },
                _ => Self::default(),
            },
            RawPosition::Pair(x, y) | RawPosition::Object { x, y } => Self { x, y },
        }
    }
}

impl From<OverlayPosition> for RawPosition {
    fn from(pos: OverlayPosition) -> Self {
        RawPosition::Pair(pos.x, pos.y)
    }
}

/// Named visual effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Average the color channels
    BlackAndWhite,
    /// Playback rate x2
    SpeedUp,
    /// Playback rate x0.5
    SlowMotion,
}

impl Effect {
    pub const ALL: &'static [Effect] = &[Effect::BlackAndWhite, Effect::SpeedUp, Effect::SlowMotion];

    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::BlackAndWhite => "black_and_white",
            Effect::SpeedUp => "speed_up",
            Effect::SlowMotion => "slow_motion",
        }
    }

    /// Look up an effect by name; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.as_str() == name)
    }

    /// Playback rate multiplier, if this effect changes timing.
    pub fn speed_factor(&self) -> Option<f64> {
        match self {
            Effect::BlackAndWhite => None,
            Effect::SpeedUp => Some(2.0),
            Effect::SlowMotion => Some(0.5),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keep known effect names, drop everything else (including non-strings).
fn deserialize_effects<'de, D>(deserializer: D) -> Result<Vec<Effect>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_str())
        .filter_map(Effect::from_name)
        .collect())
}

/// Description of a supported operation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EditOperationInfo {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl EditOperationInfo {
    fn with_parameters(description: &str, parameters: &[&str]) -> Self {
        Self {
            description: description.to_string(),
            parameters: Some(parameters.iter().map(|p| p.to_string()).collect()),
            options: None,
        }
    }
}

/// Catalog of supported edit operations.
pub fn supported_edits() -> BTreeMap<String, EditOperationInfo> {
    let mut ops = BTreeMap::new();
    ops.insert(
        "trim".to_string(),
        EditOperationInfo::with_parameters("Trim video to specific start and end times", &["start", "end"]),
    );
    ops.insert(
        "resize".to_string(),
        EditOperationInfo::with_parameters("Resize video dimensions", &["width", "height", "scale"]),
    );
    ops.insert(
        "fade_in".to_string(),
        EditOperationInfo::with_parameters("Add fade-in effect", &["duration"]),
    );
    ops.insert(
        "fade_out".to_string(),
        EditOperationInfo::with_parameters("Add fade-out effect", &["duration"]),
    );
    ops.insert(
        "volume".to_string(),
        EditOperationInfo::with_parameters("Adjust audio volume", &["factor"]),
    );
    ops.insert(
        "text_overlays".to_string(),
        EditOperationInfo::with_parameters(
            "Add text overlays to video",
            &["text", "position", "start", "duration", "fontsize", "color", "font"],
        ),
    );
    ops.insert(
        "effects".to_string(),
        EditOperationInfo {
            description: "Apply visual effects".to_string(),
            parameters: None,
            options: Some(Effect::ALL.iter().map(|e| e.as_str().to_string()).collect()),
        },
    );
    ops
}

/// Named, ready-made edit configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EditPreset {
    pub description: String,
    pub config: EditConfig,
}

/// Built-in editing presets.
pub fn edit_presets() -> BTreeMap<String, EditPreset> {
    let mut presets = BTreeMap::new();

    presets.insert(
        "social_media_short".to_string(),
        EditPreset {
            description: "Optimize for social media (Instagram, TikTok)".to_string(),
            config: EditConfig {
                resize: Some(ResizeParams {
                    width: Some(1080),
                    height: Some(1920),
                    scale: None,
                }),
                trim: Some(TrimParams {
                    start: None,
                    end: Some(30.0),
                }),
                fade_in: Some(FadeParams::with_duration(0.5)),
                fade_out: Some(FadeParams::with_duration(0.5)),
                ..Default::default()
            },
        },
    );

    presets.insert(
        "youtube_intro".to_string(),
        EditPreset {
            description: "YouTube video intro style".to_string(),
            config: EditConfig {
                resize: Some(ResizeParams {
                    width: Some(1920),
                    height: Some(1080),
                    scale: None,
                }),
                fade_in: Some(FadeParams::with_duration(1.0)),
                text_overlays: vec![TextOverlay::new("Welcome to my channel!")
                    .with_position(PositionCoord::center(), PositionCoord::keyword("bottom"))
                    .with_timing(1.0, 3.0)
                    .with_style(60, "white")],
                ..Default::default()
            },
        },
    );

    presets.insert(
        "cinematic".to_string(),
        EditPreset {
            description: "Cinematic style with fades".to_string(),
            config: EditConfig {
                fade_in: Some(FadeParams::with_duration(2.0)),
                fade_out: Some(FadeParams::with_duration(2.0)),
                effects: vec![Effect::BlackAndWhite],
                ..Default::default()
            },
        },
    );

    presets.insert(
        "fast_paced".to_string(),
        EditPreset {
            description: "Fast-paced action style".to_string(),
            config: EditConfig {
                effects: vec![Effect::SpeedUp],
                volume: Some(VolumeParams { factor: Some(1.2) }),
                ..Default::default()
            },
        },
    );

    presets
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config: EditConfig = serde_json::from_value(json!({
            "trim": {"start": 2, "end": 5},
            "sharpen": {"amount": 3},
        }))
        .unwrap();
        assert_eq!(
            config.trim,
            Some(TrimParams {
                start: Some(2.0),
                end: Some(5.0)
            })
        );
        assert!(config.resize.is_none());
    }

    #[test]
    fn test_empty_config() {
        let config: EditConfig = serde_json::from_value(json!({})).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_fade_without_params_uses_default() {
        let config: EditConfig = serde_json::from_value(json!({"fade_in": {}})).unwrap();
        assert_eq!(config.fade_in.unwrap().duration_secs(), DEFAULT_FADE_SECS);
        assert!(config.fade_out.is_none());
    }

    #[test]
    fn test_unknown_effects_are_dropped() {
        let config: EditConfig = serde_json::from_value(json!({
            "effects": ["speed_up", "sepia", 42, "black_and_white"]
        }))
        .unwrap();
        assert_eq!(config.effects, vec![Effect::SpeedUp, Effect::BlackAndWhite]);
    }

    #[test]
    fn test_resize_resolution() {
        let exact = ResizeParams {
            width: Some(640),
            height: Some(360),
            scale: Some(2.0),
        };
        assert_eq!(exact.resolve(), Some(Resize::Exact { width: 640, height: 360 }));

        let width_only = ResizeParams {
            width: Some(640),
            height: None,
            scale: Some(0.5),
        };
        assert_eq!(width_only.resolve(), Some(Resize::Scale(0.5)));

        assert_eq!(ResizeParams::default().resolve(), None);
    }

    #[test]
    fn test_overlay_position_forms() {
        let overlay: TextOverlay = serde_json::from_value(json!({
            "text": "hi",
            "position": ["center", "bottom"]
        }))
        .unwrap();
        assert_eq!(overlay.position.y, PositionCoord::keyword("bottom"));

        let overlay: TextOverlay =
            serde_json::from_value(json!({"text": "hi", "position": [40, 80]})).unwrap();
        assert_eq!(overlay.position.x, PositionCoord::Offset(40.0));

        let overlay: TextOverlay =
            serde_json::from_value(json!({"text": "hi", "position": "top"})).unwrap();
        assert_eq!(overlay.position.x, PositionCoord::center());
        assert_eq!(overlay.position.y, PositionCoord::keyword("top"));

        let overlay: TextOverlay = serde_json::from_value(json!({"text": "hi"})).unwrap();
        assert_eq!(overlay.position, OverlayPosition::default());
        assert_eq!(overlay.font_size(), 50);
        assert_eq!(overlay.color(), "white");
        assert_eq!(overlay.font(), "Arial");
    }

    #[test]
    fn test_presets_serialize_back_into_configs() {
        for (name, preset) in edit_presets() {
            let value = serde_json::to_value(&preset.config).unwrap();
            let parsed: EditConfig = serde_json::from_value(value).unwrap();
            assert_eq!(parsed, preset.config, "preset {name}");
        }
    }

    #[test]
    fn test_supported_edits_catalog() {
        let ops = supported_edits();
        assert_eq!(ops.len(), 7);
        assert_eq!(
            ops["effects"].options.as_deref().unwrap(),
            ["black_and_white", "speed_up", "slow_motion"]
        );
    }
}
