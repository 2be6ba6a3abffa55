//! Visual style and aspect ratio definitions.
//!
//! The style table is process-wide static data: every lookup goes through
//! [`StyleTable::global`] and hands out `&'static` profiles, so the planner
//! and renderer share one immutable copy.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Visual aesthetic requested for a generated video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum VideoStyle {
    /// Photorealistic footage
    #[default]
    #[serde(rename = "real")]
    Real,
    /// Japanese animation
    #[serde(rename = "anime")]
    Anime,
    /// 2D cartoon
    #[serde(rename = "cartoon")]
    Cartoon,
    /// Magical / ethereal
    #[serde(rename = "fantasy")]
    Fantasy,
    /// Futuristic science fiction
    #[serde(rename = "sci-fi")]
    SciFi,
}

impl VideoStyle {
    /// All styles, in table order.
    pub const ALL: &'static [VideoStyle] = &[
        VideoStyle::Real,
        VideoStyle::Anime,
        VideoStyle::Cartoon,
        VideoStyle::Fantasy,
        VideoStyle::SciFi,
    ];

    /// Wire tag of the style.
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStyle::Real => "real",
            VideoStyle::Anime => "anime",
            VideoStyle::Cartoon => "cartoon",
            VideoStyle::Fantasy => "fantasy",
            VideoStyle::SciFi => "sci-fi",
        }
    }

    /// Parse a style tag, falling back to [`VideoStyle::Real`] for unknown values.
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Static profile of this style.
    pub fn profile(&self) -> &'static StyleProfile {
        StyleTable::global().get(*self)
    }
}

impl fmt::Display for VideoStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoStyle {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "real" => Ok(VideoStyle::Real),
            "anime" => Ok(VideoStyle::Anime),
            "cartoon" => Ok(VideoStyle::Cartoon),
            "fantasy" => Ok(VideoStyle::Fantasy),
            "sci-fi" => Ok(VideoStyle::SciFi),
            _ => Err(StyleParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown style: {0}")]
pub struct StyleParseError(String);

/// Static description of a style.
#[derive(Debug, Clone, Copy)]
pub struct StyleProfile {
    pub style: VideoStyle,
    /// Human-readable name shown in style pickers
    pub display_name: &'static str,
    /// Prompt decoration appended to every scene
    pub description: &'static str,
    pub keywords: &'static [&'static str],
    /// FFmpeg color name used for placeholder rendering
    pub placeholder_color: &'static str,
}

/// Immutable style lookup table.
#[derive(Debug)]
pub struct StyleTable {
    profiles: [StyleProfile; 5],
}

static STYLE_TABLE: StyleTable = StyleTable {
    profiles: [
        StyleProfile {
            style: VideoStyle::Real,
            display_name: "Photorealistic",
            description: "photorealistic, cinematic, high quality, professional lighting, realistic textures",
            keywords: &["cinematic", "photorealistic", "professional", "high-definition"],
            placeholder_color: "darkblue",
        },
        StyleProfile {
            style: VideoStyle::Anime,
            display_name: "Anime Style",
            description: "anime style, vibrant colors, Japanese animation, detailed characters, cel-shaded",
            keywords: &["anime", "manga", "Japanese animation", "vibrant colors", "stylized"],
            placeholder_color: "purple",
        },
        StyleProfile {
            style: VideoStyle::Cartoon,
            display_name: "Cartoon Style",
            description: "cartoon style, colorful, animated, family-friendly, stylized, 2D animation",
            keywords: &["cartoon", "animated", "colorful", "stylized", "2D"],
            placeholder_color: "orange",
        },
        StyleProfile {
            style: VideoStyle::Fantasy,
            display_name: "Fantasy Style",
            description: "fantasy style, magical, ethereal, mystical atmosphere, enchanted",
            keywords: &["fantasy", "magical", "mystical", "ethereal", "enchanted"],
            placeholder_color: "darkgreen",
        },
        StyleProfile {
            style: VideoStyle::SciFi,
            display_name: "Science Fiction",
            description: "science fiction, futuristic, high-tech, cyberpunk, neon lights",
            keywords: &["sci-fi", "futuristic", "cyberpunk", "high-tech", "neon"],
            placeholder_color: "darkred",
        },
    ],
};

impl StyleTable {
    /// The process-wide style table.
    pub fn global() -> &'static StyleTable {
        &STYLE_TABLE
    }

    /// Profile for a style.
    pub fn get(&self, style: VideoStyle) -> &StyleProfile {
        // Profiles are stored in `VideoStyle::ALL` order.
        &self.profiles[style as usize]
    }

    /// Profiles in table order.
    pub fn iter(&self) -> impl Iterator<Item = &StyleProfile> {
        self.profiles.iter()
    }

    /// Map of style tag to display name.
    pub fn display_names(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|p| (p.style.as_str().to_string(), p.display_name.to_string()))
            .collect()
    }

    /// Preview for a requested style tag.
    ///
    /// Unknown tags are echoed back but described with the default style.
    pub fn preview(&self, requested: &str) -> StylePreview {
        let profile = self.get(VideoStyle::parse_or_default(requested));
        StylePreview {
            style: requested.to_string(),
            description: profile.description.to_string(),
            keywords: profile.keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Example prompts per style, for the style browser.
    pub fn example_prompts(&self) -> BTreeMap<String, Vec<String>> {
        let examples: [(VideoStyle, [&str; 3]); 5] = [
            (
                VideoStyle::Real,
                [
                    "A serene mountain landscape at sunrise with mist rolling over the peaks",
                    "A bustling city street at night with neon lights reflecting on wet pavement",
                    "A close-up of ocean waves crashing against rocky cliffs",
                ],
            ),
            (
                VideoStyle::Anime,
                [
                    "A magical girl transformation sequence with sparkles and flowing ribbons",
                    "A samurai warrior standing in a cherry blossom garden",
                    "A futuristic mecha robot flying through a cyberpunk cityscape",
                ],
            ),
            (
                VideoStyle::Cartoon,
                [
                    "A friendly dragon playing with children in a colorful meadow",
                    "A superhero cat saving the day in a comic book style city",
                    "A group of animals having a tea party in an enchanted forest",
                ],
            ),
            (
                VideoStyle::Fantasy,
                [
                    "A wizard casting spells in an ancient magical library",
                    "Unicorns galloping through an enchanted forest with glowing flowers",
                    "A dragon's lair filled with treasure and mystical artifacts",
                ],
            ),
            (
                VideoStyle::SciFi,
                [
                    "A spaceship traveling through a wormhole with swirling galaxies",
                    "Robots working in a futuristic factory with holographic displays",
                    "An alien planet with floating cities and multiple moons",
                ],
            ),
        ];

        examples
            .into_iter()
            .map(|(style, prompts)| {
                (
                    style.as_str().to_string(),
                    prompts.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect()
    }
}

/// Style preview payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StylePreview {
    pub style: String,
    pub description: String,
    pub keywords: Vec<String>,
}

/// Output frame shape of a generated video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 16:9
    #[default]
    Landscape,
    /// 9:16
    Portrait,
    /// 1:1
    Square,
}

impl AspectRatio {
    pub const ALL: &'static [AspectRatio] = &[
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Square,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "landscape",
            AspectRatio::Portrait => "portrait",
            AspectRatio::Square => "square",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9 Landscape",
            AspectRatio::Portrait => "9:16 Portrait",
            AspectRatio::Square => "1:1 Square",
        }
    }

    /// Placeholder canvas size in pixels (width, height).
    pub fn canvas_size(&self) -> (u32, u32) {
        match self {
            AspectRatio::Landscape => (1280, 720),
            AspectRatio::Portrait => (720, 1280),
            AspectRatio::Square => (720, 720),
        }
    }

    /// Parse an aspect ratio tag, falling back to landscape.
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Map of aspect ratio tag to display name.
    pub fn display_names() -> BTreeMap<String, String> {
        Self::ALL
            .iter()
            .map(|a| (a.as_str().to_string(), a.display_name().to_string()))
            .collect()
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "landscape" | "16:9" => Ok(AspectRatio::Landscape),
            "portrait" | "9:16" => Ok(AspectRatio::Portrait),
            "square" | "1:1" => Ok(AspectRatio::Square),
            _ => Err(AspectRatioParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown aspect ratio: {0}")]
pub struct AspectRatioParseError(String);
