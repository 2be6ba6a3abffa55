//! FFmpeg filter definitions.
//!
//! Placeholder frames and the whole edit pass are expressed as filter
//! graphs, so every user-supplied string that ends up inside one goes
//! through [`escape_filter_value`].

use vgen_models::edit::{Resize, TextOverlay};
use vgen_models::encoding::{PLACEHOLDER_FONT_SIZE, PROMPT_PREVIEW_CHARS};
use vgen_models::{EditConfig, PositionCoord, StyleTable, VideoInfo};

use crate::error::{MediaError, MediaResult};

/// Escape a value for use as a filter option inside a filter graph.
///
/// Two levels apply: the option parser (`\ ' :`) and then the graph parser
/// (`\ ' , ; [ ]`).
pub fn escape_filter_value(value: &str) -> String {
    let mut option_level = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            option_level.push('\\');
        }
        option_level.push(c);
    }

    let mut graph_level = String::with_capacity(option_level.len());
    for c in option_level.chars() {
        if matches!(c, '\\' | '\'' | ',' | ';' | '[' | ']') {
            graph_level.push('\\');
        }
        graph_level.push(c);
    }
    graph_level
}

/// Background used when a prompt carries no style tag.
pub const DEFAULT_PLACEHOLDER_COLOR: &str = "darkblue";

/// Background color for a placeholder clip.
///
/// The lower-cased prompt is scanned for style tags in table order as whole
/// words; the first hit wins, otherwise [`DEFAULT_PLACEHOLDER_COLOR`].
pub fn placeholder_color(prompt: &str) -> &'static str {
    let lowered = prompt.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|w| !w.is_empty())
        .collect();

    StyleTable::global()
        .iter()
        .find(|profile| words.contains(&profile.style.as_str()))
        .map(|profile| profile.placeholder_color)
        .unwrap_or(DEFAULT_PLACEHOLDER_COLOR)
}

/// Text drawn on a placeholder: the prompt's first characters plus `...`.
pub fn placeholder_caption(prompt: &str) -> String {
    let head: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// `color` source for a solid placeholder clip.
pub fn color_source(color: &str, width: u32, height: u32, secs: u32, fps: u32) -> String {
    format!("color=c={color}:s={width}x{height}:d={secs}:r={fps}")
}

/// Centered white caption for a placeholder clip.
pub fn placeholder_drawtext(caption: &str, font_file: Option<&str>) -> String {
    let mut filter = format!(
        "drawtext=expansion=none:text={}:fontcolor=white:fontsize={}:x=(w-text_w)/2:y=(h-text_h)/2",
        escape_filter_value(caption),
        PLACEHOLDER_FONT_SIZE
    );
    if let Some(font_file) = font_file {
        filter.push_str(":fontfile=");
        filter.push_str(&escape_filter_value(font_file));
    }
    filter
}

fn position_x(coord: &PositionCoord) -> String {
    match coord {
        PositionCoord::Offset(px) => format!("{px}"),
        PositionCoord::Keyword(k) => match k.to_lowercase().as_str() {
            "left" => "0".to_string(),
            "right" => "w-text_w".to_string(),
            _ => "(w-text_w)/2".to_string(),
        },
    }
}

fn position_y(coord: &PositionCoord) -> String {
    match coord {
        PositionCoord::Offset(px) => format!("{px}"),
        PositionCoord::Keyword(k) => match k.to_lowercase().as_str() {
            "top" => "0".to_string(),
            "bottom" => "h-text_h".to_string(),
            _ => "(h-text_h)/2".to_string(),
        },
    }
}

/// `drawtext` for one overlay shown from `start` for `duration` seconds.
pub fn overlay_drawtext(overlay: &TextOverlay, start: f64, duration: f64) -> String {
    format!(
        "drawtext=expansion=none:text={}:font={}:fontsize={}:fontcolor={}:x={}:y={}:enable='between(t,{:.3},{:.3})'",
        escape_filter_value(&overlay.text),
        escape_filter_value(overlay.font()),
        overlay.font_size(),
        escape_filter_value(overlay.color()),
        position_x(&overlay.position.x),
        position_y(&overlay.position.y),
        start,
        start + duration,
    )
}

/// Averages the channels and replicates the mean into R, G and B.
pub const FILTER_BLACK_AND_WHITE: &str = "colorchannelmixer=rr=0.3333:rg=0.3333:rb=0.3333:gr=0.3333:gg=0.3333:gb=0.3333:br=0.3333:bg=0.3333:bb=0.3333";

/// Round down to an even dimension, as required by yuv420p.
fn even(n: u32) -> u32 {
    (n & !1).max(2)
}

/// Resolved input window of the trim step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimWindow {
    pub start: f64,
    pub duration: f64,
}

/// FFmpeg realisation of an [`EditConfig`] for a given input.
#[derive(Debug, Clone, PartialEq)]
pub struct EditPlan {
    /// Input seek and read duration
    pub trim: Option<TrimWindow>,
    /// Video filter chain, in application order
    pub video_filters: Vec<String>,
    /// Audio filter chain, in application order
    pub audio_filters: Vec<String>,
    /// Whether an audio stream is carried to the output
    pub with_audio: bool,
    /// Expected output duration in seconds
    pub output_duration: f64,
}

impl EditPlan {
    /// `-filter_complex` graph producing `[vout]` and, with audio, `[aout]`.
    pub fn filter_complex(&self) -> String {
        let video = if self.video_filters.is_empty() {
            "null".to_string()
        } else {
            self.video_filters.join(",")
        };
        let mut graph = format!("[0:v]{video}[vout]");

        if self.with_audio {
            let audio = if self.audio_filters.is_empty() {
                "anull".to_string()
            } else {
                self.audio_filters.join(",")
            };
            graph.push_str(&format!(";[0:a]{audio}[aout]"));
        }
        graph
    }
}

/// Translate an edit configuration into a filter plan.
///
/// Operations are applied in the fixed order trim, resize, fade_in,
/// fade_out, volume, text_overlays, effects.
pub fn build_edit_plan(config: &EditConfig, info: &VideoInfo) -> MediaResult<EditPlan> {
    let mut plan = EditPlan {
        trim: None,
        video_filters: Vec::new(),
        audio_filters: Vec::new(),
        with_audio: info.has_audio,
        output_duration: info.duration,
    };

    if let Some(trim) = &config.trim {
        let start = trim.start.unwrap_or(0.0);
        if start < 0.0 {
            return Err(MediaError::validation("trim start must not be negative"));
        }
        let mut end = trim.end.unwrap_or(info.duration);
        if info.duration > 0.0 {
            end = end.min(info.duration);
        }
        if start >= end {
            return Err(MediaError::validation(format!(
                "trim start ({start}) must be before end ({end})"
            )));
        }
        plan.trim = Some(TrimWindow {
            start,
            duration: end - start,
        });
        plan.output_duration = end - start;
    }

    if let Some(resize) = config.resize.as_ref().and_then(|r| r.resolve()) {
        let filter = match resize {
            Resize::Exact { width, height } => format!("scale={}:{}", even(width), even(height)),
            Resize::Scale(scale) if scale > 0.0 => {
                format!("scale=trunc(iw*{scale}/2)*2:trunc(ih*{scale}/2)*2")
            }
            Resize::Scale(scale) => {
                return Err(MediaError::validation(format!(
                    "resize scale must be positive, got {scale}"
                )))
            }
        };
        plan.video_filters.push(filter);
        plan.video_filters.push("setsar=1".to_string());
    }

    if let Some(fade) = &config.fade_in {
        let d = positive_duration("fade_in", fade.duration_secs())?;
        plan.video_filters.push(format!("fade=t=in:st=0:d={d}"));
    }

    if let Some(fade) = &config.fade_out {
        let d = positive_duration("fade_out", fade.duration_secs())?;
        let st = (plan.output_duration - d).max(0.0);
        plan.video_filters.push(format!("fade=t=out:st={st:.3}:d={d}"));
    }

    if let Some(volume) = &config.volume {
        let factor = volume.factor();
        if factor < 0.0 {
            return Err(MediaError::validation(format!(
                "volume factor must not be negative, got {factor}"
            )));
        }
        if plan.with_audio {
            plan.audio_filters.push(format!("volume={factor}"));
        }
    }

    for overlay in config.text_overlays.iter().filter(|o| !o.text.is_empty()) {
        let start = overlay.start_secs();
        let duration = overlay
            .duration
            .unwrap_or(plan.output_duration - start)
            .max(0.0);
        plan.video_filters.push(overlay_drawtext(overlay, start, duration));
    }

    for effect in &config.effects {
        match effect.speed_factor() {
            None => plan.video_filters.push(FILTER_BLACK_AND_WHITE.to_string()),
            Some(factor) => {
                plan.video_filters.push(format!("setpts={}*PTS", 1.0 / factor));
                if plan.with_audio {
                    plan.audio_filters.push(format!("atempo={factor}"));
                }
                plan.output_duration /= factor;
            }
        }
    }

    Ok(plan)
}

fn positive_duration(name: &str, d: f64) -> MediaResult<f64> {
    if d > 0.0 {
        Ok(d)
    } else {
        Err(MediaError::validation(format!(
            "{name} duration must be positive, got {d}"
        )))
    }
}

/// Scale-and-pad input `index` onto a common canvas, labelled `[v{index}]`.
pub fn normalize_for_concat(index: usize, width: u32, height: u32, fps: f64) -> String {
    format!(
        "[{index}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={fps}[v{index}]",
        w = even(width),
        h = even(height),
    )
}

/// Concat normalized video labels (and raw audio streams) of `n` inputs.
pub fn concat_filter(n: usize, with_audio: bool) -> String {
    let mut graph = String::new();
    for i in 0..n {
        graph.push_str(&format!("[v{i}]"));
        if with_audio {
            graph.push_str(&format!("[{i}:a]"));
        }
    }
    let a = usize::from(with_audio);
    graph.push_str(&format!("concat=n={n}:v=1:a={a}[vout]"));
    if with_audio {
        graph.push_str("[aout]");
    }
    graph
}
