//! Scene planning: script + style + duration → ordered scene prompts.

use vgen_models::{StyleTable, VideoStyle};

/// Target seconds of video per scene when splitting long scripts.
pub const SECONDS_PER_SCENE: u32 = 5;
/// Scripts for videos up to this length become a single scene.
pub const SINGLE_SCENE_MAX_SECS: u32 = 10;

const SENTENCE_SEPARATOR: &str = ". ";

/// Turns scripts into decorated scene prompts using the shared style table.
#[derive(Debug, Clone, Copy)]
pub struct ScenePlanner {
    styles: &'static StyleTable,
}

impl Default for ScenePlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenePlanner {
    pub fn new() -> Self {
        Self {
            styles: StyleTable::global(),
        }
    }

    /// Plan the scene prompts for a script.
    ///
    /// Short videos get one richly decorated prompt. Longer ones split the
    /// script on `". "` into buckets of
    /// `max(1, sentences / (duration / 5))` sentences, one prompt per
    /// non-empty bucket.
    pub fn plan(&self, script: &str, style: VideoStyle, duration_secs: u32) -> Vec<String> {
        let description = self.styles.get(style).description;

        if duration_secs <= SINGLE_SCENE_MAX_SECS {
            return vec![format!(
                "{script}. {description}. High quality video production, smooth camera movement, professional cinematography."
            )];
        }

        split_into_scenes(script, duration_secs)
            .into_iter()
            .map(|scene| format!("{scene}. {description}. High quality video production."))
            .collect()
    }
}

/// Group sentences into scenes of roughly [`SECONDS_PER_SCENE`] each.
pub fn split_into_scenes(script: &str, duration_secs: u32) -> Vec<String> {
    let sentences: Vec<&str> = script.split(SENTENCE_SEPARATOR).collect();
    let target_scenes = (duration_secs / SECONDS_PER_SCENE).max(1) as usize;
    let bucket = (sentences.len() / target_scenes).max(1);

    let scenes: Vec<String> = sentences
        .chunks(bucket)
        .map(|chunk| chunk.join(SENTENCE_SEPARATOR))
        .filter(|scene| !scene.is_empty())
        .collect();

    if scenes.is_empty() {
        vec![script.to_string()]
    } else {
        scenes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUFFIX: &str = ". High quality video production.";

    fn strip(prompt: &str, style: VideoStyle) -> String {
        let tail = format!(". {}{}", style.profile().description, SUFFIX);
        prompt.strip_suffix(&tail).unwrap().to_string()
    }

    #[test]
    fn test_short_video_single_prompt() {
        let planner = ScenePlanner::new();
        let prompts = planner.plan("A cat sleeps", VideoStyle::Anime, 10);
        assert_eq!(prompts.len(), 1);
        assert_eq!(
            prompts[0],
            format!(
                "A cat sleeps. {}. High quality video production, smooth camera movement, professional cinematography.",
                VideoStyle::Anime.profile().description
            )
        );
    }

    #[test]
    fn test_long_video_splits_sentences() {
        let script = "S1. S2. S3. S4. S5. S6";
        let prompts = ScenePlanner::new().plan(script, VideoStyle::Real, 15);
        // 6 sentences / (15 / 5) = 2 per scene
        assert_eq!(prompts.len(), 3);
        assert_eq!(strip(&prompts[0], VideoStyle::Real), "S1. S2");
        assert_eq!(strip(&prompts[2], VideoStyle::Real), "S5. S6");
    }

    #[test]
    fn test_scene_reconstruction_preserves_script() {
        let script = "One. Two. Three. Four. Five. Six. Seven";
        for duration in [11, 15, 20, 35, 60, 600] {
            let prompts = ScenePlanner::new().plan(script, VideoStyle::SciFi, duration);
            let rebuilt: Vec<String> = prompts
                .iter()
                .map(|p| strip(p, VideoStyle::SciFi))
                .collect();
            assert_eq!(rebuilt.join(". "), script, "duration {duration}");
        }
    }

    #[test]
    fn test_more_scenes_than_sentences() {
        let prompts = ScenePlanner::new().plan("Just one sentence", VideoStyle::Fantasy, 600);
        assert_eq!(prompts.len(), 1);
        assert_eq!(strip(&prompts[0], VideoStyle::Fantasy), "Just one sentence");
    }

    #[test]
    fn test_uneven_buckets() {
        // 7 sentences / (20 / 5) = 1 per scene
        assert_eq!(split_into_scenes("a. b. c. d. e. f. g", 20).len(), 7);
        // 5 sentences / (11 / 5) = 2 per scene → 3 scenes
        assert_eq!(
            split_into_scenes("a. b. c. d. e", 11),
            vec!["a. b".to_string(), "c. d".to_string(), "e".to_string()]
        );
    }

    #[test]
    fn test_empty_fragments_are_skipped() {
        // A leading separator yields an empty first sentence
        let scenes = split_into_scenes(". tail", 15);
        assert_eq!(scenes, vec!["tail".to_string()]);
        assert_eq!(split_into_scenes("", 15), vec!["".to_string()]);
    }
}
