//! Narrative configuration: page anchors, reveal tuning, keyword → media
//! table, milestone bursts, media timing, particle tuning and the prompt
//! binding table. Every section has a default matching the shipped page, so a
//! JSON override only needs the fields it changes.

use serde::Deserialize;

use crate::error::Result;

/// How a media item is rendered, sniffed from its file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let ext = path.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("mp4" | "webm" | "ogg") => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MediaItem {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub url: String,
}

impl MediaItem {
    pub fn new(caption: Option<&str>, url: &str) -> Self {
        Self { caption: caption.map(str::to_owned), url: url.to_owned() }
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_url(&self.url)
    }
}

/// A text pattern and the media shown while it is the active match.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct KeywordEntry {
    pub key: String,
    #[serde(default, alias = "images")]
    pub media: Vec<MediaItem>,
}

impl KeywordEntry {
    pub fn new(key: &str, media: Vec<MediaItem>) -> Self {
        Self { key: key.to_owned(), media }
    }
}

/// Milestone keyword that spawns `count` strands when first matched.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BurstTarget {
    pub key: String,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Share of the section's scrollable distance used for the reveal.
    pub scroll_fraction: f64,
    /// Minimum reveal distance, in viewport heights.
    pub min_viewports: f64,
    /// Exponent applied to progress before converting to a token count.
    pub easing_exponent: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self { scroll_fraction: 0.85, min_viewports: 2.0, easing_exponent: 1.2 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MediaTiming {
    /// Delay between attaching a panel and adding its visible class.
    pub fade_in_delay_ms: f64,
    pub fade_in_ms: f64,
    pub fade_out_ms: f64,
}

impl Default for MediaTiming {
    fn default() -> Self {
        Self { fade_in_delay_ms: 200.0, fade_in_ms: 800.0, fade_out_ms: 800.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub capacity: usize,
    pub pointer_interval_ms: f64,
    pub gravity: f64,
    pub horizontal_damping: f64,
    pub landing_damping: f64,
    pub palette: Vec<String>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            capacity: 450,
            pointer_interval_ms: 35.0,
            gravity: 0.18,
            horizontal_damping: 0.99,
            landing_damping: 0.35,
            palette: crate::HAIR_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Element ids and class names the browser glue binds to.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub section: String,
    pub copy: String,
    pub scroller: String,
    pub visuals: String,
    pub canvas: String,
    pub line_class: String,
    pub photo_input: String,
    pub photo_preview: String,
    pub submit_button: String,
    pub overlay: String,
    pub review: String,
    pub review_container: String,
    pub landing: String,
    pub question: String,
    pub investigate: String,
    pub begin: String,
    pub scene: String,
    /// Class of every page section; sections fade in on first view.
    pub section_class: String,
    /// Class of in-section buttons that scroll to the following section.
    pub next_class: String,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            section: "background".into(),
            copy: "bgCopy".into(),
            scroller: "scroller".into(),
            visuals: "bgVisuals".into(),
            canvas: "hairCanvas".into(),
            line_class: "reveal-line".into(),
            photo_input: "photoInput".into(),
            photo_preview: "photoPreview".into(),
            submit_button: "submitArchive".into(),
            overlay: "overlay".into(),
            review: "review".into(),
            review_container: "reviewContainer".into(),
            landing: "landing".into(),
            question: "question".into(),
            investigate: "investigate".into(),
            begin: "beginFromBg".into(),
            scene: "scene".into(),
            section_class: "section".into(),
            next_class: "next".into(),
        }
    }
}

/// Ties a prompt toggle (`data-prompt` value) to its answer field and to the
/// archive field the answer is submitted under.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PromptBinding {
    pub prompt: String,
    pub field_id: String,
    pub archive_field: String,
    /// Heading shown in the review step; the toggle's own text when absent.
    #[serde(default)]
    pub question: Option<String>,
}

/// Landing hover loop: the question mark cycles through `words` while
/// hovered and the landing section activates after `reveal_after_ms`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LandingConfig {
    pub words: Vec<String>,
    pub rest_text: String,
    pub word_interval_ms: f64,
    pub reveal_after_ms: f64,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            words: crate::LANDING_WORDS.iter().map(|w| w.to_string()).collect(),
            rest_text: "?".into(),
            word_interval_ms: 800.0,
            reveal_after_ms: 1000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub anchors: AnchorConfig,
    pub reveal: RevealConfig,
    pub phrase_lines: Vec<String>,
    pub keywords: Vec<KeywordEntry>,
    pub bursts: Vec<BurstTarget>,
    pub media: MediaTiming,
    pub particles: ParticleConfig,
    pub prompts: Vec<PromptBinding>,
    pub landing: LandingConfig,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            anchors: AnchorConfig::default(),
            reveal: RevealConfig::default(),
            phrase_lines: crate::PHRASE_LINES.iter().map(|p| p.to_string()).collect(),
            keywords: crate::KEYWORD_MEDIA
                .iter()
                .map(|(key, items)| {
                    KeywordEntry::new(key, items.iter().map(|(c, u)| MediaItem::new(*c, u)).collect())
                })
                .collect(),
            bursts: crate::BURST_TARGETS
                .iter()
                .map(|(key, count)| BurstTarget { key: key.to_string(), count: *count })
                .collect(),
            media: MediaTiming::default(),
            particles: ParticleConfig::default(),
            prompts: crate::PROMPT_FIELDS
                .iter()
                .map(|(prompt, field_id, archive_field)| PromptBinding {
                    prompt: prompt.to_string(),
                    field_id: field_id.to_string(),
                    archive_field: archive_field.to_string(),
                    question: None,
                })
                .collect(),
            landing: LandingConfig::default(),
        }
    }
}

impl NarrativeConfig {
    /// Parse a JSON override; absent sections fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn burst_count(&self, key: &str) -> Option<u32> {
        self.bursts.iter().find(|b| b.key == key).map(|b| b.count)
    }
}
