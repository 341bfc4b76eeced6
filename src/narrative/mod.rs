//! Scroll-synchronized text reveal and keyword-triggered media.
//!
//! [`NarrativeState`] owns every piece of mutable narrative state (tokens,
//! triggered keys, burst arming, media presenter, highlighted span) and runs a
//! scroll tick in a fixed order: reveal, then keyword evaluation, then side
//! effects. It has no DOM dependency; the browser glue feeds it geometry and
//! timestamps and applies the returned report.

pub mod burst;
pub mod matcher;
pub mod media;
pub mod progress;
pub mod reveal;
pub mod tokenizer;

use std::ops::Range;

use log::debug;

use crate::config::{NarrativeConfig, RevealConfig};
use burst::{BurstArming, BurstRequest};
use matcher::{KeywordMatcher, MatchResult};
use media::{MediaCommand, MediaPresenter};
use progress::{Progress, ScrollGeometry};
use tokenizer::{Token, Tokenizer};

/// Highlight change for the matched span: clear `previous`, mark `current`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlurUpdate {
    pub previous: Option<Range<usize>>,
    pub current: Option<Range<usize>>,
}

/// Everything one scroll tick decided, for the DOM layer to apply.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub progress: Progress,
    pub revealed: usize,
    /// Tokens whose reveal flag flipped this tick.
    pub reveal_changes: usize,
    /// `false` when the tick ended before keyword evaluation.
    pub evaluated: bool,
    pub active: Option<MatchResult>,
    pub newly_triggered: Vec<String>,
    pub burst: Option<BurstRequest>,
    pub media: Vec<MediaCommand>,
    pub blur: Option<BlurUpdate>,
}

impl TickReport {
    fn idle(progress: Progress, revealed: usize, reveal_changes: usize) -> Self {
        Self {
            progress,
            revealed,
            reveal_changes,
            evaluated: false,
            active: None,
            newly_triggered: Vec::new(),
            burst: None,
            media: Vec::new(),
            blur: None,
        }
    }
}

pub struct NarrativeState {
    reveal: RevealConfig,
    tokens: Vec<Token>,
    matcher: KeywordMatcher,
    bursts: BurstArming,
    presenter: MediaPresenter,
    blurred: Option<Range<usize>>,
}

impl NarrativeState {
    pub fn new(config: &NarrativeConfig, tokens: Vec<Token>) -> Self {
        Self {
            reveal: config.reveal.clone(),
            matcher: KeywordMatcher::new(&config.keywords, &tokens),
            bursts: BurstArming::new(&config.bursts),
            presenter: MediaPresenter::new(&config.keywords, config.media.clone()),
            tokens,
            blurred: None,
        }
    }

    /// Tokenize plain lines with the configured phrase list.
    pub fn from_lines<S: AsRef<str>>(config: &NarrativeConfig, lines: &[S]) -> Self {
        let tokens = Tokenizer::new(&config.phrase_lines).tokenize(lines).tokens;
        Self::new(config, tokens)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn presenter(&self) -> &MediaPresenter {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut MediaPresenter {
        &mut self.presenter
    }

    pub fn matcher(&self) -> &KeywordMatcher {
        &self.matcher
    }

    pub fn blurred(&self) -> Option<Range<usize>> {
        self.blurred.clone()
    }

    pub fn on_scroll(&mut self, geometry: ScrollGeometry, now: f64) -> TickReport {
        let progress = geometry.progress(&self.reveal);
        self.apply_progress(progress, now)
    }

    pub fn apply_progress(&mut self, progress: Progress, now: f64) -> TickReport {
        let total = self.tokens.len();
        let p = match progress {
            Progress::BeforeStart => {
                let changes = reveal::apply_reveal_count(&mut self.tokens, 0);
                return TickReport::idle(progress, 0, changes);
            }
            Progress::Within(_) if total == 0 => return TickReport::idle(progress, 0, 0),
            Progress::Within(p) => p,
        };

        let count = progress::reveal_count(p, total, &self.reveal);
        let changes = reveal::apply_reveal_count(&mut self.tokens, count);
        if changes > 0 {
            debug!("scroll progress {:.0}%: revealing {count}/{total}", p * 100.0);
        }

        let eval = self.matcher.evaluate(&self.tokens);
        let newly_triggered = self.matcher.record_triggers(&eval);
        let burst = self.bursts.update(&eval);
        let active_key = eval.active.as_ref().map(|m| m.key.as_str());
        let media = self.presenter.set_active_key(active_key, now);

        // Only a match whose media is on display is highlighted.
        let span = eval
            .active
            .as_ref()
            .filter(|m| self.presenter.active_key() == Some(m.key.as_str()))
            .map(|m| m.span.clone());
        let blur = (span != self.blurred).then(|| BlurUpdate {
            previous: std::mem::replace(&mut self.blurred, span.clone()),
            current: span,
        });

        TickReport {
            progress,
            revealed: count,
            reveal_changes: changes,
            evaluated: true,
            active: eval.active,
            newly_triggered,
            burst,
            media,
            blur,
        }
    }

    /// Fire media timers due at `now`.
    pub fn advance(&mut self, now: f64) -> Vec<MediaCommand> {
        self.presenter.advance(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BurstTarget, KeywordEntry, MediaItem};

    fn config() -> NarrativeConfig {
        NarrativeConfig {
            phrase_lines: vec!["protective when attached".into()],
            keywords: vec![
                KeywordEntry::new("50", vec![MediaItem::new(Some("A"), "a.png")]),
                KeywordEntry::new("waste", vec![MediaItem::new(None, "b.jpg")]),
            ],
            bursts: vec![BurstTarget { key: "50".into(), count: 50 }],
            ..NarrativeConfig::default()
        }
    }

    #[test]
    fn before_start_hides_everything_and_skips_matching() {
        let mut state = NarrativeState::from_lines(&config(), &["Roughly 50 hairs"]);
        let full = state.apply_progress(Progress::Within(1.0), 0.0);
        assert_eq!(full.active.as_ref().map(|m| m.key.as_str()), Some("50"));
        let out = state.apply_progress(Progress::BeforeStart, 10.0);
        assert!(!out.evaluated);
        assert_eq!(out.reveal_changes, 3);
        assert!(out.media.is_empty() && out.burst.is_none() && out.blur.is_none());
        assert!(state.tokens().iter().all(|t| !t.revealed));
        // media untouched while out of view
        assert_eq!(state.presenter().active_key(), Some("50"));
    }

    #[test]
    fn blur_follows_active_span() {
        let mut state = NarrativeState::from_lines(&config(), &["Roughly 50 hairs, not waste"]);
        let tick = state.apply_progress(Progress::Within(1.0), 0.0);
        assert_eq!(tick.blur, Some(BlurUpdate { previous: None, current: Some(4..5) }));
        let again = state.apply_progress(Progress::Within(1.0), 5.0);
        assert_eq!(again.blur, None);
        let cleared = state.apply_progress(Progress::Within(0.0), 10.0);
        assert_eq!(cleared.blur, Some(BlurUpdate { previous: Some(4..5), current: None }));
        assert_eq!(state.blurred(), None);
    }

    #[test]
    fn key_without_media_clears_blur() {
        let mut cfg = config();
        cfg.keywords.push(KeywordEntry::new("waste", Vec::new()));
        cfg.keywords.remove(1);
        let mut state = NarrativeState::from_lines(&cfg, &["Roughly 50 hairs, not waste"]);
        let first = state.apply_progress(Progress::Within(0.5), 0.0);
        assert_eq!(first.active.as_ref().map(|m| m.key.as_str()), Some("50"));
        assert_eq!(state.blurred(), Some(1..2));

        let tick = state.apply_progress(Progress::Within(1.0), 10.0);
        assert_eq!(tick.active.as_ref().map(|m| m.key.as_str()), Some("waste"));
        assert_eq!(state.presenter().active_key(), None);
        assert_eq!(tick.blur, Some(BlurUpdate { previous: Some(1..2), current: None }));
        assert_eq!(state.blurred(), None);
    }

    #[test]
    fn empty_narrative_is_inert() {
        let mut state = NarrativeState::from_lines::<&str>(&config(), &[]);
        let out = state.apply_progress(Progress::Within(1.0), 0.0);
        assert!(!out.evaluated);
        assert_eq!(out.revealed, 0);
    }

    #[test]
    fn triggers_are_recorded_once_per_page_life() {
        let mut state = NarrativeState::from_lines(&config(), &["waste"]);
        let first = state.apply_progress(Progress::Within(1.0), 0.0);
        assert_eq!(first.newly_triggered, ["waste"]);
        state.apply_progress(Progress::Within(0.0), 1.0);
        let again = state.apply_progress(Progress::Within(1.0), 2.0);
        assert!(again.newly_triggered.is_empty());
        assert!(state.matcher().has_triggered("waste"));
    }
}
