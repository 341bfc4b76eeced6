//! Landing hover loop. While the question mark is hovered it cycles through
//! the configured words, one per interval; after `reveal_after_ms` of a
//! single hover the landing section activates for good. The word position
//! carries over between hovers.

use crate::config::LandingConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HoverUpdate {
    Text(String),
    Activate,
}

pub struct HoverCycle {
    cfg: LandingConfig,
    hover_started: Option<f64>,
    steps_taken: u64,
    next_word: usize,
    activated: bool,
}

impl HoverCycle {
    pub fn new(cfg: LandingConfig) -> Self {
        Self { cfg, hover_started: None, steps_taken: 0, next_word: 0, activated: false }
    }

    pub fn is_hovered(&self) -> bool {
        self.hover_started.is_some()
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn enter(&mut self, now: f64) {
        if self.hover_started.is_none() {
            self.hover_started = Some(now);
            self.steps_taken = 0;
        }
    }

    /// Stop cycling and restore the resting text.
    pub fn leave(&mut self) -> HoverUpdate {
        self.hover_started = None;
        HoverUpdate::Text(self.cfg.rest_text.clone())
    }

    /// Updates due at frame time `now`. Several missed intervals collapse
    /// into one text change.
    pub fn advance(&mut self, now: f64) -> Vec<HoverUpdate> {
        let mut out = Vec::new();
        let Some(start) = self.hover_started else { return out };
        let elapsed = (now - start).max(0.0);
        if !self.activated && elapsed >= self.cfg.reveal_after_ms {
            self.activated = true;
            out.push(HoverUpdate::Activate);
        }

        let len = self.cfg.words.len() as u64;
        if len == 0 || self.cfg.word_interval_ms <= 0.0 {
            return out;
        }
        let due = (elapsed / self.cfg.word_interval_ms).floor() as u64;
        if due > self.steps_taken {
            let steps = due - self.steps_taken;
            self.steps_taken = due;
            let shown = (self.next_word as u64 + steps - 1) % len;
            self.next_word = ((shown + 1) % len) as usize;
            out.push(HoverUpdate::Text(self.cfg.words[shown as usize].clone()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> HoverUpdate {
        HoverUpdate::Text(s.into())
    }

    #[test]
    fn cycles_words_and_activates_once() {
        let mut c = HoverCycle::new(LandingConfig::default());
        assert!(c.advance(100.0).is_empty());
        c.enter(0.0);
        assert!(c.advance(799.0).is_empty());
        assert_eq!(c.advance(800.0), [text("forget")]);
        assert_eq!(c.advance(1000.0), [HoverUpdate::Activate]);
        assert!(c.is_activated());
        // two intervals missed: only the latest word is shown
        assert_eq!(c.advance(2400.0), [text("remember")]);
        assert_eq!(c.leave(), text("?"));
        assert!(!c.is_hovered());

        c.enter(5000.0);
        assert_eq!(c.advance(5800.0), [text("let go")]);
        assert_eq!(c.advance(6600.0), [text("forget")]);
    }

    #[test]
    fn short_hover_does_not_activate() {
        let mut c = HoverCycle::new(LandingConfig::default());
        c.enter(0.0);
        c.advance(900.0);
        c.leave();
        c.enter(2000.0);
        assert!(!c.advance(2900.0).contains(&HoverUpdate::Activate));
        assert!(c.advance(3000.0).contains(&HoverUpdate::Activate));
    }

    #[test]
    fn empty_word_list_only_activates() {
        let cfg = LandingConfig { words: Vec::new(), ..LandingConfig::default() };
        let mut c = HoverCycle::new(cfg);
        c.enter(0.0);
        assert_eq!(c.advance(5000.0), [HoverUpdate::Activate]);
    }
}
