//! Media panel presentation as an explicit per-panel state machine.
//!
//! Panel lifecycle:
//! `Constructing -> Attached -> FadingIn -> Visible -> FadingOut -> Removed`,
//! where a removed or fading-out panel can be re-attached. The presenter emits
//! [`MediaCommand`]s for the DOM layer and keeps its own timers; every
//! transition bumps the panel generation so a timer scheduled under an older
//! generation is dropped when it comes due.

use std::collections::HashMap;

use log::{debug, warn};

use crate::config::{KeywordEntry, MediaTiming};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelPhase {
    Constructing,
    Attached,
    FadingIn,
    Visible,
    FadingOut,
    Removed,
}

impl PanelPhase {
    fn is_on_screen(self) -> bool {
        matches!(self, PanelPhase::Attached | PanelPhase::FadingIn | PanelPhase::Visible)
    }
}

/// DOM side effect requested by the presenter, keyed by keyword.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaCommand {
    /// Build the panel elements; issued once per key for the page lifetime.
    Construct(String),
    /// Append (or move) the cached panel into the visuals container.
    Attach(String),
    /// Add the visible class, starting the fade-in transition.
    Show(String),
    /// Remove the visible class, starting the fade-out transition.
    Hide(String),
    /// Take the panel out of the document; it stays cached.
    Detach(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadResult {
    Loaded,
    Failed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelLoadState {
    pub total: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl PanelLoadState {
    pub fn pending(&self) -> usize {
        self.total - self.loaded - self.failed
    }

    pub fn is_partial(&self) -> bool {
        self.pending() == 0 && self.failed > 0 && self.loaded > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerAction {
    Show,
    Settle,
    Detach,
}

#[derive(Debug)]
struct Timer {
    key: String,
    action: TimerAction,
    due_ms: f64,
    generation: u64,
}

#[derive(Debug)]
struct Panel {
    phase: PanelPhase,
    generation: u64,
    loads: Vec<Option<LoadResult>>,
}

pub struct MediaPresenter {
    timing: MediaTiming,
    item_counts: HashMap<String, usize>,
    panels: HashMap<String, Panel>,
    active: Option<String>,
    timers: Vec<Timer>,
}

impl MediaPresenter {
    pub fn new(entries: &[KeywordEntry], timing: MediaTiming) -> Self {
        Self {
            timing,
            item_counts: entries.iter().map(|e| (e.key.clone(), e.media.len())).collect(),
            panels: HashMap::new(),
            active: None,
            timers: Vec::new(),
        }
    }

    pub fn active_key(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn phase(&self, key: &str) -> Option<PanelPhase> {
        self.panels.get(key).map(|p| p.phase)
    }

    /// Keys whose panel currently carries the visible class.
    pub fn visible_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .panels
            .iter()
            .filter(|(_, p)| matches!(p.phase, PanelPhase::FadingIn | PanelPhase::Visible))
            .map(|(k, _)| k.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn has_pending_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Switch the displayed panel. Same key twice is a no-op; `None` or a key
    /// without media clears the display.
    pub fn set_active_key(&mut self, key: Option<&str>, now: f64) -> Vec<MediaCommand> {
        let mut cmds = Vec::new();
        let key = match key {
            Some(k) if self.item_counts.get(k).copied().unwrap_or(0) > 0 => Some(k),
            Some(k) => {
                if !self.item_counts.contains_key(k) {
                    warn!("no media configured for keyword `{k}`");
                }
                None
            }
            None => None,
        };
        if self.active.as_deref() == key {
            return cmds;
        }

        let outgoing: Vec<String> = self
            .panels
            .iter()
            .filter(|(k, p)| p.phase.is_on_screen() && Some(k.as_str()) != key)
            .map(|(k, _)| k.clone())
            .collect();
        for k in outgoing {
            self.fade_out(&k, now, &mut cmds);
        }

        match key {
            Some(k) => {
                self.bring_in(k, now, &mut cmds);
                self.active = Some(k.to_owned());
            }
            None => self.active = None,
        }
        cmds
    }

    /// Fire every timer due at `now`, oldest first. Stale timers are dropped.
    pub fn advance(&mut self, now: f64) -> Vec<MediaCommand> {
        let mut cmds = Vec::new();
        let mut due: Vec<Timer> = Vec::new();
        let mut i = 0;
        while i < self.timers.len() {
            if self.timers[i].due_ms <= now {
                due.push(self.timers.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));

        for timer in due {
            let Some(panel) = self.panels.get_mut(&timer.key) else { continue };
            if panel.generation != timer.generation {
                debug!("dropping stale {:?} timer for `{}`", timer.action, timer.key);
                continue;
            }
            panel.generation += 1;
            match timer.action {
                TimerAction::Show => {
                    panel.phase = PanelPhase::FadingIn;
                    cmds.push(MediaCommand::Show(timer.key.clone()));
                    let generation = panel.generation;
                    self.schedule(&timer.key, TimerAction::Settle, timer.due_ms + self.timing.fade_in_ms, generation);
                }
                TimerAction::Settle => panel.phase = PanelPhase::Visible,
                TimerAction::Detach => {
                    panel.phase = PanelPhase::Removed;
                    cmds.push(MediaCommand::Detach(timer.key.clone()));
                }
            }
        }
        cmds
    }

    /// Record the load outcome of one media item in a panel.
    pub fn record_load(&mut self, key: &str, item: usize, result: LoadResult) -> Option<PanelLoadState> {
        let panel = self.panels.get_mut(key)?;
        let slot = panel.loads.get_mut(item)?;
        *slot = Some(result);
        self.load_state(key)
    }

    pub fn load_state(&self, key: &str) -> Option<PanelLoadState> {
        let panel = self.panels.get(key)?;
        let mut state = PanelLoadState { total: panel.loads.len(), ..Default::default() };
        for load in panel.loads.iter().flatten() {
            match load {
                LoadResult::Loaded => state.loaded += 1,
                LoadResult::Failed => state.failed += 1,
            }
        }
        Some(state)
    }

    fn bring_in(&mut self, key: &str, now: f64, cmds: &mut Vec<MediaCommand>) {
        let items = self.item_counts.get(key).copied().unwrap_or(0);
        let panel = self.panels.entry(key.to_owned()).or_insert_with(|| {
            cmds.push(MediaCommand::Construct(key.to_owned()));
            Panel { phase: PanelPhase::Constructing, generation: 0, loads: vec![None; items] }
        });
        if panel.phase.is_on_screen() {
            return;
        }
        panel.phase = PanelPhase::Attached;
        panel.generation += 1;
        let generation = panel.generation;
        cmds.push(MediaCommand::Attach(key.to_owned()));
        self.schedule(key, TimerAction::Show, now + self.timing.fade_in_delay_ms, generation);
    }

    fn fade_out(&mut self, key: &str, now: f64, cmds: &mut Vec<MediaCommand>) {
        let Some(panel) = self.panels.get_mut(key) else { return };
        panel.phase = PanelPhase::FadingOut;
        panel.generation += 1;
        let generation = panel.generation;
        cmds.push(MediaCommand::Hide(key.to_owned()));
        self.schedule(key, TimerAction::Detach, now + self.timing.fade_out_ms, generation);
    }

    fn schedule(&mut self, key: &str, action: TimerAction, due_ms: f64, generation: u64) {
        self.timers.push(Timer { key: key.to_owned(), action, due_ms, generation });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaItem;

    fn presenter() -> MediaPresenter {
        let entries = vec![
            KeywordEntry::new("a", vec![MediaItem::new(Some("A"), "a.png")]),
            KeywordEntry::new("b", vec![MediaItem::new(None, "b1.jpg"), MediaItem::new(None, "b2.mp4")]),
            KeywordEntry::new("empty", vec![]),
        ];
        MediaPresenter::new(&entries, MediaTiming::default())
    }

    fn cmd_keys(cmds: &[MediaCommand]) -> Vec<String> {
        cmds.iter().map(|c| format!("{c:?}")).collect()
    }

    #[test]
    fn first_activation_constructs_attaches_then_shows() {
        let mut p = presenter();
        let cmds = p.set_active_key(Some("a"), 0.0);
        assert_eq!(cmds, [MediaCommand::Construct("a".into()), MediaCommand::Attach("a".into())]);
        assert_eq!(p.phase("a"), Some(PanelPhase::Attached));
        assert!(p.advance(199.0).is_empty());
        assert_eq!(p.advance(200.0), [MediaCommand::Show("a".into())]);
        assert_eq!(p.phase("a"), Some(PanelPhase::FadingIn));
        assert!(p.advance(1000.0).is_empty());
        assert_eq!(p.phase("a"), Some(PanelPhase::Visible));
        assert!(!p.has_pending_timers());
    }

    #[test]
    fn same_key_twice_is_a_no_op() {
        let mut p = presenter();
        p.set_active_key(Some("a"), 0.0);
        assert!(p.set_active_key(Some("a"), 10.0).is_empty());
        let shows = p.advance(5000.0);
        assert_eq!(shows, [MediaCommand::Show("a".into())]);
        assert_eq!(p.visible_keys(), ["a"]);
    }

    #[test]
    fn switching_fades_out_previous_and_detaches_later() {
        let mut p = presenter();
        p.set_active_key(Some("a"), 0.0);
        p.advance(2000.0);
        let cmds = p.set_active_key(Some("b"), 3000.0);
        assert_eq!(
            cmd_keys(&cmds),
            ["Hide(\"a\")", "Construct(\"b\")", "Attach(\"b\")"]
        );
        assert_eq!(p.advance(3200.0), [MediaCommand::Show("b".into())]);
        assert_eq!(p.advance(3800.0), [MediaCommand::Detach("a".into())]);
        p.advance(10_000.0);
        assert_eq!(p.phase("a"), Some(PanelPhase::Removed));
        assert_eq!(p.visible_keys(), ["b"]);
        assert_eq!(p.active_key(), Some("b"));
    }

    #[test]
    fn reactivation_cancels_pending_removal_and_reuses_cache() {
        let mut p = presenter();
        p.set_active_key(Some("a"), 0.0);
        p.advance(1500.0);
        p.set_active_key(Some("b"), 2000.0);
        let back = p.set_active_key(Some("a"), 2300.0);
        assert!(!back.contains(&MediaCommand::Construct("a".into())));
        assert!(back.contains(&MediaCommand::Attach("a".into())));
        assert!(back.contains(&MediaCommand::Hide("b".into())));
        let later = p.advance(10_000.0);
        assert!(!later.contains(&MediaCommand::Detach("a".into())));
        assert!(later.contains(&MediaCommand::Detach("b".into())));
        assert!(!later.contains(&MediaCommand::Show("b".into())));
        assert_eq!(p.visible_keys(), ["a"]);
    }

    #[test]
    fn clearing_hides_without_replacement() {
        let mut p = presenter();
        p.set_active_key(Some("a"), 0.0);
        p.advance(500.0);
        assert_eq!(p.set_active_key(None, 600.0), [MediaCommand::Hide("a".into())]);
        assert!(p.set_active_key(None, 700.0).is_empty());
        assert_eq!(p.advance(1400.0), [MediaCommand::Detach("a".into())]);
        assert!(p.visible_keys().is_empty());
        assert_eq!(p.active_key(), None);
    }

    #[test]
    fn key_without_media_clears() {
        let mut p = presenter();
        p.set_active_key(Some("a"), 0.0);
        let cmds = p.set_active_key(Some("empty"), 10.0);
        assert_eq!(cmds, [MediaCommand::Hide("a".into())]);
        assert_eq!(p.active_key(), None);
        assert!(p.set_active_key(Some("unknown"), 20.0).is_empty());
    }

    #[test]
    fn rapid_switches_leave_one_visible_panel() {
        let mut p = presenter();
        p.set_active_key(Some("a"), 0.0);
        p.set_active_key(Some("b"), 50.0);
        p.advance(220.0);
        p.advance(10_000.0);
        assert_eq!(p.visible_keys(), ["b"]);
        assert_eq!(p.phase("a"), Some(PanelPhase::Removed));
    }

    #[test]
    fn fade_in_and_fade_out_use_their_own_durations() {
        let entries = vec![
            KeywordEntry::new("a", vec![MediaItem::new(None, "a.png")]),
            KeywordEntry::new("b", vec![MediaItem::new(None, "b.png")]),
        ];
        let timing = MediaTiming { fade_in_delay_ms: 100.0, fade_in_ms: 300.0, fade_out_ms: 1000.0 };
        let mut p = MediaPresenter::new(&entries, timing);
        p.set_active_key(Some("a"), 0.0);
        assert_eq!(p.advance(100.0), [MediaCommand::Show("a".into())]);
        p.advance(399.0);
        assert_eq!(p.phase("a"), Some(PanelPhase::FadingIn));
        p.advance(400.0);
        assert_eq!(p.phase("a"), Some(PanelPhase::Visible));

        p.set_active_key(Some("b"), 500.0);
        p.advance(1499.0);
        assert_eq!(p.phase("a"), Some(PanelPhase::FadingOut));
        assert_eq!(p.advance(1500.0), [MediaCommand::Detach("a".into())]);
    }

    #[test]
    fn load_results_aggregate_per_panel() {
        let mut p = presenter();
        assert_eq!(p.load_state("b"), None);
        p.set_active_key(Some("b"), 0.0);
        let state = p.load_state("b").unwrap();
        assert_eq!((state.total, state.pending()), (2, 2));
        p.record_load("b", 0, LoadResult::Loaded);
        let state = p.record_load("b", 1, LoadResult::Failed).unwrap();
        assert_eq!((state.loaded, state.failed, state.pending()), (1, 1, 0));
        assert!(state.is_partial());
        assert_eq!(p.record_load("b", 7, LoadResult::Loaded), None);
    }
}
