//! Maps raw scroll position within the narrative section to reveal progress.

use crate::config::RevealConfig;

/// Scroll measurements for one tick, all in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollGeometry {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub section_top: f64,
    pub section_height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Progress {
    /// Scroll position is above the section; nothing may be revealed.
    BeforeStart,
    Within(f64),
}

impl ScrollGeometry {
    pub fn progress(&self, cfg: &RevealConfig) -> Progress {
        let scrolled_through = self.scroll_offset - self.section_top;
        if scrolled_through < 0.0 {
            return Progress::BeforeStart;
        }
        let reveal_distance = self.reveal_distance(cfg);
        if reveal_distance <= 0.0 || !reveal_distance.is_finite() {
            return Progress::Within(1.0);
        }
        Progress::Within((scrolled_through / reveal_distance).clamp(0.0, 1.0))
    }

    /// Reveal completes within the section's scroll range but never over less
    /// than `min_viewports` screens.
    pub fn reveal_distance(&self, cfg: &RevealConfig) -> f64 {
        let scrollable = self.section_height - self.viewport_height;
        (scrollable * cfg.scroll_fraction).max(self.viewport_height * cfg.min_viewports)
    }
}

pub fn eased(progress: f64, cfg: &RevealConfig) -> f64 {
    progress.clamp(0.0, 1.0).powf(cfg.easing_exponent)
}

/// Number of tokens revealed at `progress`; non-decreasing in `progress`.
pub fn reveal_count(progress: f64, total: usize, cfg: &RevealConfig) -> usize {
    let count = (eased(progress, cfg) * total as f64).floor();
    (count.max(0.0) as usize).min(total)
}
