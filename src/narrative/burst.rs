//! Milestone burst arming. A milestone fires once while it stays matched and
//! re-arms as soon as it stops matching, so scrolling away and back fires it
//! again.

use std::collections::HashSet;
use std::ops::Range;

use super::matcher::Evaluation;
use crate::config::BurstTarget;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurstRequest {
    pub key: String,
    pub count: u32,
    /// Matched token span the burst is centred on.
    pub span: Range<usize>,
}

pub struct BurstArming {
    targets: Vec<BurstTarget>,
    fired: HashSet<String>,
}

impl BurstArming {
    pub fn new(targets: &[BurstTarget]) -> Self {
        Self { targets: targets.to_vec(), fired: HashSet::new() }
    }

    pub fn is_armed(&self, key: &str) -> bool {
        self.targets.iter().any(|t| t.key == key) && !self.fired.contains(key)
    }

    /// Re-arm milestones that no longer match, then fire the active match if
    /// it is an armed milestone.
    pub fn update(&mut self, eval: &Evaluation) -> Option<BurstRequest> {
        for target in &self.targets {
            if !eval.is_matched(&target.key) {
                self.fired.remove(&target.key);
            }
        }
        let active = eval.active.as_ref()?;
        let target = self.targets.iter().find(|t| t.key == active.key)?;
        if target.count == 0 || !self.fired.insert(target.key.clone()) {
            return None;
        }
        Some(BurstRequest { key: target.key.clone(), count: target.count, span: active.span.clone() })
    }
}
