// Integration tests (native) for the `strand-archive` crate.
// These drive the narrative engine and particle field end to end without any
// browser APIs, so they run under `cargo test` on the host.

use strand_archive::config::{BurstTarget, KeywordEntry, MediaItem, ParticleConfig};
use strand_archive::narrative::NarrativeState;
use strand_archive::narrative::media::{MediaCommand, PanelPhase};
use strand_archive::narrative::progress::{Progress, ScrollGeometry};
use strand_archive::particles::ParticleField;
use strand_archive::NarrativeConfig;

const PHRASE: &str = "protective when attached";

fn config() -> NarrativeConfig {
    NarrativeConfig {
        keywords: vec![
            KeywordEntry::new("50", vec![MediaItem::new(Some("A"), "a.png")]),
            KeywordEntry::new("waste", vec![MediaItem::new(None, "b.jpg")]),
            KeywordEntry::new(PHRASE, vec![MediaItem::new(None, "c.mp4")]),
        ],
        bursts: vec![BurstTarget { key: "50".into(), count: 50 }],
        ..NarrativeConfig::default()
    }
}

fn state() -> NarrativeState {
    NarrativeState::from_lines(&config(), &["Roughly 50 hairs a day.", "This is not waste.", PHRASE])
}

// Progress that reveals exactly `k` of 10 tokens under the default easing.
fn progress_for(k: usize) -> Progress {
    if k >= 10 {
        return Progress::Within(1.0);
    }
    Progress::Within(((k as f64 + 0.5) / 10.0).powf(1.0 / 1.2))
}

fn cmd(kind: fn(String) -> MediaCommand, key: &str) -> MediaCommand {
    kind(key.to_owned())
}

#[test]
fn phrase_line_is_one_token() {
    let s = state();
    assert_eq!(s.tokens().len(), 10);
    let last = &s.tokens()[9];
    assert!(last.is_phrase);
    assert_eq!(last.text, PHRASE);
    assert!(s.tokens()[..9].iter().all(|t| !t.is_phrase));
}

#[test]
fn scrolling_through_the_narrative() {
    let mut s = state();

    let tick = s.apply_progress(Progress::Within(0.05), 0.0);
    assert_eq!(tick.revealed, 0);
    assert!(tick.active.is_none() && tick.media.is_empty());

    let tick = s.apply_progress(progress_for(1), 100.0);
    assert_eq!(tick.revealed, 1);
    assert!(tick.active.is_none());

    // "50" revealed: panel comes in and the milestone bursts.
    let tick = s.apply_progress(progress_for(2), 200.0);
    assert_eq!(tick.revealed, 2);
    assert_eq!(tick.active.as_ref().map(|m| m.key.as_str()), Some("50"));
    let burst = tick.burst.expect("milestone burst");
    assert_eq!((burst.key.as_str(), burst.count, burst.span), ("50", 50, 1..2));
    assert_eq!(tick.media, [cmd(MediaCommand::Construct, "50"), cmd(MediaCommand::Attach, "50")]);
    assert_eq!(s.advance(400.0), [cmd(MediaCommand::Show, "50")]);

    // "waste" is later in the table and takes over; "50" stays matched so no
    // second burst.
    let tick = s.apply_progress(progress_for(9), 1500.0);
    assert_eq!(tick.active.as_ref().map(|m| m.key.as_str()), Some("waste"));
    assert!(tick.burst.is_none());
    assert_eq!(
        tick.media,
        [
            cmd(MediaCommand::Hide, "50"),
            cmd(MediaCommand::Construct, "waste"),
            cmd(MediaCommand::Attach, "waste"),
        ]
    );
    assert_eq!(s.advance(1700.0), [cmd(MediaCommand::Show, "waste")]);
    assert_eq!(s.advance(2300.0), [cmd(MediaCommand::Detach, "50")]);
    assert_eq!(s.presenter().phase("50"), Some(PanelPhase::Removed));

    let tick = s.apply_progress(progress_for(10), 3000.0);
    let active = tick.active.expect("phrase match");
    assert_eq!((active.key.as_str(), active.span), (PHRASE, 9..10));
    assert_eq!(
        tick.media,
        [
            cmd(MediaCommand::Hide, "waste"),
            cmd(MediaCommand::Construct, PHRASE),
            cmd(MediaCommand::Attach, PHRASE),
        ]
    );
    assert!(s.matcher().has_triggered("50") && s.matcher().has_triggered("waste"));
}

#[test]
fn milestone_rearms_after_scrolling_back() {
    let mut s = state();
    assert!(s.apply_progress(progress_for(2), 0.0).burst.is_some());
    assert!(s.apply_progress(progress_for(2), 50.0).burst.is_none());

    let back = s.apply_progress(progress_for(1), 100.0);
    assert!(back.active.is_none());
    assert_eq!(back.media, [cmd(MediaCommand::Hide, "50")]);

    let bursts = [200.0, 300.0, 400.0]
        .into_iter()
        .filter_map(|now| s.apply_progress(progress_for(2), now).burst)
        .count();
    assert_eq!(bursts, 1);
}

#[test]
fn scroll_geometry_drives_reveal() {
    let mut s = state();
    let geom = |scroll: f64| ScrollGeometry {
        scroll_offset: scroll,
        viewport_height: 800.0,
        section_top: 1000.0,
        section_height: 3000.0,
    };
    s.apply_progress(Progress::Within(1.0), 0.0);

    let above = s.on_scroll(geom(900.0), 10.0);
    assert_eq!(above.progress, Progress::BeforeStart);
    assert!(s.tokens().iter().all(|t| !t.revealed));

    let mut last = 0;
    for scroll in (1000..=3000).step_by(50) {
        let tick = s.on_scroll(geom(scroll as f64), 20.0);
        assert!(tick.revealed >= last, "reveal went backwards at {scroll}");
        last = tick.revealed;
    }
    assert_eq!(last, 10);
}

#[test]
fn particle_field_is_capped_and_settles() {
    let mut field = ParticleField::new(ParticleConfig::default(), 800.0, 600.0, 1.0, 7);
    field.spawn_burst(400.0, 100.0, 1000);
    assert_eq!(field.len(), 450);
    for _ in 0..600 {
        field.step();
    }
    assert!(field.particles().all(|p| p.resting));
    assert!(field.particles().all(|p| (0.0..=800.0).contains(&p.x) && p.y <= 600.0));
}

#[test]
fn burst_export_is_ignored_before_start() {
    strand_archive::spawn_burst(10.0, 10.0, 50);
}
