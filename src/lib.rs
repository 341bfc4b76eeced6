//! Strand Archive core crate.
//!
//! Scroll-driven narrative for the hair archive page: narrative text reveals
//! word by word as the visitor scrolls, revealed keywords bring in media
//! panels, and falling hair strands follow the pointer and burst at narrative
//! milestones. The page calls `start_narrative()` once the DOM is ready.
//!
//! `narrative` and `particles` are plain Rust and run natively under
//! `cargo test`; `dom` is the browser glue.

use wasm_bindgen::prelude::*;

pub mod archive;
pub mod config;
mod dom;
pub mod error;
pub mod landing;
pub mod narrative;
pub mod particles;
pub mod review;

pub use config::NarrativeConfig;
pub use error::NarrativeError;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
    console_log::init_with_level(level).ok();
}

// -----------------------------------------------------------------------------
// Page content tables (defaults for `NarrativeConfig`)
// -----------------------------------------------------------------------------

/// Lines that reveal as a single unit instead of word by word.
pub const PHRASE_LINES: &[&str] = &[
    "protective when attached",
    "adaptive when challenged",
    "regenerative when lost",
];

const SHEDDING_SOURCE: &str = "Source: Goren, Andy & Shapiro, J. & Sinclair, Rodney & Lonky, Neal & Situm, Mirna & Bulat, Vedrana & Bolanča, Željana & McCoy, John. (2016). Prevalence of hair shedding among women. Dermatologic therapy. 30. 10.1111/dth.12415.";

/// Keyword → (caption, url) media, in evaluation order (last match wins).
pub const KEYWORD_MEDIA: &[(&str, &[(Option<&str>, &str)])] = &[
    ("50", &[(Some(SHEDDING_SOURCE), "images/50-strands.png")]),
    ("100", &[(Some(SHEDDING_SOURCE), "images/100-strands.png")]),
    ("waste", &[(None, "images/waste_1.webp"), (None, "images/waste_2.jpg"), (None, "images/waste_3.jpg")]),
    ("resource", &[(None, "images/resource_1.jpg"), (None, "images/resource_2.jpeg")]),
    ("evidence", &[(None, "images/evidence_1.png"), (None, "images/evidence_2.webp"), (None, "images/evidence_3.jpg")]),
    (
        "protective when attached",
        &[(None, "images/protective_1.jpeg"), (None, "images/protective_2.mp4"), (None, "images/protective_3.webp")],
    ),
    ("adaptive when challenged", &[(None, "images/adaptive_1.webp"), (None, "images/adaptive_2.webp")]),
    ("regenerative when lost", &[(None, "images/regenerative_1.webp"), (None, "images/regenerative_2.webp")]),
];

/// Milestone keywords and how many strands they release.
pub const BURST_TARGETS: &[(&str, u32)] = &[("50", 50), ("100", 100)];

/// Words the landing question mark cycles through while hovered.
pub const LANDING_WORDS: &[&str] = &["forget", "savor", "remember", "let go"];

pub const HAIR_PALETTE: &[&str] = &["#1a1a1a", "#d1b16f", "#a3a7ab", "#8b5a2b", "#5f4631"];

/// (data-prompt value, answer field id, archive field name)
pub const PROMPT_FIELDS: &[(&str, &str, &str)] = &[
    ("origin", "originText", "origin"),
    ("emotion", "emotionText", "emotion"),
    ("connection", "connectionText", "connection"),
    ("connection-1", "connectionText-1", "connection_1"),
    ("connection-2", "connectionText-2", "connection_2"),
    ("connection-3", "connectionText-3", "connection_3"),
    ("connection-4", "connectionText-4", "connection_4"),
    ("connection-5", "connectionText-5", "connection_5"),
];

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_narrative() -> Result<(), JsValue> {
    dom::start(NarrativeConfig::default())
}

/// Start with a JSON config; missing sections use the defaults above.
#[wasm_bindgen(js_name = startNarrativeWithConfig)]
pub fn start_narrative_with_config(json: &str) -> Result<(), JsValue> {
    let config = NarrativeConfig::from_json(json)?;
    dom::start(config)
}

/// Burst hook for page scripts. Silently ignored until the hair canvas is
/// running.
#[wasm_bindgen(js_name = spawnBurst)]
pub fn spawn_burst(x: f64, y: f64, count: u32) {
    dom::hair::spawn_burst(x, y, count);
}
