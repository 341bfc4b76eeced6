//! Narrative copy: wraps reveal lines in word spans, maps scroll to reveal
//! state and applies the engine's report (classes, media panels, bursts).

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;

use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, Window};

use super::{hair, listen, panels, performance_now};
use crate::config::{KeywordEntry, NarrativeConfig};
use crate::error::{NarrativeError, describe_js};
use crate::narrative::media::{LoadResult, MediaCommand};
use crate::narrative::progress::ScrollGeometry;
use crate::narrative::tokenizer::{Segment, Token, Tokenizer};
use crate::narrative::{BlurUpdate, NarrativeState, TickReport};

const TOKENIZED_ATTR: &str = "data-tokenized";

struct NarrativeView {
    state: NarrativeState,
    spans: Vec<HtmlElement>,
    section: HtmlElement,
    scroller: Option<HtmlElement>,
    visuals: Option<Element>,
    entries: HashMap<String, KeywordEntry>,
    panels: HashMap<String, Element>,
}

thread_local! {
    static NARRATIVE: RefCell<Option<NarrativeView>> = const { RefCell::new(None) };
}

pub(crate) fn init(win: &Window, doc: &Document, config: &NarrativeConfig) -> Result<(), JsValue> {
    let anchors = &config.anchors;
    let section = doc
        .get_element_by_id(&anchors.section)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let copy = doc.get_element_by_id(&anchors.copy);
    let (section, copy) = match (section, copy) {
        (Some(section), Some(copy)) => (section, copy),
        (section, _) => {
            let id = if section.is_none() { &anchors.section } else { &anchors.copy };
            warn!("{}; narrative disabled", NarrativeError::MissingAnchor(id.clone()));
            return Ok(());
        }
    };
    let scroller = doc
        .get_element_by_id(&anchors.scroller)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let visuals = doc.get_element_by_id(&anchors.visuals);
    if visuals.is_none() {
        warn!("#{} not found; media panels disabled", anchors.visuals);
    }

    let tokenizer = Tokenizer::new(&config.phrase_lines);
    let (tokens, spans) = build_word_spans(doc, &copy, &anchors.line_class, &tokenizer)?;
    info!("built {} word spans", spans.len());

    let view = NarrativeView {
        state: NarrativeState::new(config, tokens),
        spans,
        section,
        scroller: scroller.clone(),
        visuals,
        entries: config
            .keywords
            .iter()
            .map(|e| (e.key.clone(), e.clone()))
            .collect(),
        panels: HashMap::new(),
    };
    for span in &view.spans {
        span.class_list().remove_1("revealed").ok();
    }
    NARRATIVE.with(|n| n.replace(Some(view)));

    let scroll_target: &web_sys::EventTarget = match &scroller {
        Some(s) => s.as_ref(),
        None => win.as_ref(),
    };
    listen(scroll_target, "scroll", true, |_: web_sys::Event| on_scroll())?;
    listen(win.as_ref(), "resize", true, |_: web_sys::Event| on_scroll())?;

    // First layout pass may not be settled yet; evaluate again next frame.
    on_scroll();
    let retry = Closure::once_into_js(on_scroll);
    win.request_animation_frame(retry.unchecked_ref())?;
    Ok(())
}

/// Wrap every reveal line of `copy` in token spans. A container that was
/// already tokenized is read back instead of being wrapped twice.
fn build_word_spans(
    doc: &Document,
    copy: &Element,
    line_class: &str,
    tokenizer: &Tokenizer,
) -> Result<(Vec<Token>, Vec<HtmlElement>), JsValue> {
    if copy.has_attribute(TOKENIZED_ATTR) {
        return collect_existing_spans(copy);
    }

    let list = copy.query_selector_all(&format!(".{line_class}"))?;
    let mut lines: Vec<Element> = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            lines.push(el);
        }
    }
    let texts: Vec<String> = lines
        .iter()
        .map(|l| l.text_content().unwrap_or_default())
        .collect();
    let tokenized = tokenizer.tokenize(&texts);

    let mut spans: Vec<HtmlElement> = Vec::with_capacity(tokenized.tokens.len());
    for (line, segments) in lines.iter().zip(&tokenized.lines) {
        line.set_text_content(None);
        for segment in segments {
            match segment {
                Segment::Gap(ws) => {
                    line.append_child(&doc.create_text_node(ws))?;
                }
                Segment::Token(idx) => {
                    let token = &tokenized.tokens[*idx];
                    let span: HtmlElement = doc.create_element("span")?.dyn_into()?;
                    span.set_class_name(if token.is_phrase { "word phrase" } else { "word" });
                    span.set_text_content(Some(&token.text));
                    line.append_child(&span)?;
                    spans.push(span);
                }
            }
        }
    }
    copy.set_attribute(TOKENIZED_ATTR, "")?;
    Ok((tokenized.tokens, spans))
}

fn collect_existing_spans(copy: &Element) -> Result<(Vec<Token>, Vec<HtmlElement>), JsValue> {
    let list = copy.query_selector_all("span.word")?;
    let mut tokens = Vec::with_capacity(list.length() as usize);
    let mut spans = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        let Some(span) = list.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        tokens.push(Token {
            index: tokens.len(),
            text: span.text_content().unwrap_or_default(),
            is_phrase: span.class_list().contains("phrase"),
            revealed: false,
        });
        spans.push(span);
    }
    Ok((tokens, spans))
}

/// Re-read scroll geometry and apply one tick.
pub(crate) fn on_scroll() {
    NARRATIVE.with(|cell| {
        let mut guard = cell.borrow_mut();
        let Some(view) = guard.as_mut() else { return };
        if view.spans.is_empty() {
            return;
        }
        let geometry = view.geometry();
        let report = view.state.on_scroll(geometry, performance_now());
        view.apply(report);
    });
}

/// Frame hook: fire due media timers.
pub(crate) fn advance(now: f64) {
    NARRATIVE.with(|cell| {
        let mut guard = cell.borrow_mut();
        let Some(view) = guard.as_mut() else { return };
        let cmds = view.state.advance(now);
        for cmd in cmds {
            view.apply_media(cmd);
        }
    });
}

/// Load callback from a media element of a constructed panel.
pub(crate) fn record_media_load(key: &str, item: usize, result: LoadResult) {
    NARRATIVE.with(|cell| {
        let mut guard = cell.borrow_mut();
        let Some(view) = guard.as_mut() else { return };
        if let Some(state) = view.state.presenter_mut().record_load(key, item, result) {
            if state.pending() == 0 && state.failed > 0 {
                warn!(
                    "panel `{key}`: {} of {} media items failed to load",
                    state.failed, state.total
                );
            }
        }
    });
}

impl NarrativeView {
    fn geometry(&self) -> ScrollGeometry {
        let win = web_sys::window();
        let viewport_height = match &self.scroller {
            Some(s) => s.client_height() as f64,
            None => win
                .as_ref()
                .and_then(|w| w.inner_height().ok())
                .and_then(|h| h.as_f64())
                .unwrap_or(0.0),
        };
        let scroll_offset = match &self.scroller {
            Some(s) => s.scroll_top() as f64,
            None => win.as_ref().and_then(|w| w.scroll_y().ok()).unwrap_or(0.0),
        };
        ScrollGeometry {
            scroll_offset,
            viewport_height,
            section_top: self.section.offset_top() as f64,
            section_height: self.section.offset_height() as f64,
        }
    }

    fn apply(&mut self, report: TickReport) {
        if report.reveal_changes > 0 {
            for (span, token) in self.spans.iter().zip(self.state.tokens()) {
                span.class_list().toggle_with_force("revealed", token.revealed).ok();
            }
        }
        if !report.evaluated {
            return;
        }
        for key in &report.newly_triggered {
            debug!("first reveal of media for `{key}`");
        }
        if let Some(blur) = &report.blur {
            self.apply_blur(blur);
        }
        if let Some(visuals) = &self.visuals {
            visuals
                .class_list()
                .toggle_with_force("fade-in", self.state.presenter().active_key().is_some())
                .ok();
        }
        for cmd in report.media {
            self.apply_media(cmd);
        }
        if let Some(burst) = report.burst {
            if let Some((x, y)) = self.span_center(&burst.span) {
                hair::spawn_burst(x, y, burst.count);
            }
        }
    }

    fn apply_blur(&self, blur: &BlurUpdate) {
        for (range, on) in [(&blur.previous, false), (&blur.current, true)] {
            let Some(range) = range else { continue };
            for span in self.spans.get(range.clone()).unwrap_or_default() {
                span.class_list().toggle_with_force("blurred", on).ok();
            }
        }
    }

    /// Centre of the bounding box spanning the first and last token.
    fn span_center(&self, span: &Range<usize>) -> Option<(f64, f64)> {
        let first = self.spans.get(span.start)?.get_bounding_client_rect();
        let last = self.spans.get(span.end.checked_sub(1)?)?.get_bounding_client_rect();
        Some(((first.left() + last.right()) / 2.0, (first.top() + last.bottom()) / 2.0))
    }

    fn apply_media(&mut self, cmd: MediaCommand) {
        let Some(visuals) = self.visuals.clone() else { return };
        let result = match &cmd {
            MediaCommand::Construct(key) => self.construct_panel(key),
            MediaCommand::Attach(key) => match self.panels.get(key) {
                Some(panel) => visuals.append_child(panel).map(|_| ()),
                None => Ok(()),
            },
            MediaCommand::Show(key) => self.panel_class(key, true),
            MediaCommand::Hide(key) => self.panel_class(key, false),
            MediaCommand::Detach(key) => {
                if let Some(panel) = self.panels.get(key) {
                    panel.remove();
                }
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!("media command {cmd:?} failed: {}", describe_js(&e));
        }
    }

    fn construct_panel(&mut self, key: &str) -> Result<(), JsValue> {
        let Some(entry) = self.entries.get(key) else { return Ok(()) };
        let doc = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let built = panels::build_panel(&doc, entry)?;
        for item in built.unloadable {
            self.state.presenter_mut().record_load(key, item, LoadResult::Failed);
        }
        self.panels.insert(key.to_owned(), built.element);
        Ok(())
    }

    fn panel_class(&self, key: &str, visible: bool) -> Result<(), JsValue> {
        match self.panels.get(key) {
            Some(panel) => panel.class_list().toggle_with_force("visible", visible).map(|_| ()),
            None => Ok(()),
        }
    }
}
