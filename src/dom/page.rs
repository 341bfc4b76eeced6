//! Page chrome around the narrative: sections fading in on first view, the
//! landing hover loop, and the buttons that smooth-scroll between sections.

use std::cell::RefCell;

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, ScrollBehavior, ScrollIntoViewOptions};

use super::{listen, on_intersect, performance_now};
use crate::config::NarrativeConfig;
use crate::error::NarrativeError;
use crate::landing::{HoverCycle, HoverUpdate};

const SECTION_THRESHOLD: f64 = 0.2;

struct LandingView {
    question: HtmlElement,
    landing: Option<Element>,
    cycle: HoverCycle,
}

thread_local! {
    static LANDING: RefCell<Option<LandingView>> = const { RefCell::new(None) };
}

pub(crate) fn init(doc: &Document, config: &NarrativeConfig) -> Result<(), JsValue> {
    let anchors = &config.anchors;

    let sections = elements(doc, &format!(".{}", anchors.section_class))?;
    on_intersect(&sections, SECTION_THRESHOLD, |section| {
        section.class_list().add_1("visible").ok();
    })?;

    match doc
        .get_element_by_id(&anchors.question)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    {
        Some(question) => {
            listen(question.as_ref(), "mouseenter", false, |_: web_sys::Event| {
                let now = performance_now();
                with_landing(|v| v.cycle.enter(now));
            })?;
            listen(question.as_ref(), "mouseleave", false, |_: web_sys::Event| {
                with_landing(|v| {
                    let rest = v.cycle.leave();
                    v.apply(rest);
                });
            })?;
            LANDING.with(|cell| {
                cell.replace(Some(LandingView {
                    question,
                    landing: doc.get_element_by_id(&anchors.landing),
                    cycle: HoverCycle::new(config.landing.clone()),
                }))
            });
        }
        None => warn!("{}; landing loop disabled", NarrativeError::MissingAnchor(anchors.question.clone())),
    }

    scroll_button(doc, &anchors.investigate, &anchors.section)?;
    scroll_button(doc, &anchors.begin, &anchors.scene)?;

    let section_selector = format!(".{}", anchors.section_class);
    for button in elements(doc, &format!(".{}", anchors.next_class))? {
        let source = button.clone();
        let selector = section_selector.clone();
        listen(button.as_ref(), "click", false, move |_: web_sys::Event| {
            let next = source
                .closest(&selector)
                .ok()
                .flatten()
                .and_then(|section| section.next_element_sibling());
            if let Some(next) = next {
                smooth_scroll(&next);
            }
        })?;
    }
    Ok(())
}

/// Frame hook: advance the hover cycle.
pub(crate) fn advance(now: f64) {
    with_landing(|v| {
        for update in v.cycle.advance(now) {
            v.apply(update);
        }
    });
}

fn with_landing(f: impl FnOnce(&mut LandingView)) {
    LANDING.with(|cell| {
        if let Some(view) = cell.borrow_mut().as_mut() {
            f(view);
        }
    });
}

impl LandingView {
    fn apply(&self, update: HoverUpdate) {
        match update {
            HoverUpdate::Text(text) => self.question.set_text_content(Some(&text)),
            HoverUpdate::Activate => {
                if let Some(landing) = &self.landing {
                    landing.class_list().add_1("active").ok();
                }
            }
        }
    }
}

fn scroll_button(doc: &Document, button_id: &str, target_id: &str) -> Result<(), JsValue> {
    let Some(button) = doc.get_element_by_id(button_id) else { return Ok(()) };
    let target_id = target_id.to_owned();
    listen(button.as_ref(), "click", false, move |_: web_sys::Event| {
        let target = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&target_id));
        if let Some(target) = target {
            smooth_scroll(&target);
        }
    })
}

fn smooth_scroll(target: &Element) {
    let opts = ScrollIntoViewOptions::new();
    opts.set_behavior(ScrollBehavior::Smooth);
    target.scroll_into_view_with_scroll_into_view_options(&opts);
}

fn elements(doc: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let list = doc.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i).and_then(|n| n.dyn_into::<Element>().ok()))
        .collect())
}
