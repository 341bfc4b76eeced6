//! Reflection prompt toggles. The binding table from config is resolved to
//! elements once at start; toggles and answer collection only use it.

use std::cell::RefCell;

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent};

use super::listen;
use crate::config::PromptBinding;
use crate::review::ReviewItem;

struct BoundPrompt {
    binding: PromptBinding,
    toggle: Element,
    field: HtmlElement,
}

thread_local! {
    static PROMPTS: RefCell<Vec<BoundPrompt>> = const { RefCell::new(Vec::new()) };
}

pub(crate) fn init(doc: &Document, bindings: &[PromptBinding]) -> Result<(), JsValue> {
    let mut bound = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let toggle = doc.query_selector(&format!("[data-prompt=\"{}\"]", binding.prompt))?;
        let field = doc
            .get_element_by_id(&binding.field_id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        let (Some(toggle), Some(field)) = (toggle, field) else {
            warn!("prompt `{}` not bound: toggle or #{} missing", binding.prompt, binding.field_id);
            continue;
        };
        for (attr, default) in [("tabindex", "0"), ("role", "button"), ("aria-expanded", "false")] {
            if !toggle.has_attribute(attr) {
                toggle.set_attribute(attr, default)?;
            }
        }
        bound.push(BoundPrompt { binding: binding.clone(), toggle, field });
    }

    for (idx, prompt) in bound.iter().enumerate() {
        listen(prompt.toggle.as_ref(), "click", false, move |_: web_sys::Event| toggle_prompt(idx))?;
        listen(prompt.toggle.as_ref(), "keydown", false, move |evt: KeyboardEvent| {
            let key = evt.key();
            if key == "Enter" || key == " " {
                evt.prevent_default();
                toggle_prompt(idx);
            }
        })?;
    }
    PROMPTS.with(|p| p.replace(bound));
    Ok(())
}

/// Open prompt `idx` (closing all others), or close it if already open.
fn toggle_prompt(idx: usize) {
    PROMPTS.with(|cell| {
        let prompts = cell.borrow();
        let Some(target) = prompts.get(idx) else { return };
        let was_open = !target.field.class_list().contains("hidden");
        for p in prompts.iter() {
            p.field.class_list().add_1("hidden").ok();
            p.toggle.set_attribute("aria-expanded", "false").ok();
        }
        if !was_open {
            target.field.class_list().remove_1("hidden").ok();
            target.toggle.set_attribute("aria-expanded", "true").ok();
            target.field.focus().ok();
            move_caret_to_end(&target.field);
        }
    });
}

fn move_caret_to_end(field: &HtmlElement) {
    if let Some(ta) = field.dyn_ref::<HtmlTextAreaElement>() {
        let end = ta.value().encode_utf16().count() as u32;
        ta.set_selection_start(Some(end)).ok();
        ta.set_selection_end(Some(end)).ok();
    }
}

/// `(archive field, answer)` for every bound prompt.
pub(crate) fn collect_answers() -> Vec<(String, String)> {
    PROMPTS.with(|cell| {
        cell.borrow()
            .iter()
            .map(|p| (p.binding.archive_field.clone(), field_value(&p.field)))
            .collect()
    })
}

/// Answered prompts, in binding order, for the review step.
pub(crate) fn review_items() -> Vec<ReviewItem> {
    PROMPTS.with(|cell| {
        cell.borrow()
            .iter()
            .filter_map(|p| {
                let toggle_text = p.toggle.text_content();
                ReviewItem::from_prompt(&p.binding, toggle_text.as_deref(), &field_value(&p.field))
            })
            .collect()
    })
}

fn field_value(field: &HtmlElement) -> String {
    if let Some(ta) = field.dyn_ref::<HtmlTextAreaElement>() {
        ta.value()
    } else if let Some(input) = field.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else {
        field.text_content().unwrap_or_default()
    }
}
