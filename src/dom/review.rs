//! Review step: when the review section comes into view, list every answered
//! prompt under its question.

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

use super::{on_intersect, prompts};
use crate::config::AnchorConfig;
use crate::error::{NarrativeError, describe_js};

const REVIEW_THRESHOLD: f64 = 0.3;

pub(crate) fn init(doc: &Document, anchors: &AnchorConfig) -> Result<(), JsValue> {
    let Some(section) = doc.get_element_by_id(&anchors.review) else {
        warn!("{}; review disabled", NarrativeError::MissingAnchor(anchors.review.clone()));
        return Ok(());
    };
    let Some(container) = doc.get_element_by_id(&anchors.review_container) else {
        warn!("{}; review disabled", NarrativeError::MissingAnchor(anchors.review_container.clone()));
        return Ok(());
    };
    let doc = doc.clone();
    on_intersect(&[section], REVIEW_THRESHOLD, move |_| {
        if let Err(e) = populate(&doc, &container) {
            warn!("review update failed: {}", describe_js(&e));
        }
    })
}

fn populate(doc: &Document, container: &Element) -> Result<(), JsValue> {
    container.set_text_content(None);
    let items = prompts::review_items();
    debug!("review lists {} answers", items.len());
    for item in items {
        let entry = doc.create_element("div")?;
        entry.set_class_name("reviewItem");
        let heading = doc.create_element("h3")?;
        heading.set_attribute("style", "margin-bottom:.4rem;")?;
        heading.set_text_content(Some(&item.question));
        let answer = doc.create_element("p")?;
        answer.set_attribute("style", "text-align:left;")?;
        answer.set_text_content(Some(&item.answer));
        entry.append_child(&heading)?;
        entry.append_child(&answer)?;
        container.append_child(&entry)?;
    }
    Ok(())
}
