//! Closing flow: photo capture and submission to the page's archive client
//! (`window.supabaseClient.submitArchive`). Failures are shown in the
//! overlay; the chosen photo and prompt answers stay put for a retry.

use std::cell::RefCell;

use js_sys::{Function, JSON, Object, Promise, Reflect};
use log::{error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, Element, File, HtmlButtonElement, HtmlElement, HtmlImageElement, HtmlInputElement, Url};

use super::{listen, prompts};
use crate::archive::{ArchiveFields, ArchiveReceipt};
use crate::config::NarrativeConfig;
use crate::error::{NarrativeError, Result, describe_js};

const SUBMIT_LABEL: &str = "Release to Archive";
const PENDING_LABEL: &str = "Submitting...";

struct ClosingFlow {
    photo: Option<File>,
    preview_url: Option<String>,
    overlay_id: String,
}

thread_local! {
    static CLOSING: RefCell<Option<ClosingFlow>> = const { RefCell::new(None) };
}

pub(crate) fn init(doc: &Document, config: &NarrativeConfig) -> Result<(), JsValue> {
    let anchors = &config.anchors;
    CLOSING.with(|c| {
        c.replace(Some(ClosingFlow {
            photo: None,
            preview_url: None,
            overlay_id: anchors.overlay.clone(),
        }))
    });

    match doc
        .get_element_by_id(&anchors.photo_input)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    {
        Some(input) => {
            let preview_id = anchors.photo_preview.clone();
            let source = input.clone();
            listen(input.as_ref(), "change", false, move |_: web_sys::Event| {
                on_photo_selected(&source, &preview_id);
            })?;
        }
        None => warn!("#{} not found; photo upload disabled", anchors.photo_input),
    }

    match doc
        .get_element_by_id(&anchors.submit_button)
        .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
    {
        Some(button) => {
            let target = button.clone();
            listen(button.as_ref(), "click", false, move |_: web_sys::Event| {
                on_submit(target.clone());
            })?;
        }
        None => warn!("#{} not found; archive submission disabled", anchors.submit_button),
    }
    Ok(())
}

fn on_photo_selected(input: &HtmlInputElement, preview_id: &str) {
    let Some(file) = input.files().and_then(|f| f.get(0)) else { return };
    let url = match Url::create_object_url_with_blob(&file) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("photo preview unavailable: {}", describe_js(&e));
            None
        }
    };
    if let (Some(url), Some(doc)) = (&url, web_sys::window().and_then(|w| w.document())) {
        if let Some(img) = doc
            .get_element_by_id(preview_id)
            .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
        {
            img.set_src(url);
            img.style().set_property("display", "block").ok();
        }
    }
    CLOSING.with(|c| {
        if let Some(flow) = c.borrow_mut().as_mut() {
            if let Some(old) = flow.preview_url.take() {
                Url::revoke_object_url(&old).ok();
            }
            info!("photo selected: {} ({} bytes)", file.name(), file.size());
            flow.photo = Some(file);
            flow.preview_url = url;
        }
    });
}

fn on_submit(button: HtmlButtonElement) {
    let pending = CLOSING.with(|c| {
        c.borrow()
            .as_ref()
            .map(|flow| (flow.photo.clone(), flow.overlay_id.clone()))
    });
    let Some((photo, overlay_id)) = pending else { return };
    let Some(photo) = photo else {
        show_overlay(&overlay_id, &NarrativeError::MissingPhoto.to_string());
        return;
    };

    let answers = prompts::collect_answers();
    let fields = ArchiveFields::from_answers(answers.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    button.set_disabled(true);
    button.set_text_content(Some(PENDING_LABEL));

    spawn_local(async move {
        let message = match submit_archive(&photo, &fields).await {
            Ok(receipt) => {
                info!(
                    "archive submitted: {}",
                    receipt.uploaded.as_ref().map(|u| u.path.as_str()).unwrap_or("<no upload>")
                );
                "Your strand has joined the archive.".to_owned()
            }
            Err(e) => {
                error!("archive submission failed: {e}");
                format!("Error: {e}")
            }
        };
        show_overlay(&overlay_id, &message);
        button.set_disabled(false);
        button.set_text_content(Some(SUBMIT_LABEL));
    });
}

/// Call the external archive client with the photo and answers.
pub(crate) async fn submit_archive(photo: &File, fields: &ArchiveFields) -> Result<ArchiveReceipt> {
    let window = web_sys::window().ok_or(NarrativeError::ArchiveUnavailable)?;
    let client = Reflect::get(&window, &JsValue::from_str("supabaseClient"))
        .ok()
        .filter(|c| c.is_object())
        .ok_or(NarrativeError::ArchiveUnavailable)?;
    let submit: Function = Reflect::get(&client, &JsValue::from_str("submitArchive"))
        .ok()
        .and_then(|f| f.dyn_into().ok())
        .ok_or(NarrativeError::ArchiveUnavailable)?;

    let payload = serde_json::to_string(fields).map_err(|e| NarrativeError::Archive(e.to_string()))?;
    let args: Object = JSON::parse(&payload)
        .map_err(NarrativeError::from)?
        .dyn_into()
        .map_err(NarrativeError::from)?;
    Reflect::set(&args, &JsValue::from_str("file"), photo)?;

    let promise: Promise = submit
        .call1(&client, &args)
        .map_err(|e| NarrativeError::Archive(describe_js(&e)))?
        .dyn_into()
        .map_err(|_| NarrativeError::Archive("submitArchive did not return a promise".into()))?;
    let result = JsFuture::from(promise)
        .await
        .map_err(|e| NarrativeError::Archive(describe_js(&e)))?;

    let text = JSON::stringify(&result).ok().and_then(|s| s.as_string());
    ArchiveReceipt::from_response(text.as_deref())
}

/// Show `message` in the overlay with a close button.
fn show_overlay(overlay_id: &str, message: &str) {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else { return };
    let Some(overlay) = doc
        .get_element_by_id(overlay_id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        warn!("#{overlay_id} missing; message dropped: {message}");
        return;
    };
    if let Err(e) = fill_overlay(&doc, &overlay, message) {
        warn!("overlay update failed: {}", describe_js(&e));
    }
}

fn fill_overlay(doc: &Document, overlay: &HtmlElement, message: &str) -> Result<(), JsValue> {
    let content: Element = match overlay.query_selector(".overlayContent")? {
        Some(el) => el,
        None => overlay.clone().into(),
    };
    content.set_text_content(None);
    let text = doc.create_element("p")?;
    text.set_text_content(Some(message));
    content.append_child(&text)?;

    let close = doc.create_element("button")?;
    close.set_id("closeOverlay");
    close.set_class_name("btn primary");
    close.set_text_content(Some("Close"));
    content.append_child(&close)?;
    let hide = overlay.clone();
    listen(close.as_ref(), "click", false, move |_: web_sys::Event| {
        hide.style().set_property("display", "none").ok();
    })?;

    overlay.style().set_property("display", "flex")?;
    Ok(())
}
