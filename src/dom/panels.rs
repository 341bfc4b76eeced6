//! Media panel elements. Each keyword gets one `.visItem` container built on
//! first use and kept for the page lifetime.

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlImageElement, HtmlVideoElement};

use super::{listen, text};
use crate::config::{KeywordEntry, MediaKind};
use crate::narrative::media::LoadResult;

const MEDIA_STYLE: &str = "width:100%; height:100%; object-fit:contain;";

pub(crate) struct BuiltPanel {
    pub element: Element,
    /// Items that had no source to load.
    pub unloadable: Vec<usize>,
}

pub(crate) fn build_panel(doc: &Document, entry: &KeywordEntry) -> Result<BuiltPanel, JsValue> {
    let container = doc.create_element("div")?;
    container.set_class_name("visItem");
    container.set_attribute(
        "style",
        "display:flex; flex-direction:column; gap:1rem; align-items:center; justify-content:center;",
    )?;

    let mut unloadable = Vec::new();
    for (idx, item) in entry.media.iter().enumerate() {
        let rect = doc.create_element("div")?;
        rect.set_class_name("media-rect");

        if let Some(caption) = &item.caption {
            let tooltip = doc.create_element("div")?;
            tooltip.set_class_name("tooltip");
            tooltip.set_text_content(Some(caption));
            rect.append_child(&tooltip)?;
        }

        if item.url.is_empty() {
            warn!("keyword `{}` item {idx} has no url", entry.key);
            unloadable.push(idx);
        } else {
            let media: Element = match item.kind() {
                MediaKind::Video => {
                    let video: HtmlVideoElement = doc.create_element("video")?.dyn_into()?;
                    video.set_src(&item.url);
                    video.set_controls(true);
                    watch_load(&video, "loadeddata", &entry.key, idx, &item.url)?;
                    video.into()
                }
                MediaKind::Image => {
                    let img: HtmlImageElement = doc.create_element("img")?.dyn_into()?;
                    img.set_src(&item.url);
                    img.set_alt(item.caption.as_deref().unwrap_or(&entry.key));
                    watch_load(&img, "load", &entry.key, idx, &item.url)?;
                    img.into()
                }
            };
            media.set_attribute("style", MEDIA_STYLE)?;
            rect.append_child(&media)?;
        }
        container.append_child(&rect)?;
    }
    Ok(BuiltPanel { element: container, unloadable })
}

/// Report success or failure of one media element back to the presenter.
/// A failing item only affects itself.
fn watch_load(el: &Element, ok_event: &str, key: &str, idx: usize, url: &str) -> Result<(), JsValue> {
    let ok_key = key.to_owned();
    listen(el.as_ref(), ok_event, false, move |_: web_sys::Event| {
        text::record_media_load(&ok_key, idx, LoadResult::Loaded);
    })?;
    let err_key = key.to_owned();
    let url = url.to_owned();
    listen(el.as_ref(), "error", false, move |_: web_sys::Event| {
        warn!("media failed to load: {url}");
        text::record_media_load(&err_key, idx, LoadResult::Failed);
    })
}
