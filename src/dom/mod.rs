//! Browser glue: binds the narrative engine and the hair canvas to the page.
//!
//! All state lives in per-component `thread_local!` cells and is only touched
//! from event listeners and the animation frame loop on the main thread.
//! Each component looks up its own anchors and stays inert when they are
//! missing or fail to bind, so one broken element never takes the rest of the
//! page down.

pub(crate) mod archive;
pub(crate) mod hair;
pub(crate) mod page;
pub(crate) mod panels;
pub(crate) mod prompts;
pub(crate) mod review;
pub(crate) mod text;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Element, EventTarget, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, window,
};

use crate::config::NarrativeConfig;
use crate::error::describe_js;

thread_local! {
    static STARTED: Cell<bool> = const { Cell::new(false) };
}

/// Bind every component and start the frame loop. Listeners live for the
/// page; a repeat call (the page may call on both `DOMContentLoaded` and
/// `load`) only re-syncs the reveal with the current scroll position.
pub(crate) fn start(config: NarrativeConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if STARTED.with(|s| s.replace(true)) {
        info!("narrative already started; re-syncing scroll state");
        text::on_scroll();
        return Ok(());
    }

    keep_going("narrative text", text::init(&win, &doc, &config));
    keep_going("hair canvas", hair::init(&win, &doc, &config.particles, &config.anchors.canvas));
    keep_going("prompts", prompts::init(&doc, &config.prompts));
    keep_going("review", review::init(&doc, &config.anchors));
    keep_going("archive", archive::init(&doc, &config));
    keep_going("page", page::init(&doc, &config));

    start_frame_loop();
    info!("narrative started");
    Ok(())
}

fn keep_going(component: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        warn!("{component} disabled: {}", describe_js(&e));
    }
}

pub(crate) fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Attach a listener for the page lifetime.
pub(crate) fn listen<E, F>(target: &EventTarget, event: &str, passive: bool, handler: F) -> Result<(), JsValue>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let mut handler = handler;
    let closure = Closure::wrap(Box::new(move |evt: web_sys::Event| {
        if let Ok(evt) = evt.dyn_into::<E>() {
            handler(evt);
        }
    }) as Box<dyn FnMut(_)>);
    let opts = AddEventListenerOptions::new();
    opts.set_passive(passive);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.as_ref().unchecked_ref(),
        &opts,
    )?;
    closure.forget();
    Ok(())
}

/// Call `on_enter` with each target that crosses `threshold` into view.
pub(crate) fn on_intersect<F>(targets: &[Element], threshold: f64, on_enter: F) -> Result<(), JsValue>
where
    F: FnMut(Element) + 'static,
{
    let mut on_enter = on_enter;
    let callback = Closure::wrap(Box::new(move |entries: js_sys::Array, _: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else { continue };
            if entry.is_intersecting() {
                on_enter(entry.target());
            }
        }
    }) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(threshold));
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    for target in targets {
        observer.observe(target);
    }
    callback.forget();
    Ok(())
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// One rAF loop drives the hair simulation, the media fade timers and the
/// landing hover cycle. Runs whether or not anything scrolled, so strands
/// keep settling.
fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        hair::frame();
        text::advance(ts);
        page::advance(ts);
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(w), Some(cb)) = (window(), g.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
