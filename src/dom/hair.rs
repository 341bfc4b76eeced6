//! Hair canvas: full-viewport overlay drawing the particle field each frame.

use std::cell::RefCell;

use log::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent, Window, window};

use super::{listen, performance_now};
use crate::config::ParticleConfig;
use crate::error::NarrativeError;
use crate::particles::{HairShape, Particle, ParticleField};

struct HairView {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    field: ParticleField,
}

thread_local! {
    static HAIR: RefCell<Option<HairView>> = const { RefCell::new(None) };
}

pub(crate) fn init(win: &Window, doc: &Document, cfg: &ParticleConfig, canvas_id: &str) -> Result<(), JsValue> {
    let Some(el) = doc.get_element_by_id(canvas_id) else {
        warn!("{}; hair effect disabled", NarrativeError::MissingAnchor(canvas_id.to_owned()));
        return Ok(());
    };
    let canvas: HtmlCanvasElement = el.dyn_into()?;
    let Some(ctx) = canvas.get_context("2d")? else {
        warn!("2d context unavailable; hair effect disabled");
        return Ok(());
    };
    let ctx: CanvasRenderingContext2d = ctx.dyn_into()?;

    let (w, h, dpr) = viewport(win);
    let mut view = HairView {
        canvas,
        ctx,
        field: ParticleField::new(cfg.clone(), w, h, dpr, random_seed()),
    };
    view.resize(w, h, dpr);
    HAIR.with(|cell| cell.replace(Some(view)));

    listen(win.as_ref(), "resize", true, |_: web_sys::Event| {
        let Some(win) = window() else { return };
        let (w, h, dpr) = viewport(&win);
        with_view(|v| v.resize(w, h, dpr));
    })?;
    listen(win.as_ref(), "mousemove", true, |evt: MouseEvent| {
        let (x, y) = (evt.client_x() as f64, evt.client_y() as f64);
        let now = performance_now();
        with_view(|v| {
            v.field.on_pointer_move(x, y, now);
        });
    })?;
    info!("hair canvas ready ({w}x{h} @ {dpr}x)");
    Ok(())
}

/// Spawn a burst at viewport position `(x, y)`; no-op before `init`.
pub(crate) fn spawn_burst(x: f64, y: f64, count: u32) {
    with_view(|v| v.field.spawn_burst(x, y, count));
}

/// Frame hook: clear, step and draw.
pub(crate) fn frame() {
    with_view(|v| v.render());
}

fn with_view(f: impl FnOnce(&mut HairView)) {
    HAIR.with(|cell| {
        // A burst can arrive while the frame loop holds the cell; drop it
        // rather than panic.
        let Ok(mut guard) = cell.try_borrow_mut() else { return };
        if let Some(view) = guard.as_mut() {
            f(view);
        }
    });
}

fn viewport(win: &Window) -> (f64, f64, f64) {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let dpr = win.device_pixel_ratio();
    (dim(win.inner_width()), dim(win.inner_height()), if dpr > 0.0 { dpr } else { 1.0 })
}

fn random_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            warn!("getrandom failed ({e}); seeding from clock");
            performance_now().to_bits()
        }
    }
}

impl HairView {
    fn resize(&mut self, w: f64, h: f64, dpr: f64) {
        self.field.resize(w, h, dpr);
        let (cw, ch) = self.field.canvas_size();
        self.canvas.set_width(cw as u32);
        self.canvas.set_height(ch as u32);
        let style = self.canvas.style();
        style.set_property("width", &format!("{w}px")).ok();
        style.set_property("height", &format!("{h}px")).ok();
    }

    fn render(&mut self) {
        let (cw, ch) = self.field.canvas_size();
        self.ctx.clear_rect(0.0, 0.0, cw, ch);
        self.field.step();
        let line_width = 1.4 * self.field.dpr();
        for p in self.field.particles() {
            draw_strand(&self.ctx, p, self.field.color(p), line_width);
        }
    }
}

fn draw_strand(ctx: &CanvasRenderingContext2d, p: &Particle, color: &str, line_width: f64) {
    ctx.save();
    if ctx.translate(p.x, p.y).is_ok() && ctx.rotate(p.rotation).is_ok() {
        ctx.set_stroke_style_str(color);
        ctx.set_line_width(line_width);
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        stroke_path(ctx, p.shape, p.size);
    }
    ctx.restore();
}

fn stroke_path(ctx: &CanvasRenderingContext2d, shape: HairShape, size: f64) {
    let points = shape.path(size);
    let Some(((x0, y0), rest)) = points.split_first() else { return };
    ctx.begin_path();
    ctx.move_to(*x0, *y0);
    for (x, y) in rest {
        ctx.line_to(*x, *y);
    }
    ctx.stroke();
}
