//! Browser host for the particle field
//!
//! Wires window/document signals into a shared `ParticleField` and drives it
//! from `requestAnimationFrame`. Everything registered here is undone when the
//! host is dropped: listeners are removed and the pending frame is cancelled,
//! so nothing draws on a detached canvas.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, PointerEvent, VisibilityState,
    Window,
};

use crate::canvas_wasm::CanvasSurface;
use crate::core::{FieldConfig, ParticleField, Visibility};

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

type SharedField = Rc<RefCell<ParticleField<CanvasSurface>>>;

/// Event listener that detaches itself on drop
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Animation-frame callback plus the handle of the frame it is queued for
#[derive(Default)]
struct FrameLoop {
    callback: Option<Closure<dyn FnMut(f64)>>,
    handle: Option<i32>,
}

type SharedLoop = Rc<RefCell<FrameLoop>>;

/// Queue the next frame unless one is already pending
fn schedule(frame_loop: &SharedLoop) {
    let mut guard = frame_loop.borrow_mut();
    let fl = &mut *guard;
    if fl.handle.is_some() {
        return;
    }
    let (Some(window), Some(callback)) = (web_sys::window(), fl.callback.as_ref()) else {
        return;
    };
    match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        Ok(handle) => fl.handle = Some(handle),
        Err(e) => error!(?e, "requestAnimationFrame failed"),
    }
}

fn cancel(frame_loop: &SharedLoop) {
    let Some(handle) = frame_loop.borrow_mut().handle.take() else {
        return;
    };
    if let Some(window) = web_sys::window() {
        let _ = window.cancel_animation_frame(handle);
    }
}

/// Logical viewport size and raw device pixel ratio of `window`
fn window_metrics(window: &Window) -> (f64, f64, f64) {
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (width, height, window.device_pixel_ratio())
}

/// Read `window.__particle_field_config` (a JSON string), falling back to defaults
pub fn config_from_window(window: &Window) -> FieldConfig {
    let raw = js_sys::Reflect::get(window, &JsValue::from_str("__particle_field_config"))
        .ok()
        .and_then(|v| v.as_string());
    match raw {
        Some(json) => FieldConfig::from_json(&json).unwrap_or_else(|e| {
            warn!(error = %e, "Invalid particle field config, using defaults");
            FieldConfig::default()
        }),
        None => FieldConfig::default(),
    }
}

/// Mounted particle field with its listeners and frame loop
pub struct FieldHost {
    field: SharedField,
    frame_loop: SharedLoop,
    _listeners: Vec<Listener>,
}

impl FieldHost {
    /// Mount onto the canvas with id `canvas_id` and start animating
    /// (or draw the static frame if the user prefers reduced motion).
    pub fn start(canvas_id: &str, config: FieldConfig) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("no canvas element")?
            .dyn_into::<HtmlCanvasElement>()?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or("2D context unavailable")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let reduced_query = window.match_media(REDUCED_MOTION_QUERY)?;
        let reduced = reduced_query.as_ref().is_some_and(|q| q.matches());

        let mut field = ParticleField::new(config);
        field.set_reduced_motion(reduced);
        let (width, height, dpr) = window_metrics(&window);
        field.mount(CanvasSurface::new(canvas, ctx), width, height, dpr);
        info!(canvas_id, width, height, dpr, reduced, "Particle field mounted");

        let field: SharedField = Rc::new(RefCell::new(field));
        let frame_loop: SharedLoop = Rc::new(RefCell::new(FrameLoop::default()));

        // The callback only holds a weak handle to its own loop
        let weak_loop: Weak<RefCell<FrameLoop>> = Rc::downgrade(&frame_loop);
        let field_cb = field.clone();
        frame_loop.borrow_mut().callback = Some(Closure::wrap(Box::new(move |now: f64| {
            let Some(frame_loop) = weak_loop.upgrade() else {
                return;
            };
            frame_loop.borrow_mut().handle = None;
            let animating = {
                let mut field = field_cb.borrow_mut();
                field.tick(now);
                field.is_animating()
            };
            if animating {
                schedule(&frame_loop);
            }
        }) as Box<dyn FnMut(f64)>));

        let mut listeners = Vec::new();

        let (f, fl) = (field.clone(), frame_loop.clone());
        listeners.push(Listener::attach(&window, "resize", move |_| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height, dpr) = window_metrics(&window);
            debug!(width, height, dpr, "Window resized");
            let animating = {
                let mut field = f.borrow_mut();
                field.resize(width, height, dpr);
                field.is_animating()
            };
            if animating {
                schedule(&fl);
            }
        })?);

        let f = field.clone();
        listeners.push(Listener::attach(&window, "pointermove", move |e| {
            if let Some(e) = e.dyn_ref::<PointerEvent>() {
                f.borrow_mut().set_pointer(e.client_x() as f64, e.client_y() as f64);
            }
        })?);

        let f = field.clone();
        listeners.push(Listener::attach(&window, "pointerleave", move |_| {
            f.borrow_mut().clear_pointer();
        })?);

        let f = field.clone();
        listeners.push(Listener::attach(&document, "visibilitychange", move |_| {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let visibility = match document.visibility_state() {
                VisibilityState::Hidden => Visibility::Hidden,
                _ => Visibility::Visible,
            };
            debug!(?visibility, "Visibility changed");
            f.borrow_mut().set_visibility(visibility);
        })?);

        if let Some(query) = reduced_query {
            let (f, fl) = (field.clone(), frame_loop.clone());
            let q = query.clone();
            listeners.push(Listener::attach(&query, "change", move |_| {
                let reduced = q.matches();
                let animating = {
                    let mut field = f.borrow_mut();
                    field.set_reduced_motion(reduced);
                    field.is_animating()
                };
                if animating {
                    schedule(&fl);
                } else {
                    cancel(&fl);
                }
            })?);
        }

        if field.borrow().is_animating() {
            schedule(&frame_loop);
        }

        Ok(Self {
            field,
            frame_loop,
            _listeners: listeners,
        })
    }

    pub fn is_animating(&self) -> bool {
        self.field.borrow().is_animating()
    }
}

impl Drop for FieldHost {
    fn drop(&mut self) {
        cancel(&self.frame_loop);
        self.frame_loop.borrow_mut().callback = None;
        self.field.borrow_mut().unmount();
        info!("Particle field unmounted");
    }
}
