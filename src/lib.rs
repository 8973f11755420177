//! Particle network background
//!
//! Renders a field of drifting particles joined by distance-faded links, with
//! a one-time boot animation that converges from the viewport centre:
//! - `core`: platform-agnostic simulation, spatial-hash linking, frame pacing
//!   and the project gallery pipeline
//! - browser host (wasm32): Canvas 2D surface driven by requestAnimationFrame
//!
//! The native CLI (`field-cli`) drives the same core headlessly.

pub mod core;
pub mod theme;
pub mod time;

#[cfg(target_arch = "wasm32")]
mod canvas_wasm;
#[cfg(target_arch = "wasm32")]
mod host_wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm_entry::*;

#[cfg(target_arch = "wasm32")]
mod wasm_entry {
    use std::cell::RefCell;

    use tracing::error;
    use wasm_bindgen::prelude::*;

    use crate::host_wasm::{config_from_window, FieldHost};

    /// Canvas element id the background mounts onto
    const DEFAULT_CANVAS_ID: &str = "particle-field";

    thread_local! {
        static HOST: RefCell<Option<FieldHost>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();

        // Initialize tracing for browser console
        tracing_wasm::set_as_global_default();

        if let Err(e) = mount(DEFAULT_CANVAS_ID) {
            error!(?e, "Failed to mount particle field");
        }
    }

    /// Mount the background onto `canvas_id`, replacing any mounted instance.
    #[wasm_bindgen]
    pub fn mount(canvas_id: &str) -> Result<(), JsValue> {
        unmount();
        let window = web_sys::window().ok_or("no window")?;
        let host = FieldHost::start(canvas_id, config_from_window(&window))?;
        HOST.with(|h| *h.borrow_mut() = Some(host));
        Ok(())
    }

    /// Tear down the mounted background: cancels the pending frame and
    /// removes every listener.
    #[wasm_bindgen]
    pub fn unmount() {
        let host = HOST.with(|h| h.borrow_mut().take());
        drop(host);
    }

    /// Whether the mounted background is running its animation loop
    #[wasm_bindgen(js_name = isAnimating)]
    pub fn is_animating() -> bool {
        HOST.with(|h| h.borrow().as_ref().is_some_and(|host| host.is_animating()))
    }
}
