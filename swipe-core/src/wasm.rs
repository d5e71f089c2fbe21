//! WebAssembly bindings for swipe-core.
//!
//! The PWA mounts one [`WasmSwipeList`] per rendered list (a day of tasks,
//! the wishlist) and forwards DOM touch events to it. Signals accumulate in
//! an outbox that the page drains after each event.
//!
//! Register the `touchmove` listener with `{ passive: false }`:
//! `touchMove` returns `true` when the page must call `preventDefault()`.

use wasm_bindgen::prelude::*;

use crate::{
    FrameToken, ItemId, ItemKind, ItemSignal, SwipeConfig, SwipeList, SwipeSignal, TapTarget,
    TouchEvent,
};

/// Initialize the swipe WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

/// Swipeable list instance for WASM.
#[wasm_bindgen]
pub struct WasmSwipeList {
    list: SwipeList,
    outbox: Vec<ItemSignal>,
}

#[wasm_bindgen]
impl WasmSwipeList {
    /// Create a list, optionally from a JSON swipe configuration.
    ///
    /// # Errors
    ///
    /// Returns an error string if the configuration is malformed or invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmSwipeList, String> {
        let config = match config_json {
            Some(json) => SwipeConfig::from_json(&json).map_err(|e| e.to_string())?,
            None => SwipeConfig::default(),
        };
        let list = SwipeList::new(config).map_err(|e| e.to_string())?;
        Ok(Self {
            list,
            outbox: Vec::new(),
        })
    }

    /// Mount an item of kind `"task"` or `"wish"`.
    ///
    /// # Errors
    ///
    /// Returns an error string for a malformed ID, unknown kind, or duplicate.
    pub fn mount(&mut self, id: &str, kind: &str) -> Result<(), String> {
        let id = parse_id(id)?;
        let kind: ItemKind = kind.parse()?;
        self.list.mount(id, kind).map_err(|e| e.to_string())
    }

    /// Unmount an item without deleting it.
    ///
    /// # Errors
    ///
    /// Returns an error string for a malformed or unknown ID.
    pub fn unmount(&mut self, id: &str) -> Result<(), String> {
        let id = parse_id(id)?;
        self.list.unmount(id).map_err(|e| e.to_string())
    }

    /// Toggle the static presentation view.
    #[wasm_bindgen(js_name = setPresentationMode)]
    pub fn set_presentation_mode(&mut self, enabled: bool) {
        let signals = self.list.set_presentation_mode(enabled);
        self.outbox.extend(signals);
    }

    /// Finger down on item `id`.
    ///
    /// # Errors
    ///
    /// Returns an error string for a malformed ID.
    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&mut self, id: &str, x: f32, y: f32, now: f64) -> Result<(), String> {
        let id = parse_id(id)?;
        self.push_touch(id, &TouchEvent::start(x, y, millis(now)));
        Ok(())
    }

    /// Finger moved on item `id`. Returns whether to `preventDefault()`.
    ///
    /// # Errors
    ///
    /// Returns an error string for a malformed ID.
    #[wasm_bindgen(js_name = touchMove)]
    pub fn touch_move(&mut self, id: &str, x: f32, y: f32, now: f64) -> Result<bool, String> {
        let id = parse_id(id)?;
        Ok(self.push_touch(id, &TouchEvent::moved(x, y, millis(now))))
    }

    /// Finger lifted from item `id`.
    ///
    /// # Errors
    ///
    /// Returns an error string for a malformed ID.
    #[wasm_bindgen(js_name = touchEnd)]
    pub fn touch_end(&mut self, id: &str, now: f64) -> Result<(), String> {
        let id = parse_id(id)?;
        self.push_touch(id, &TouchEvent::end(millis(now)));
        Ok(())
    }

    /// Forward a DOM `TouchEvent` for item `id`, calling `preventDefault()`
    /// on it when the swipe owns the gesture.
    ///
    /// # Errors
    ///
    /// Returns an error string for a malformed ID.
    #[wasm_bindgen(js_name = handleTouchEvent)]
    #[allow(clippy::cast_precision_loss)]
    pub fn handle_touch_event(&mut self, id: &str, event: &web_sys::TouchEvent) -> Result<(), String> {
        let id = parse_id(id)?;
        let now = millis(js_sys::Date::now());
        let point = event
            .touches()
            .get(0)
            .map(|touch| (touch.client_x() as f32, touch.client_y() as f32));
        let touch = match (event.type_().as_str(), point) {
            ("touchstart", Some((x, y))) => TouchEvent::start(x, y, now),
            ("touchmove", Some((x, y))) => TouchEvent::moved(x, y, now),
            ("touchend", _) => TouchEvent::end(now),
            ("touchcancel", _) => TouchEvent::cancel(now),
            _ => return Ok(()),
        };
        if self.push_touch(id, &touch) {
            event.prevent_default();
        }
        Ok(())
    }

    /// Tap on the card (`"card"`) or the revealed delete button
    /// (`"delete_button"`).
    ///
    /// # Errors
    ///
    /// Returns an error string for a malformed ID or unknown target.
    pub fn tap(&mut self, id: &str, target: &str, now: f64) -> Result<(), String> {
        let id = parse_id(id)?;
        let target = match target {
            "card" => TapTarget::Card,
            "delete_button" => TapTarget::DeleteButton,
            other => return Err(format!("unknown tap target: {other}")),
        };
        let signals = self.list.tap(id, target, millis(now));
        self.outbox.extend(signals);
        Ok(())
    }

    /// Advance timers; call from the page's timer or frame loop.
    pub fn tick(&mut self, now: f64) {
        let signals = self.list.tick(millis(now));
        self.outbox.extend(signals);
    }

    /// Deliver a requested animation frame. Returns whether to redraw.
    ///
    /// # Errors
    ///
    /// Returns an error string for a malformed ID.
    #[wasm_bindgen(js_name = animationFrame)]
    pub fn animation_frame(&mut self, id: &str, token: u32) -> Result<bool, String> {
        let id = parse_id(id)?;
        Ok(self
            .list
            .animation_frame(id, FrameToken::from_raw(u64::from(token))))
    }

    /// Render state of item `id` as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string for a malformed or unknown ID.
    #[wasm_bindgen(js_name = renderState)]
    pub fn render_state(&self, id: &str) -> Result<String, String> {
        let id = parse_id(id)?;
        let state = self
            .list
            .render_state(id)
            .ok_or_else(|| format!("Item not found: {id}"))?;
        serde_json::to_string(&state).map_err(|e| e.to_string())
    }

    /// Take all signals emitted since the last call, as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails; the signals stay
    /// queued for the next call.
    #[wasm_bindgen(js_name = drainSignals)]
    pub fn drain_signals(&mut self) -> Result<String, String> {
        let json = serde_json::to_string(&self.outbox).map_err(|e| e.to_string())?;
        self.outbox.clear();
        Ok(json)
    }

    /// Take finished dismissals as a JSON array of `{item, kind}`.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails; the deletions stay
    /// queued for the next call.
    #[wasm_bindgen(js_name = takeDeletions)]
    pub fn take_deletions(&mut self) -> Result<String, String> {
        let deletions = self.list.take_deletions();
        match serde_json::to_string(&deletions) {
            Ok(json) => Ok(json),
            Err(e) => {
                self.list.requeue_deletions(deletions);
                Err(e.to_string())
            }
        }
    }

    /// Number of rendered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the list is empty.
    #[wasm_bindgen(js_name = isEmpty)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl WasmSwipeList {
    fn push_touch(&mut self, id: ItemId, event: &TouchEvent) -> bool {
        let signals = self.list.handle_touch(id, event);
        let prevent = signals
            .iter()
            .any(|s| s.signal == SwipeSignal::PreventDefault);
        self.outbox.extend(signals);
        prevent
    }
}

fn parse_id(id: &str) -> Result<ItemId, String> {
    id.parse().map_err(|e: uuid::Error| e.to_string())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn millis(now: f64) -> u64 {
    now.max(0.0) as u64
}
