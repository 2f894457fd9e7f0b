//! Crop editor WASM bindings.
//!
//! `CropEditor` wraps one `CropSession`. The host forwards DOM pointer and
//! wheel events, reads back the preview transform after each change, and
//! calls `commit` when the user confirms.
//!
//! Pointer coordinates are in stage pixels (e.g. `offsetX`/`offsetY` of the
//! stage element). Every event method returns whether the preview changed so
//! the host can skip redundant style updates.

use crate::types::JsCropOutput;
use squarecrop_core::{CropConfig, CropError, CropSession, GestureState};
use wasm_bindgen::prelude::*;

/// One interactive square crop.
#[wasm_bindgen]
pub struct CropEditor {
    session: CropSession,
}

#[wasm_bindgen]
impl CropEditor {
    /// Open an editor.
    ///
    /// # Arguments
    /// * `config` - Object with optional `stageSize`, `outputSize`,
    ///   `outputFormat` (`"jpeg"` or `"png"`), `quality` (1-100), `fileName`
    ///   and `wheelSensitivity`. `undefined` uses all defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CropEditor, JsValue> {
        let config: CropConfig = if config.is_undefined() || config.is_null() {
            CropConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid crop config: {}", e)))?
        };
        Self::from_config(config).map_err(to_js_error)
    }

    /// Decode the selected file and show it in the stage.
    ///
    /// On error the stage is hidden and commit is disabled until another file
    /// loads successfully.
    pub fn load_source(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.session.load_source(bytes).map(|_| ()).map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn has_source(&self) -> bool {
        self.session.has_source()
    }

    #[wasm_bindgen(getter)]
    pub fn natural_width(&self) -> u32 {
        self.session.viewport().natural().width
    }

    #[wasm_bindgen(getter)]
    pub fn natural_height(&self) -> u32 {
        self.session.viewport().natural().height
    }

    /// Fit the configured stage size into the available space.
    ///
    /// Returns the stage side length now in use.
    pub fn fit_stage(&mut self, available: f64) -> f64 {
        self.session.fit_stage(available)
    }

    pub fn set_stage_size(&mut self, size: f64) {
        self.session.set_stage_size(size);
    }

    #[wasm_bindgen(getter)]
    pub fn stage_size(&self) -> f64 {
        self.session.viewport().stage_size()
    }

    pub fn pointer_down(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.session.pointer_down(pointer_id, x, y)
    }

    pub fn pointer_move(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.session.pointer_move(pointer_id, x, y)
    }

    pub fn pointer_up(&mut self, pointer_id: i32) {
        self.session.pointer_up(pointer_id);
    }

    /// Same as `pointer_up`; wire `pointercancel` and `pointerleave` here.
    pub fn pointer_cancel(&mut self, pointer_id: i32) {
        self.session.pointer_up(pointer_id);
    }

    /// Wheel zoom. Pass `WheelEvent.deltaY`.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        self.session.wheel(delta_y)
    }

    /// Set the zoom multiplier (1-8) directly, e.g. from a slider.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        self.session.set_zoom(zoom)
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.session.viewport().zoom()
    }

    /// Cover scale: stage pixels per source pixel at zoom 1.
    #[wasm_bindgen(getter)]
    pub fn min_zoom(&self) -> f64 {
        self.session.viewport().min_zoom()
    }

    /// `"idle"`, `"dragging"` or `"pinching"`.
    #[wasm_bindgen(getter)]
    pub fn gesture_state(&self) -> String {
        gesture_name(self.session.gesture_state()).to_string()
    }

    /// Current preview transform.
    ///
    /// Returns `{ translateX, translateY, scale, left, top, scaledWidth,
    /// scaledHeight }`, or `undefined` while the image should be hidden.
    pub fn update(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.session.update())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// CSS `transform` for the preview image, or `undefined` while hidden.
    pub fn css_transform(&self) -> Option<String> {
        self.session.update().map(|t| t.to_css())
    }

    #[wasm_bindgen(getter)]
    pub fn can_commit(&self) -> bool {
        self.session.can_commit()
    }

    /// Produce the cropped file.
    ///
    /// Returns `undefined` when there is nothing to commit yet. An encoding
    /// failure is thrown as an error; the editor stays usable for a retry.
    pub fn commit(&self) -> Result<Option<JsCropOutput>, JsValue> {
        match self.session.commit() {
            Ok(output) => Ok(output.map(JsCropOutput::from)),
            Err(e) => {
                report_warning(&e);
                Err(to_js_error(e))
            }
        }
    }

    /// Drop the loaded image and interaction state without producing output.
    pub fn cancel(&mut self) {
        self.session.cancel();
    }

    /// Release the editor and everything it holds.
    pub fn close(self) {
        self.session.close();
    }
}

impl CropEditor {
    pub(crate) fn from_config(config: CropConfig) -> Result<Self, CropError> {
        Ok(Self {
            session: CropSession::new(config)?,
        })
    }
}

fn gesture_name(state: GestureState) -> &'static str {
    match state {
        GestureState::Idle => "idle",
        GestureState::Dragging => "dragging",
        GestureState::Pinching => "pinching",
    }
}

fn to_js_error(err: CropError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn report_warning(err: &CropError) {
    web_sys::console::warn_1(&JsValue::from_str(&format!("squarecrop: {}", err)));
}
