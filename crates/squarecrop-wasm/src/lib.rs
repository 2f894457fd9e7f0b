//! Squarecrop WASM - WebAssembly bindings for the square crop editor
//!
//! This crate exposes squarecrop-core to JavaScript/TypeScript hosts.
//!
//! # Module Structure
//!
//! - `editor` - the `CropEditor` class wrapping one crop session
//! - `types` - WASM-compatible wrapper types for commit output
//!
//! # Usage
//!
//! ```typescript
//! import init, { CropEditor } from '@squarecrop/wasm';
//!
//! await init();
//!
//! const editor = new CropEditor({ stageSize: 360, outputSize: 512, outputFormat: 'jpeg' });
//! editor.fit_stage(container.clientWidth);
//! editor.load_source(new Uint8Array(await file.arrayBuffer()));
//!
//! stage.addEventListener('pointermove', (e) => {
//!   if (editor.pointer_move(e.pointerId, e.offsetX, e.offsetY)) {
//!     img.style.transform = editor.css_transform() ?? '';
//!   }
//! });
//!
//! const output = editor.commit();
//! if (output) {
//!   upload(new File([output.bytes()], output.file_name, { type: output.mime_type }));
//!   avatar.src = output.data_url;
//! }
//! editor.close();
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod types;

pub use editor::CropEditor;
pub use types::JsCropOutput;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
