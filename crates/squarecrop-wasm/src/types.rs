//! WASM-compatible wrapper types for commit output.

use squarecrop_core::CropOutput;
use wasm_bindgen::prelude::*;

/// The encoded result of a commit.
///
/// # Memory Management
///
/// The encoded bytes live in WASM memory. `bytes()` copies them into a
/// `Uint8Array`; call it once and keep the result.
#[wasm_bindgen]
pub struct JsCropOutput {
    inner: CropOutput,
}

#[wasm_bindgen]
impl JsCropOutput {
    /// File name to give the produced file
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.inner.file_name.clone()
    }

    /// MIME type matching the encoded bytes (`image/jpeg` or `image/png`)
    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type.clone()
    }

    /// Side length of the square output in pixels
    #[wasm_bindgen(getter)]
    pub fn size(&self) -> u32 {
        self.inner.size
    }

    /// Number of encoded bytes
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.bytes.len()
    }

    /// Inline preview as a `data:` URL, suitable for an `<img src>`
    #[wasm_bindgen(getter)]
    pub fn data_url(&self) -> String {
        self.inner.data_url.clone()
    }

    /// Encoded file contents as `Uint8Array` (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }
}

impl From<CropOutput> for JsCropOutput {
    fn from(inner: CropOutput) -> Self {
        Self { inner }
    }
}
