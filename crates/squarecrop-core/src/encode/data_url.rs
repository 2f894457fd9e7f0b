//! Inline `data:` URLs for encoded output.

use base64::Engine;

/// Build a `data:<mime>;base64,<payload>` URL.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime_type};base64,{payload}")
}
