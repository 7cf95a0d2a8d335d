//! Shareable editor URLs for generated circuit code.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

const EDITOR_BASE: &str = "https://tscircuit.com/editor";

/// Encode circuit source into an editor link for eval report columns.
pub fn create_snippet_url(code: &str) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(code.as_bytes());
    format!("{EDITOR_BASE}?snippet_code={encoded}")
}
