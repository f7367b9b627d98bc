//! Base64 helpers for OSC 52 clipboard plumbing.
//!
//! The wire format carries base64 on both directions; hosts bridging to a
//! platform pasteboard use these to cross between text and payload. The
//! worker also validates paste payloads here before forwarding them to the
//! child.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Encode clipboard text into an OSC 52 payload.
#[must_use]
pub fn encode(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode an OSC 52 payload. Returns `None` for invalid base64 or payloads
/// that are not UTF-8 text.
#[must_use]
pub fn decode(payload: &str) -> Option<String> {
    let bytes = STANDARD.decode(payload).ok()?;
    String::from_utf8(bytes).ok()
}
