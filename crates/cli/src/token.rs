//! Text form of cursor tokens: URL-safe base64 without padding.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

pub fn encode(cursor: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(cursor)
}

pub fn decode(token: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(token.trim())
}
