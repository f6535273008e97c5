//! Base64 codec for the wire representation of binary entry fields.
//!
//! Standard alphabet (`A–Z a–z 0–9 + /`) with padding, via the `base64`
//! crate's `STANDARD` engine. Decoding malformed input is a hard error
//! (`io/corrupt`), never a silent best-effort parse.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// Encodes `data` as standard padded base64.
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes standard padded base64, failing with `io/corrupt` on malformed
/// input.
pub fn decode(s: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(s)
        .map_err(|e| Error::Corrupt(format!("invalid base64: {e}")))
}
