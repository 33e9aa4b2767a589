use std::borrow::Cow;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

use crate::foundation::error::{FilmError, FilmResult};

/// An encoded image as handed over by a caller: raw bytes or a base64 / `data:` URL string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FramePayload {
    /// Base64 text, optionally wrapped in a `data:<mime>;base64,` URL.
    Encoded(String),
    /// Raw encoded bytes.
    Bytes(Vec<u8>),
}

impl FramePayload {
    /// The encoded image bytes, decoding base64 when needed.
    pub fn bytes(&self) -> FilmResult<Cow<'_, [u8]>> {
        match self {
            Self::Bytes(b) => Ok(Cow::Borrowed(b.as_slice())),
            Self::Encoded(s) => decode_payload(s).map(Cow::Owned),
        }
    }
}

impl From<Vec<u8>> for FramePayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<String> for FramePayload {
    fn from(s: String) -> Self {
        Self::Encoded(s)
    }
}

/// A parsed `data:` URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUrl {
    /// Declared media type, if any.
    pub mime: Option<String>,
    /// Decoded body.
    pub bytes: Vec<u8>,
}

/// Parse `data:[<mime>][;base64],<body>`. Only base64 bodies are accepted.
pub fn parse_data_url(s: &str) -> FilmResult<DataUrl> {
    let rest = s
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| FilmError::decode("payload is not a data: url"))?;
    let (header, body) = rest
        .split_once(',')
        .ok_or_else(|| FilmError::decode("data: url has no ',' separator"))?;
    let mut parts = header.split(';');
    let mime = parts
        .next()
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(FilmError::decode("data: url body is not base64"));
    }
    Ok(DataUrl {
        mime,
        bytes: decode_base64(body)?,
    })
}

/// Decode either a `data:` URL or bare base64 text.
pub fn decode_payload(s: &str) -> FilmResult<Vec<u8>> {
    if s.trim_start().starts_with("data:") {
        Ok(parse_data_url(s)?.bytes)
    } else {
        decode_base64(s)
    }
}

/// Render bytes as a `data:<mime>;base64,` URL.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

fn decode_base64(body: &str) -> FilmResult<Vec<u8>> {
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(FilmError::decode("empty base64 payload"));
    }
    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| FilmError::decode(format!("invalid base64 payload: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/payload.rs"]
mod tests;
