//! Inputs to the pipeline: encoded images, transport payloads and fonts.

/// Image decoding with size limits and an optional deadline.
pub mod decode;
/// Base64 and `data:` URL payloads.
pub mod payload;
/// Font loading, text measurement and glyph rasterization.
pub mod text;
