//! Output encoders: still images and the motion frame sink contract.

/// `ffmpeg`-backed video sink.
pub mod ffmpeg;
/// Still-image encoding.
pub mod image;
/// Frame sink contract and the in-memory sink.
pub mod sink;
