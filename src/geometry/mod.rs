/// 2×2 grid geometry (stitcher, developer, playback).
pub mod grid;
/// Poster layout (poster renderer, motion exporter).
pub mod poster;
