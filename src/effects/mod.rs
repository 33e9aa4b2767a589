//! Pixel kernels shared by the developer, stitcher and poster passes.
//!
//! Every kernel works on opaque, straight-alpha RGBA8 buffers in place.

/// Separable blend modes and buffer compositing.
pub mod blend;
/// Region blur (gaussian or resample).
pub mod blur;
/// Halation glow.
pub mod glow;
/// Seeded film grain.
pub mod grain;
/// Luma collapse and contrast stretch.
pub mod mono;
/// Contrast, saturation, brightness and color wash.
pub mod tone;
