/// Core value types (colors, pixel rectangles).
pub mod core;
/// Error taxonomy.
pub mod error;
/// Fixed-point pixel math and hashing helpers.
pub mod math;
