//! The burst stages: stitch, develop, poster, motion, and the job runner that chains them.

/// Cooperative cancellation.
pub mod cancel;
/// Film-stock development of a proof sheet.
pub mod develop;
/// Burst records and the stage runner.
pub mod job;
/// Animated replay of the developed frames over the poster.
pub mod motion;
/// Typographic poster.
pub mod poster;
/// 2×2 proof sheet stitching.
pub mod stitch;
