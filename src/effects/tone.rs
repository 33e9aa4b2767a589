use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::effects::blend::{BlendMode, composite_color_in_place};
use crate::foundation::core::Rgba8;
use crate::foundation::math::clamp_u8;

/// Global tone adjustment, applied as contrast, then saturation, then brightness.
///
/// Factors follow the usual CSS filter conventions: `1.0` is identity for all three.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToneParams {
    /// Contrast around mid-gray.
    pub contrast: f32,
    /// Saturation; `0.0` collapses to luma.
    pub saturation: f32,
    /// Linear brightness multiplier.
    pub brightness: f32,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            saturation: 1.0,
            brightness: 1.0,
        }
    }
}

/// Translucent color wash composited over the whole frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorOverlay {
    /// Wash color.
    pub color: Rgba8,
    /// Blend mode used for the wash.
    pub blend: BlendMode,
    /// Opacity of the wash.
    pub opacity: f32,
}

/// Apply `tone` to every pixel of an opaque RGBA8 buffer.
pub fn apply_tone(data: &mut [u8], tone: &ToneParams) {
    let ToneParams {
        contrast,
        saturation,
        brightness,
    } = *tone;
    data.par_chunks_exact_mut(4).for_each(|px| {
        let mut c = [
            f32::from(px[0]) / 255.0,
            f32::from(px[1]) / 255.0,
            f32::from(px[2]) / 255.0,
        ];
        for v in &mut c {
            *v = ((*v - 0.5) * contrast + 0.5).clamp(0.0, 1.0);
        }
        let gray = 0.299 * c[0] + 0.587 * c[1] + 0.114 * c[2];
        for v in &mut c {
            *v = (gray + (*v - gray) * saturation).clamp(0.0, 1.0);
        }
        for (i, v) in c.iter().enumerate() {
            px[i] = clamp_u8(*v * brightness * 255.0);
        }
    });
}

/// Composite a color wash over an opaque RGBA8 buffer.
pub fn apply_overlay(data: &mut [u8], overlay: &ColorOverlay) {
    composite_color_in_place(data, overlay.color, overlay.opacity, overlay.blend);
}

#[cfg(test)]
#[path = "../../tests/unit/effects/tone.rs"]
mod tests;
