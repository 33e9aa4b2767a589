use rayon::prelude::*;

use crate::foundation::math::{clamp_u8, luma601};

/// Collapse every pixel to its Rec. 601 luma. Idempotent; gray pixels are unchanged.
pub fn enforce_grayscale(data: &mut [u8]) {
    data.par_chunks_exact_mut(4).for_each(|px| {
        let v = luma601(px[0], px[1], px[2]);
        px[0] = v;
        px[1] = v;
        px[2] = v;
    });
}

/// Stretch channel values around mid-gray: `(v - 128) * k + 128`, clamped.
pub fn contrast_stretch(data: &mut [u8], k: f32) {
    let lut: [u8; 256] = std::array::from_fn(|v| clamp_u8((v as f32 - 128.0) * k + 128.0));
    data.par_chunks_exact_mut(4).for_each(|px| {
        px[0] = lut[px[0] as usize];
        px[1] = lut[px[1] as usize];
        px[2] = lut[px[2] as usize];
    });
}

/// Luma collapse followed by the contrast stretch, as monochrome stocks require.
pub fn grayscale_with_contrast(data: &mut [u8], k: f32) {
    enforce_grayscale(data);
    contrast_stretch(data, k);
}

/// True when every pixel has `R == G == B`.
pub fn is_grayscale(data: &[u8]) -> bool {
    data.par_chunks_exact(4)
        .all(|px| px[0] == px[1] && px[1] == px[2])
}

#[cfg(test)]
#[path = "../../tests/unit/effects/mono.rs"]
mod tests;
