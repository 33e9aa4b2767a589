use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{FilmError, FilmResult};

/// Separable blend modes used by the film passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Plain source-over.
    #[default]
    Normal,
    /// `s * d`.
    Multiply,
    /// `s + d - s * d`; only ever brightens.
    Screen,
    /// Multiply in shadows, screen in highlights (keyed on the destination).
    Overlay,
    /// Gentler overlay (W3C compositing formula).
    SoftLight,
}

impl BlendMode {
    /// Blend one normalized channel pair.
    pub fn apply(self, s: f32, d: f32) -> f32 {
        match self {
            Self::Normal => s,
            Self::Multiply => s * d,
            Self::Screen => s + d - s * d,
            Self::Overlay => {
                if d <= 0.5 {
                    2.0 * s * d
                } else {
                    1.0 - 2.0 * (1.0 - s) * (1.0 - d)
                }
            }
            Self::SoftLight => {
                if s <= 0.5 {
                    d - (1.0 - 2.0 * s) * d * (1.0 - d)
                } else {
                    let g = if d <= 0.25 {
                        ((16.0 * d - 12.0) * d + 4.0) * d
                    } else {
                        d.sqrt()
                    };
                    d + (2.0 * s - 1.0) * (g - d)
                }
            }
        }
    }
}

/// 256×256 lookup table of `B(s, d)` in 8-bit space, indexed `[s * 256 + d]`.
///
/// Built once per pass so the per-pixel loop is branch-free and exactly reproducible.
pub(crate) struct BlendLut {
    table: Vec<u8>,
}

impl BlendLut {
    pub(crate) fn new(mode: BlendMode) -> Self {
        let mut table = vec![0u8; 256 * 256];
        for s in 0..256usize {
            for d in 0..256usize {
                let v = mode.apply(s as f32 / 255.0, d as f32 / 255.0);
                table[s * 256 + d] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
        Self { table }
    }

    #[inline(always)]
    pub(crate) fn get(&self, s: u8, d: u8) -> u8 {
        self.table[(s as usize) * 256 + d as usize]
    }
}

#[inline(always)]
pub(crate) fn mix_u8(d: u8, b: u8, a: u16) -> u8 {
    let inv = 255 - a;
    (((u32::from(d) * u32::from(inv)) + (u32::from(b) * u32::from(a)) + 127) / 255) as u8
}

pub(crate) fn opacity_q8(opacity: f32) -> u16 {
    ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

/// Blend a straight-alpha RGBA8 `src` onto opaque `dst` with `mode` at `opacity`.
///
/// The destination stays opaque: `out = d + (B(s, d) - d) * sa * opacity`.
pub fn composite_in_place(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
    mode: BlendMode,
) -> FilmResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FilmError::processing(
            "composite_in_place expects equal-length rgba8 buffers",
        ));
    }
    let op = opacity_q8(opacity);
    if op == 0 {
        return Ok(());
    }
    let lut = BlendLut::new(mode);
    dst.par_chunks_exact_mut(4)
        .zip(src.par_chunks_exact(4))
        .for_each(|(d, s)| {
            let a = (u32::from(s[3]) * u32::from(op) + 127) / 255;
            if a == 0 {
                return;
            }
            let a = a as u16;
            for c in 0..3 {
                d[c] = mix_u8(d[c], lut.get(s[c], d[c]), a);
            }
        });
    Ok(())
}

/// Blend a solid color onto opaque `dst` with `mode` at `opacity` (times the color's alpha).
pub fn composite_color_in_place(dst: &mut [u8], color: Rgba8, opacity: f32, mode: BlendMode) {
    let op = opacity_q8(opacity);
    let a = ((u32::from(color.a) * u32::from(op) + 127) / 255) as u16;
    if a == 0 {
        return;
    }
    let lut = BlendLut::new(mode);
    let src = [color.r, color.g, color.b];
    dst.par_chunks_exact_mut(4).for_each(|d| {
        for c in 0..3 {
            d[c] = mix_u8(d[c], lut.get(src[c], d[c]), a);
        }
    });
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blend.rs"]
mod tests;
