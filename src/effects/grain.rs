use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::effects::blend::{BlendLut, BlendMode, mix_u8, opacity_q8};
use crate::foundation::error::{FilmError, FilmResult};
use crate::foundation::math::{clamp_u8, hash_u32};

/// Edge length of the repeating grain tile.
pub const GRAIN_TILE: u32 = 128;

/// Global alpha the grain layer is composited at, before the stock opacity.
pub const GRAIN_GLOBAL_ALPHA: f32 = 0.6;

/// Film grain strength.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrainParams {
    /// Spread of the noise around mid-gray, `0..=1`.
    pub intensity: f32,
    /// Layer opacity, multiplied by [`GRAIN_GLOBAL_ALPHA`].
    pub opacity: f32,
}

/// Monochrome noise tile of `GRAIN_TILE`² gray values centred on 128.
///
/// Values are a pure function of `(seed, x, y)`.
pub fn grain_tile(seed: u64, intensity: f32) -> Vec<u8> {
    let spread = intensity.clamp(0.0, 1.0) * 127.0;
    let mut tile = Vec::with_capacity((GRAIN_TILE * GRAIN_TILE) as usize);
    for y in 0..GRAIN_TILE {
        for x in 0..GRAIN_TILE {
            let n = f64::from(hash_u32(seed, x, y)) / f64::from(u32::MAX);
            let v = 128.0 + (n as f32 * 2.0 - 1.0) * spread;
            tile.push(clamp_u8(v));
        }
    }
    tile
}

/// Tile the grain across an opaque RGBA8 buffer with an `overlay` blend.
#[tracing::instrument(level = "trace", skip(data))]
pub fn apply_grain(
    data: &mut [u8],
    width: u32,
    height: u32,
    params: &GrainParams,
    seed: u64,
) -> FilmResult<()> {
    let stride = width as usize * 4;
    if stride == 0 || data.len() != stride * height as usize {
        return Err(FilmError::processing(format!(
            "grain buffer length {} does not match {width}x{height}",
            data.len()
        )));
    }
    let alpha = opacity_q8(params.opacity * GRAIN_GLOBAL_ALPHA);
    if alpha == 0 {
        return Ok(());
    }
    let tile = grain_tile(seed, params.intensity);
    let lut = BlendLut::new(BlendMode::Overlay);
    let t = GRAIN_TILE as usize;
    data.par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let tile_row = &tile[(y % t) * t..(y % t + 1) * t];
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let s = tile_row[x % t];
                for c in 0..3 {
                    px[c] = mix_u8(px[c], lut.get(s, px[c]), alpha);
                }
            }
        });
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/grain.rs"]
mod tests;
