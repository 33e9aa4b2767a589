use image::imageops::FilterType;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::foundation::core::RectPx;
use crate::foundation::error::{FilmError, FilmResult};
use crate::raster::surface::Surface;

/// How a quadrant is softened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurMethod {
    /// Separable fixed-point gaussian, clamped to the region edges.
    #[default]
    Gaussian,
    /// Downscale then upscale inside the region (center-aligned resampling).
    Resample,
}

/// Region blur strength relative to the tile edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionBlur {
    /// Blur method.
    pub method: BlurMethod,
    /// Gaussian sigma as a fraction of the region's shorter edge.
    pub sigma_ratio: f32,
}

impl Default for RegionBlur {
    fn default() -> Self {
        Self {
            method: BlurMethod::Gaussian,
            sigma_ratio: 0.006,
        }
    }
}

impl RegionBlur {
    /// Gaussian `(radius, sigma)` for a region whose shorter edge is `edge` pixels.
    pub fn kernel_for(&self, edge: u32) -> (u32, f32) {
        let sigma = (edge as f32 * self.sigma_ratio).max(1.0);
        let radius = (sigma * 3.0).ceil() as u32;
        (radius, sigma)
    }
}

/// Blur only the pixels inside `rect`, in place.
///
/// Samples never leave the rectangle (edges clamp inward), so neighbouring regions and the matte
/// around them are untouched and the blurred content does not shift.
pub fn blur_region_in_place(surface: &mut Surface, rect: RectPx, blur: &RegionBlur) -> FilmResult<()> {
    let region = surface.crop(rect)?;
    let (w, h) = region.dimensions();
    let (radius, sigma) = blur.kernel_for(w.min(h));
    let blurred = match blur.method {
        BlurMethod::Gaussian => {
            let data = blur_rgba8(region.data(), w, h, radius, sigma)?;
            Surface::from_raw(w, h, data)?
        }
        BlurMethod::Resample => {
            // Roughly matches the gaussian's footprint: one output sample per ~2 sigma.
            let factor = ((sigma * 2.0).round() as u32).max(2);
            let sw = (w / factor).max(1);
            let sh = (h / factor).max(1);
            region
                .resize(sw, sh, FilterType::Triangle)?
                .resize(w, h, FilterType::Triangle)?
        }
    };
    surface.blit(&blurred, rect.x, rect.y)
}

/// Separable gaussian blur of an RGBA8 buffer.
pub fn blur_rgba8(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> FilmResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FilmError::processing("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(FilmError::processing(
            "blur_rgba8 expects src matching width*height*4",
        ));
    }
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> FilmResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FilmError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(FilmError::processing("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Put the rounding residue on the center tap so the kernel sums to exactly 1.0.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

// Each pass fans out over output rows.
fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, k: &[u32]) {
    let stride = width as usize * 4;
    let radius = k.len() / 2;
    let last = width as usize - 1;
    dst.par_chunks_exact_mut(stride)
        .zip(src.par_chunks_exact(stride))
        .for_each(|(out_row, in_row)| {
            for (x, out) in out_row.chunks_exact_mut(4).enumerate() {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = (x + ki).saturating_sub(radius).min(last);
                    accumulate(&mut acc, kw, &in_row[sx * 4..sx * 4 + 4]);
                }
                store(out, &acc);
            }
        });
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let stride = width as usize * 4;
    let radius = k.len() / 2;
    let last = height as usize - 1;
    dst.par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(y, out_row)| {
            for (x, out) in out_row.chunks_exact_mut(4).enumerate() {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sy = (y + ki).saturating_sub(radius).min(last);
                    let idx = sy * stride + x * 4;
                    accumulate(&mut acc, kw, &src[idx..idx + 4]);
                }
                store(out, &acc);
            }
        });
}

fn accumulate(acc: &mut [u64; 4], weight: u32, px: &[u8]) {
    for (a, &v) in acc.iter_mut().zip(px) {
        *a += u64::from(weight) * u64::from(v);
    }
}

fn store(out: &mut [u8], acc: &[u64; 4]) {
    for (o, &a) in out.iter_mut().zip(acc) {
        *o = q16_to_u8(a);
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
