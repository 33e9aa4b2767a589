use image::imageops::FilterType;

use crate::effects::blend::{BlendMode, composite_in_place};
use crate::foundation::error::FilmResult;
use crate::raster::surface::Surface;

/// Downscale factor of the halation layer.
pub const GLOW_DOWNSCALE: u32 = 4;

/// Soft halation: a ×1/4 downscaled copy, upscaled back and screened over the surface.
pub fn apply_glow(surface: &mut Surface, alpha: f32) -> FilmResult<()> {
    if alpha <= 0.0 {
        return Ok(());
    }
    let (w, h) = surface.dimensions();
    let small = surface.resize(
        (w / GLOW_DOWNSCALE).max(1),
        (h / GLOW_DOWNSCALE).max(1),
        FilterType::Triangle,
    )?;
    let halo = small.resize(w, h, FilterType::Triangle)?;
    composite_in_place(surface.data_mut(), halo.data(), alpha, BlendMode::Screen)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/glow.rs"]
mod tests;
