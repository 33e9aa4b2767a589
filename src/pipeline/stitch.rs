use std::time::Duration;

use image::imageops::FilterType;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assets::decode::{decode_image, decode_image_with_timeout};
use crate::assets::text::{TextAlign, TextStyle, Typesetter};
use crate::encode::image::{ColorMode, EncodeFormat, EncodedImage, encode_surface};
use crate::foundation::core::{RectPx, Rgba8};
use crate::foundation::error::{FilmError, FilmResult};
use crate::geometry::grid::{GridGeometry, GridVariant};
use crate::pipeline::poster::{PLACEHOLDER_COORDINATES, PLACEHOLDER_DATE, PLACEHOLDER_LOCATION};
use crate::raster::surface::Surface;

/// Frames per burst.
pub const BURST_LEN: usize = 4;
/// Smallest accepted `max_tile`.
pub const MIN_TILE: u32 = 64;
/// Largest accepted `max_tile`.
pub const MAX_TILE: u32 = 1600;

/// Stitcher settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchOptions {
    /// Grid variant; set from the shared configuration so stitch and develop agree.
    #[serde(skip)]
    pub variant: GridVariant,
    /// Upper bound for the tile edge.
    pub max_tile: u32,
    /// Background behind and between the frames.
    pub matte: Rgba8,
    /// Draw a 1px border around each frame.
    pub separators: bool,
    /// Border color.
    pub separator_color: Rgba8,
    /// Banner text color (bannered variant only).
    pub banner_ink: Rgba8,
    /// JPEG quality of the proof sheet.
    pub jpeg_quality: u8,
    /// Per-frame decode deadline.
    #[serde(skip)]
    pub decode_timeout: Option<Duration>,
}

impl Default for StitchOptions {
    fn default() -> Self {
        Self {
            variant: GridVariant::Simple,
            max_tile: 1080,
            matte: Rgba8::rgb(0x12, 0x12, 0x14),
            separators: false,
            separator_color: Rgba8::rgb(0x2a, 0x2a, 0x2e),
            banner_ink: Rgba8::rgb(0xe8, 0xe4, 0xda),
            jpeg_quality: 90,
            decode_timeout: None,
        }
    }
}

impl StitchOptions {
    /// Reject out-of-range settings.
    pub fn validate(&self) -> FilmResult<()> {
        if !(MIN_TILE..=MAX_TILE).contains(&self.max_tile) {
            return Err(FilmError::validation(format!(
                "stitch.max_tile {} is outside {MIN_TILE}..={MAX_TILE}",
                self.max_tile
            )));
        }
        if !(85..=100).contains(&self.jpeg_quality) {
            return Err(FilmError::validation(format!(
                "stitch.jpeg_quality {} is outside 85..=100",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// Header/footer text of a bannered sheet. Absent values print placeholders.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerText {
    /// Location name, top left.
    pub location: Option<String>,
    /// Coordinates, top right.
    pub coordinates: Option<String>,
    /// Capture date, footer.
    pub date: Option<String>,
}

/// A stitched, unfiltered 2×2 sheet.
#[derive(Clone, Debug)]
pub struct ProofSheet {
    /// Geometry the frames were placed with.
    pub geometry: GridGeometry,
    /// Encoded sheet.
    pub encoded: EncodedImage,
    /// Sheet pixels before encoding.
    pub surface: Surface,
}

/// Stitch four encoded frames into a proof sheet.
///
/// The frame count is checked before anything is decoded or allocated. Frames land in capture
/// order (TL, TR, BL, BR).
#[tracing::instrument(level = "debug", skip_all, fields(frames = frames.len()))]
pub fn stitch_burst<B: AsRef<[u8]> + Sync>(
    frames: &[B],
    opts: &StitchOptions,
    banner: Option<&BannerText>,
    typesetter: Option<&mut Typesetter>,
) -> FilmResult<ProofSheet> {
    if frames.len() != BURST_LEN {
        return Err(FilmError::invalid_input(format!(
            "a burst needs exactly {BURST_LEN} frames, got {}",
            frames.len()
        )));
    }
    opts.validate()?;

    let decoded = frames
        .par_iter()
        .enumerate()
        .map(|(i, bytes)| {
            let res = match opts.decode_timeout {
                Some(t) => decode_image_with_timeout(bytes.as_ref(), t),
                None => decode_image(bytes.as_ref()),
            };
            res.map_err(|e| match e {
                FilmError::Decode(msg) => FilmError::decode(format!("frame {i}: {msg}")),
                other => other,
            })
        })
        .collect::<FilmResult<Vec<Surface>>>()?;

    stitch_surfaces(&decoded, opts, banner, typesetter)
}

/// Stitch four decoded frames into a proof sheet.
pub fn stitch_surfaces(
    frames: &[Surface],
    opts: &StitchOptions,
    banner: Option<&BannerText>,
    typesetter: Option<&mut Typesetter>,
) -> FilmResult<ProofSheet> {
    if frames.len() != BURST_LEN {
        return Err(FilmError::invalid_input(format!(
            "a burst needs exactly {BURST_LEN} frames, got {}",
            frames.len()
        )));
    }
    opts.validate()?;
    let draw_banner = opts.variant == GridVariant::Bannered && banner.is_some();
    if draw_banner && typesetter.is_none() {
        return Err(FilmError::validation(
            "banner text on a bannered sheet needs a typesetter",
        ));
    }

    let tile = frames
        .iter()
        .map(|f| f.width().min(f.height()))
        .min()
        .unwrap_or(0)
        .min(opts.max_tile);
    if tile == 0 {
        return Err(FilmError::invalid_input("frames must not be empty"));
    }
    let geometry = GridGeometry::from_tile(tile, opts.variant);
    tracing::debug!(tile, variant = ?opts.variant, "stitch geometry");

    let tiles = frames
        .par_iter()
        .map(|f| f.cover_fit(tile, tile, FilterType::Lanczos3))
        .collect::<FilmResult<Vec<Surface>>>()?;

    let mut canvas = Surface::filled(geometry.canvas_width(), geometry.canvas_height(), opts.matte)?;
    for (rect, t) in geometry.quadrants.iter().zip(&tiles) {
        canvas.blit(t, rect.x, rect.y)?;
    }
    if opts.separators {
        draw_separators(&mut canvas, &geometry, opts.separator_color)?;
    }
    if let (true, Some(text), Some(ts)) = (draw_banner, banner, typesetter) {
        draw_banner_text(&mut canvas, &geometry, text, ts, opts.banner_ink)?;
    }

    let encoded = encode_surface(
        &canvas,
        EncodeFormat::Jpeg {
            quality: opts.jpeg_quality,
        },
        ColorMode::Rgb,
    )?;
    tracing::info!(
        width = canvas.width(),
        height = canvas.height(),
        bytes = encoded.bytes.len(),
        "proof sheet stitched"
    );
    Ok(ProofSheet {
        geometry,
        encoded,
        surface: canvas,
    })
}

fn draw_separators(canvas: &mut Surface, g: &GridGeometry, color: Rgba8) -> FilmResult<()> {
    // Borders sit just outside each frame; they need at least one pixel of padding and of gap.
    if g.padding == 0 || g.gap < 2 {
        return Ok(());
    }
    for r in g.quadrants {
        let (x, y, w, h) = (r.x - 1, r.y - 1, r.w + 2, r.h + 2);
        canvas.fill_rect(RectPx::new(x, y, w, 1), color)?;
        canvas.fill_rect(RectPx::new(x, y + h - 1, w, 1), color)?;
        canvas.fill_rect(RectPx::new(x, y, 1, h), color)?;
        canvas.fill_rect(RectPx::new(x + w - 1, y, 1, h), color)?;
    }
    Ok(())
}

fn draw_banner_text(
    canvas: &mut Surface,
    g: &GridGeometry,
    text: &BannerText,
    ts: &mut Typesetter,
    ink: Rgba8,
) -> FilmResult<()> {
    let header = g.header_rect();
    let footer = g.footer_rect();
    let left = g.padding as f32;
    let right = (g.canvas_width() - g.padding) as f32;

    let head_style = TextStyle::new((header.h as f32 * 0.32).max(1.0), ink);
    let head_h = ts.measure("Hg", head_style.size_px)?.height;
    let head_top = header.y as f32 + (header.h as f32 - head_h) / 2.0;
    let location = text.location.as_deref().unwrap_or(PLACEHOLDER_LOCATION);
    let coords = text.coordinates.as_deref().unwrap_or(PLACEHOLDER_COORDINATES);
    ts.draw_line(canvas, location, &head_style, left, head_top)?;
    ts.draw_line(
        canvas,
        coords,
        &head_style.aligned(TextAlign::Right),
        right,
        head_top,
    )?;

    let foot_style =
        TextStyle::new((footer.h as f32 * 0.22).max(1.0), ink).aligned(TextAlign::Center);
    let foot_h = ts.measure("0", foot_style.size_px)?.height;
    let foot_top = footer.y as f32 + (footer.h as f32 - foot_h) / 2.0;
    let date = text.date.as_deref().unwrap_or(PLACEHOLDER_DATE);
    ts.draw_line(
        canvas,
        date,
        &foot_style,
        g.canvas_width() as f32 / 2.0,
        foot_top,
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/stitch.rs"]
mod tests;
