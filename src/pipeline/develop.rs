use std::time::{Duration, Instant};

use image::imageops::FilterType;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assets::decode::{decode_image, decode_image_with_timeout};
use crate::effects::blur::{RegionBlur, blur_region_in_place};
use crate::effects::glow::apply_glow;
use crate::effects::grain::apply_grain;
use crate::effects::mono::{enforce_grayscale, grayscale_with_contrast};
use crate::effects::tone::{apply_overlay, apply_tone};
use crate::encode::image::{ColorMode, EncodeFormat, EncodedImage, encode_surface};
use crate::foundation::error::{FilmError, FilmResult};
use crate::geometry::grid::{GridGeometry, GridVariant, Quadrant, compute_grid_geometry};
use crate::pipeline::cancel::CancelToken;
use crate::raster::surface::Surface;
use crate::stock::FilmStock;

/// Smallest accepted `max_width`.
pub const MIN_MAX_WIDTH: u32 = 256;
/// Largest accepted `max_width`.
pub const MAX_MAX_WIDTH: u32 = 3200;

/// Picks which two quadrants get the region blur.
pub trait QuadrantSelector {
    /// Two distinct quadrants.
    fn select(&mut self) -> [Quadrant; 2];
}

/// Uniform choice of 2 of 4 quadrants without replacement.
#[derive(Debug)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Selector seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible selector.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl QuadrantSelector for RandomSelector {
    fn select(&mut self) -> [Quadrant; 2] {
        let picked = rand::seq::index::sample(&mut self.rng, Quadrant::ALL.len(), 2);
        let mut out = [Quadrant::ALL[picked.index(0)], Quadrant::ALL[picked.index(1)]];
        out.sort();
        out
    }
}

/// Always returns the same pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedSelector([Quadrant; 2]);

impl FixedSelector {
    /// Selector for `a` and `b`, which must differ.
    pub fn new(a: Quadrant, b: Quadrant) -> FilmResult<Self> {
        if a == b {
            return Err(FilmError::invalid_input(
                "blurred quadrants must be two distinct positions",
            ));
        }
        Ok(Self([a, b]))
    }
}

impl QuadrantSelector for FixedSelector {
    fn select(&mut self) -> [Quadrant; 2] {
        self.0
    }
}

/// Developer settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopOptions {
    /// Grid variant; set from the shared configuration so stitch and develop agree.
    #[serde(skip)]
    pub variant: GridVariant,
    /// Safety ceiling for the sheet width.
    pub max_width: u32,
    /// Region blur applied to the two selected quadrants.
    pub blur: RegionBlur,
    /// Seed of the grain tile.
    pub grain_seed: u64,
    /// JPEG quality of the composite.
    pub composite_quality: u8,
    /// Container of the extracted frames.
    pub frame_format: EncodeFormat,
    /// Sheet decode deadline.
    #[serde(skip)]
    pub decode_timeout: Option<Duration>,
}

impl Default for DevelopOptions {
    fn default() -> Self {
        Self {
            variant: GridVariant::Simple,
            max_width: 2400,
            blur: RegionBlur::default(),
            grain_seed: 0x5eed_f11d,
            composite_quality: 92,
            frame_format: EncodeFormat::WebpLossless,
            decode_timeout: None,
        }
    }
}

impl DevelopOptions {
    /// Reject out-of-range settings.
    pub fn validate(&self) -> FilmResult<()> {
        if !(MIN_MAX_WIDTH..=MAX_MAX_WIDTH).contains(&self.max_width) {
            return Err(FilmError::validation(format!(
                "develop.max_width {} is outside {MIN_MAX_WIDTH}..={MAX_MAX_WIDTH}",
                self.max_width
            )));
        }
        if !(90..=100).contains(&self.composite_quality) {
            return Err(FilmError::validation(format!(
                "develop.composite_quality {} is outside 90..=100",
                self.composite_quality
            )));
        }
        let r = self.blur.sigma_ratio;
        if !r.is_finite() || r <= 0.0 || r > 0.1 {
            return Err(FilmError::validation(format!(
                "develop.blur.sigma_ratio {r} is outside (0, 0.1]"
            )));
        }
        self.frame_format.validate()
    }
}

/// Output of [`develop_frames`].
#[derive(Clone, Debug)]
pub struct DevelopedBurst {
    /// Stock that was applied.
    pub stock: FilmStock,
    /// Geometry the frames were cut with.
    pub geometry: GridGeometry,
    /// Quadrants that received the region blur, sorted.
    pub blurred: [Quadrant; 2],
    /// Encoded composite.
    pub composite: EncodedImage,
    /// Encoded frames in capture order (always four).
    pub frames: Vec<EncodedImage>,
    /// Composite pixels before encoding.
    pub composite_surface: Surface,
    /// Frame pixels before encoding; each equals the composite crop at its quadrant.
    pub frame_surfaces: Vec<Surface>,
}

/// Develop an encoded proof sheet with `stock`.
pub fn develop_frames(
    sheet: &[u8],
    stock: FilmStock,
    opts: &DevelopOptions,
    selector: &mut dyn QuadrantSelector,
) -> FilmResult<DevelopedBurst> {
    opts.validate()?;
    let surface = match opts.decode_timeout {
        Some(t) => decode_image_with_timeout(sheet, t)?,
        None => decode_image(sheet)?,
    };
    develop_surface(surface, stock, opts, selector, None)
}

/// Develop a decoded proof sheet. `cancel` is polled between passes.
#[tracing::instrument(level = "debug", skip_all, fields(stock = %stock))]
pub fn develop_surface(
    sheet: Surface,
    stock: FilmStock,
    opts: &DevelopOptions,
    selector: &mut dyn QuadrantSelector,
    cancel: Option<&CancelToken>,
) -> FilmResult<DevelopedBurst> {
    opts.validate()?;
    let started = Instant::now();
    let check = |stage: &str| cancel.map_or(Ok(()), |c| c.check(stage));
    let params = stock.params();

    check("downscale")?;
    let mut canvas = fit_to_ceiling(sheet, opts)?;
    let (width, height) = canvas.dimensions();
    let geometry = compute_grid_geometry(width, opts.variant);
    if !geometry.fits_within(width, height) {
        return Err(FilmError::processing(format!(
            "a {width}x{height} sheet cannot hold a {:?} grid",
            opts.variant
        )));
    }

    let blurred = selector.select();
    if blurred[0] == blurred[1] {
        return Err(FilmError::processing(
            "quadrant selector returned the same quadrant twice",
        ));
    }
    let mut blurred_sorted = blurred;
    blurred_sorted.sort();
    tracing::debug!(tile = geometry.tile, ?blurred_sorted, "geometry and blur selection");

    check("region blur")?;
    for q in blurred_sorted {
        blur_region_in_place(&mut canvas, geometry.quadrant(q), &opts.blur)?;
    }

    check("tone")?;
    apply_tone(canvas.data_mut(), &params.tone);
    if let Some(overlay) = params.overlay {
        apply_overlay(canvas.data_mut(), &overlay);
    }

    check("grain")?;
    apply_grain(canvas.data_mut(), width, height, &params.grain, opts.grain_seed)?;

    if let Some(alpha) = params.glow {
        check("glow")?;
        apply_glow(&mut canvas, alpha)?;
    }

    if let Some(k) = params.mono_k {
        check("grayscale")?;
        grayscale_with_contrast(canvas.data_mut(), k);
    }

    check("frame extraction")?;
    let frame_surfaces = geometry
        .quadrants
        .iter()
        .map(|r| {
            let mut crop = canvas.crop(*r)?;
            if stock.is_mono() {
                enforce_grayscale(crop.data_mut());
            }
            Ok(crop)
        })
        .collect::<FilmResult<Vec<Surface>>>()?;

    check("encode")?;
    let mode = if stock.is_mono() {
        ColorMode::Gray
    } else {
        ColorMode::Rgb
    };
    let composite = encode_surface(
        &canvas,
        EncodeFormat::Jpeg {
            quality: opts.composite_quality,
        },
        mode,
    )?;
    let frames = frame_surfaces
        .par_iter()
        .map(|f| encode_surface(f, opts.frame_format, mode))
        .collect::<FilmResult<Vec<EncodedImage>>>()?;

    tracing::info!(
        width,
        height,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "burst developed"
    );
    Ok(DevelopedBurst {
        stock,
        geometry,
        blurred: blurred_sorted,
        composite,
        frames,
        composite_surface: canvas,
        frame_surfaces,
    })
}

/// Downscale a sheet wider than `max_width` to the canonical canvas of the largest grid that
/// fits under the ceiling.
fn fit_to_ceiling(sheet: Surface, opts: &DevelopOptions) -> FilmResult<Surface> {
    if sheet.width() <= opts.max_width {
        return Ok(sheet);
    }
    let target = compute_grid_geometry(opts.max_width, opts.variant);
    if target.is_degenerate() {
        return Err(FilmError::processing("ceiling too small for any grid"));
    }
    let (w, h) = (target.canvas_width(), target.canvas_height());
    tracing::debug!(
        from_width = sheet.width(),
        from_height = sheet.height(),
        to_width = w,
        to_height = h,
        "downscaling sheet to ceiling"
    );
    sheet.resize(w, h, FilterType::Lanczos3)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/develop.rs"]
mod tests;
