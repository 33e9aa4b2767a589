use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::assets::decode::decode_image;
use crate::assets::text::{TextAlign, TextMeasure, TextStyle, Typesetter};
use crate::encode::image::{ColorMode, EncodeFormat, EncodedImage, encode_surface};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{FilmError, FilmResult};
use crate::geometry::poster::PosterLayout;
use crate::raster::surface::Surface;

/// Printed when no location is known.
pub const PLACEHOLDER_LOCATION: &str = "UNKNOWN LOCATION";
/// Printed when no coordinates are known.
pub const PLACEHOLDER_COORDINATES: &str = "--.----° N, --.----° E";
/// Printed when no date is known.
pub const PLACEHOLDER_DATE: &str = "----.--.--";
/// Printed when no stock label is given.
pub const PLACEHOLDER_STOCK: &str = "UNKNOWN STOCK";

/// Caption of the left footer column.
pub const FOOTER_STOCK_CAPTION: &str = "FILM STOCK";
/// Caption of the right footer column.
pub const FOOTER_COORDS_CAPTION: &str = "COORDINATES";

/// Text printed on a poster. `None` fields print placeholders.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosterMeta {
    /// Headline.
    pub location: Option<String>,
    /// Date, top right.
    pub date: Option<String>,
    /// Stock name, footer left.
    pub stock_label: Option<String>,
    /// Coordinates, footer right.
    pub coordinates: Option<String>,
}

impl PosterMeta {
    /// Headline text (upper-cased).
    pub fn title(&self) -> String {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(PLACEHOLDER_LOCATION)
            .to_uppercase()
    }

    fn field<'a>(v: &'a Option<String>, placeholder: &'a str) -> &'a str {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(placeholder)
    }
}

/// Poster colors and encoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosterOptions {
    /// Paper color.
    pub background: Rgba8,
    /// Headline and value color.
    pub ink: Rgba8,
    /// Caption and label color.
    pub muted: Rgba8,
    /// Top-left technical label.
    pub source_label: String,
    /// JPEG quality.
    pub jpeg_quality: u8,
}

impl Default for PosterOptions {
    fn default() -> Self {
        Self {
            background: Rgba8::rgb(0xef, 0xeb, 0xe3),
            ink: Rgba8::rgb(0x14, 0x14, 0x14),
            muted: Rgba8::rgb(0x6e, 0x6a, 0x64),
            source_label: "FILMGRID // 2×2 BURST".to_string(),
            jpeg_quality: 92,
        }
    }
}

impl PosterOptions {
    /// Reject out-of-range settings.
    pub fn validate(&self) -> FilmResult<()> {
        if !(85..=100).contains(&self.jpeg_quality) {
            return Err(FilmError::validation(format!(
                "poster.jpeg_quality {} is outside 85..=100",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// A rendered poster.
#[derive(Clone, Debug)]
pub struct Poster {
    /// Layout used; its image slot is what the motion exporter replays into.
    pub layout: PosterLayout,
    /// Headline size chosen by [`fit_title_size`].
    pub title_size: f32,
    /// Where the headline landed on the poster.
    pub title_bounds: kurbo::Rect,
    /// Encoded poster.
    pub encoded: EncodedImage,
    /// Poster pixels before encoding.
    pub surface: Surface,
}

/// Largest headline size, stepping down from the layout's start size, at which `title` fits
/// `max_width`. Stops at the floor size even if the title still overflows.
pub fn fit_title_size(
    measure: &mut dyn TextMeasure,
    title: &str,
    max_width: f32,
    layout: &PosterLayout,
) -> FilmResult<f32> {
    let floor = layout.title_floor_size;
    let step = layout.title_step.max(1.0);
    let mut size = layout.title_start_size.max(floor);
    loop {
        if size <= floor || measure.text_width(title, size)? <= max_width {
            return Ok(size);
        }
        size = (size - step).max(floor);
    }
}

/// Render the poster for an encoded composite.
pub fn render_poster(
    composite: &[u8],
    meta: &PosterMeta,
    typesetter: &mut Typesetter,
    opts: &PosterOptions,
) -> FilmResult<Poster> {
    let composite = decode_image(composite)?;
    render_poster_surface(&composite, meta, typesetter, opts)
}

/// Render the poster for a decoded composite.
#[tracing::instrument(level = "debug", skip_all, fields(location = ?meta.location))]
pub fn render_poster_surface(
    composite: &Surface,
    meta: &PosterMeta,
    typesetter: &mut Typesetter,
    opts: &PosterOptions,
) -> FilmResult<Poster> {
    opts.validate()?;
    let layout = PosterLayout::canonical();
    let mut canvas = Surface::filled(layout.width, layout.height, opts.background)?;
    let left = layout.margin as f32;
    let right = (layout.width - layout.margin) as f32;

    let label = TextStyle::new(layout.label_size, opts.muted);
    typesetter.draw_line(&mut canvas, &opts.source_label, &label, left, layout.label_top as f32)?;
    let date = PosterMeta::field(&meta.date, PLACEHOLDER_DATE);
    typesetter.draw_line(
        &mut canvas,
        date,
        &label.aligned(TextAlign::Right),
        right,
        layout.label_top as f32,
    )?;

    let title = meta.title();
    let title_size = fit_title_size(typesetter, &title, layout.content_width() as f32, &layout)?;
    let title_h = typesetter.measure(&title, title_size)?.height;
    let title_top = layout.title_top as f32 + ((layout.title_band as f32 - title_h) / 2.0).max(0.0);
    let title_bounds = typesetter
        .draw_line(
            &mut canvas,
            &title,
            &TextStyle::new(title_size, opts.ink),
            left,
            title_top,
        )?
        .bounds;
    tracing::debug!(title_size, "headline fitted");

    let slot = layout.image_slot;
    let picture = composite.cover_fit(slot.w, slot.h, FilterType::Lanczos3)?;
    canvas.blit(&picture, slot.x, slot.y)?;
    canvas.fill_rect(layout.divider, opts.ink)?;

    let caption = TextStyle::new(layout.footer_label_size, opts.muted);
    let value = TextStyle::new(layout.footer_value_size, opts.ink);
    let cap_top = layout.footer_label_top as f32;
    let val_top = layout.footer_value_top as f32;
    let stock = PosterMeta::field(&meta.stock_label, PLACEHOLDER_STOCK);
    let coords = PosterMeta::field(&meta.coordinates, PLACEHOLDER_COORDINATES);
    typesetter.draw_line(&mut canvas, FOOTER_STOCK_CAPTION, &caption, left, cap_top)?;
    typesetter.draw_line(&mut canvas, stock, &value, left, val_top)?;
    typesetter.draw_line(
        &mut canvas,
        FOOTER_COORDS_CAPTION,
        &caption.aligned(TextAlign::Right),
        right,
        cap_top,
    )?;
    typesetter.draw_line(
        &mut canvas,
        coords,
        &value.aligned(TextAlign::Right),
        right,
        val_top,
    )?;

    let encoded = encode_surface(
        &canvas,
        EncodeFormat::Jpeg {
            quality: opts.jpeg_quality,
        },
        ColorMode::Rgb,
    )?;
    tracing::info!(bytes = encoded.bytes.len(), "poster rendered");
    Ok(Poster {
        layout,
        title_size,
        title_bounds,
        encoded,
        surface: canvas,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/poster.rs"]
mod tests;
