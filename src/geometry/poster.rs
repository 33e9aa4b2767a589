//! Fixed poster layout shared by the poster renderer and the motion exporter.

use crate::foundation::core::RectPx;

/// Version of the poster layout contract. Bump when any constant below changes.
pub const POSTER_LAYOUT_VERSION: u32 = 1;

/// Logical poster width.
pub const POSTER_WIDTH: u32 = 2400;
/// Logical poster height.
pub const POSTER_HEIGHT: u32 = 3600;

/// Pixel layout of the poster canvas.
///
/// Text positions are the top edge of the text box; the image slot is the rectangle the motion
/// exporter replays frames into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PosterLayout {
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Left/right margin.
    pub margin: u32,
    /// Top of the technical label row.
    pub label_top: u32,
    /// Font size of the technical label row.
    pub label_size: f32,
    /// Top of the headline band.
    pub title_top: u32,
    /// Height reserved for the headline.
    pub title_band: u32,
    /// Headline size the fitting loop starts from.
    pub title_start_size: f32,
    /// Smallest headline size the fitting loop may reach.
    pub title_floor_size: f32,
    /// Headline size decrement per fitting step.
    pub title_step: f32,
    /// Square slot the processed composite is drawn into.
    pub image_slot: RectPx,
    /// Divider line under the image.
    pub divider: RectPx,
    /// Top of the footer caption row.
    pub footer_label_top: u32,
    /// Footer caption size.
    pub footer_label_size: f32,
    /// Top of the footer value row.
    pub footer_value_top: u32,
    /// Footer value size.
    pub footer_value_size: f32,
}

impl PosterLayout {
    /// The canonical 2400×3600 layout.
    pub const fn canonical() -> Self {
        Self {
            width: POSTER_WIDTH,
            height: POSTER_HEIGHT,
            margin: 150,
            label_top: 150,
            label_size: 44.0,
            title_top: 260,
            title_band: 400,
            title_start_size: 350.0,
            title_floor_size: 120.0,
            title_step: 10.0,
            image_slot: RectPx::new(150, 700, 2100, 2100),
            divider: RectPx::new(150, 2900, 2100, 4),
            footer_label_top: 2960,
            footer_label_size: 40.0,
            footer_value_top: 3020,
            footer_value_size: 84.0,
        }
    }

    /// Width available to text between the margins.
    pub fn content_width(&self) -> u32 {
        self.width - 2 * self.margin
    }

    /// Band the headline is centred in.
    pub fn title_rect(&self) -> RectPx {
        RectPx::new(self.margin, self.title_top, self.content_width(), self.title_band)
    }

    /// Layout scaled to `width` pixels wide (height keeps the 2:3 ratio and stays even).
    ///
    /// Every rectangle is floor-scaled from the canonical constants, so a scaled slot always
    /// lands on the same poster pixels as the full-size one.
    pub fn scaled(width: u32) -> Self {
        let c = Self::canonical();
        let width = width.max(2) & !1;
        let num = width;
        let den = c.width;
        let s = |v: u32| ((u64::from(v) * u64::from(num)) / u64::from(den)) as u32;
        let sf = |v: f32| v * (num as f32) / (den as f32);
        let height = s(c.height) & !1;

        Self {
            width,
            height,
            margin: s(c.margin),
            label_top: s(c.label_top),
            label_size: sf(c.label_size),
            title_top: s(c.title_top),
            title_band: s(c.title_band),
            title_start_size: sf(c.title_start_size),
            title_floor_size: sf(c.title_floor_size),
            title_step: sf(c.title_step).max(1.0),
            image_slot: c.image_slot.scale_floor(num, den),
            divider: c.divider.scale_floor(num, den),
            footer_label_top: s(c.footer_label_top),
            footer_label_size: sf(c.footer_label_size),
            footer_value_top: s(c.footer_value_top),
            footer_value_size: sf(c.footer_value_size),
        }
    }
}

impl Default for PosterLayout {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/poster.rs"]
mod tests;
