use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{FilmError, FilmResult};
use crate::raster::surface::Surface;

/// Environment variable naming a font file to prefer over the built-in search list.
pub const FONT_ENV: &str = "FILMGRID_FONT";

const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Locate a usable bold sans-serif font: `$FILMGRID_FONT` first, then common system paths.
pub fn find_system_font() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(FONT_ENV).map(PathBuf::from)
        && p.is_file()
    {
        return Some(p);
    }
    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Measures rendered text width; lets layout decisions be made without a real font.
pub trait TextMeasure {
    /// Advance width of `text` set on one line at `size_px`.
    fn text_width(&mut self, text: &str, size_px: f32) -> FilmResult<f32>;
}

/// Horizontal placement of a text box relative to its anchor `x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Box starts at the anchor.
    #[default]
    Left,
    /// Box is centered on the anchor.
    Center,
    /// Box ends at the anchor.
    Right,
}

/// How one line of text is set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size_px: f32,
    /// Fill color.
    pub color: Rgba8,
    /// Placement relative to the anchor.
    pub align: TextAlign,
}

impl TextStyle {
    /// Left-aligned style.
    pub fn new(size_px: f32, color: Rgba8) -> Self {
        Self {
            size_px,
            color,
            align: TextAlign::Left,
        }
    }

    /// Same style with a different alignment.
    pub fn aligned(self, align: TextAlign) -> Self {
        Self { align, ..self }
    }
}

/// Size and placement of a text box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtent {
    /// Advance width.
    pub width: f32,
    /// Line box height.
    pub height: f32,
    /// Line box in target pixels; anchored at the origin for measurements.
    pub bounds: kurbo::Rect,
}

impl TextExtent {
    fn at(width: f32, height: f32, left: f32, top: f32) -> Self {
        let (x, y) = (f64::from(left), f64::from(top));
        Self {
            width,
            height,
            bounds: kurbo::Rect::new(x, y, x + f64::from(width), y + f64::from(height)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct TextBrush;

/// Parley contexts plus the family registered from the loaded font.
struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family: String,
}

impl TextLayoutEngine {
    fn with_font(font_bytes: &[u8]) -> FilmResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| FilmError::validation("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FilmError::validation("registered font family has no name"))?
            .to_string();
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
        })
    }

    fn layout_line(&mut self, text: &str, size_px: f32) -> FilmResult<parley::Layout<TextBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(FilmError::processing("text size must be finite and > 0"));
        }
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Lays out and rasterizes single lines of text in one font.
pub struct Typesetter {
    engine: TextLayoutEngine,
    font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for Typesetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typesetter")
            .field("family", &self.engine.family)
            .finish_non_exhaustive()
    }
}

impl Typesetter {
    /// Load a typesetter from TrueType/OpenType bytes.
    pub fn from_bytes(font_bytes: Vec<u8>) -> FilmResult<Self> {
        let engine = TextLayoutEngine::with_font(&font_bytes)?;
        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        Ok(Self { engine, font })
    }

    /// Load a typesetter from a font file.
    pub fn from_path(path: &Path) -> FilmResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            FilmError::validation(format!("read font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes)
    }

    /// A typesetter over [`find_system_font`], if one exists.
    pub fn system() -> FilmResult<Option<Self>> {
        find_system_font().map(|p| Self::from_path(&p)).transpose()
    }

    /// Family name registered from the font.
    pub fn family(&self) -> &str {
        &self.engine.family
    }

    /// Measure a single line.
    pub fn measure(&mut self, text: &str, size_px: f32) -> FilmResult<TextExtent> {
        let layout = self.engine.layout_line(text, size_px)?;
        Ok(TextExtent::at(layout.width(), layout.height(), 0.0, 0.0))
    }

    /// Draw one line of `text` with its top edge at `top`, aligned on `anchor_x`.
    pub fn draw_line(
        &mut self,
        surface: &mut Surface,
        text: &str,
        style: &TextStyle,
        anchor_x: f32,
        top: f32,
    ) -> FilmResult<TextExtent> {
        let TextStyle {
            size_px,
            color,
            align,
        } = *style;
        let layout = self.engine.layout_line(text, size_px)?;
        let (width, height) = (layout.width(), layout.height());
        let left = match align {
            TextAlign::Left => anchor_x,
            TextAlign::Center => anchor_x - width / 2.0,
            TextAlign::Right => anchor_x - width,
        };
        let extent = TextExtent::at(width, height, left, top);
        let w = width.ceil() as u32;
        let h = height.ceil() as u32;
        if w == 0 || h == 0 {
            return Ok(extent);
        }
        let (pw, ph) = match (u16::try_from(w), u16::try_from(h)) {
            (Ok(pw), Ok(ph)) => (pw, ph),
            _ => {
                return Err(FilmError::processing(format!(
                    "text box {w}x{h} exceeds the rasterizer limit"
                )));
            }
        };

        let mut ctx = vello_cpu::RenderContext::new(pw, ph);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(pw, ph);
        ctx.render_to_pixmap(&mut pixmap);

        surface.composite_premul_at(
            pixmap.data_as_u8_slice(),
            w,
            h,
            left.round() as i64,
            top.round() as i64,
        )?;
        Ok(extent)
    }
}

impl TextMeasure for Typesetter {
    fn text_width(&mut self, text: &str, size_px: f32) -> FilmResult<f32> {
        Ok(self.measure(text, size_px)?.width)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
