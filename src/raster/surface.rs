use image::imageops::FilterType;

use crate::foundation::core::{RectPx, Rgba8};
use crate::foundation::error::{FilmError, FilmResult};
use crate::foundation::math::mul_div255_u8;

/// Largest edge any surface may have. Entry downscaling keeps real workloads far below this.
pub const MAX_SURFACE_EDGE: u32 = 16_384;

/// Owned row-major RGBA8 (straight alpha) pixel buffer.
///
/// Every pipeline call allocates its own surfaces and drops them on return; surfaces are never
/// shared between calls.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

fn byte_len(width: u32, height: u32) -> FilmResult<usize> {
    if width == 0 || height == 0 {
        return Err(FilmError::processing("surface dimensions must be non-zero"));
    }
    if width > MAX_SURFACE_EDGE || height > MAX_SURFACE_EDGE {
        return Err(FilmError::processing(format!(
            "surface {width}x{height} exceeds the {MAX_SURFACE_EDGE}px edge limit"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FilmError::processing("surface buffer size overflow"))
}

impl Surface {
    /// Allocate a surface filled with `color`.
    pub fn filled(width: u32, height: u32, color: Rgba8) -> FilmResult<Self> {
        let len = byte_len(width, height)?;
        let data = color.to_array().repeat(len / 4);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap an existing RGBA8 buffer.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> FilmResult<Self> {
        let len = byte_len(width, height)?;
        if data.len() != len {
            return Err(FilmError::processing(
                "surface data must match width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Take ownership of an `image` RGBA buffer.
    pub fn from_rgba_image(img: image::RgbaImage) -> FilmResult<Self> {
        let (w, h) = img.dimensions();
        Self::from_raw(w, h, img.into_raw())
    }

    /// Copy into an `image` RGBA buffer.
    pub fn to_rgba_image(&self) -> FilmResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| FilmError::processing("surface buffer does not match its dimensions"))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Full-surface rectangle.
    pub fn bounds(&self) -> RectPx {
        RectPx::new(0, 0, self.width, self.height)
    }

    /// Borrow the pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutably borrow the pixel bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume into the pixel bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    /// Read one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    fn check_rect(&self, rect: RectPx, what: &str) -> FilmResult<()> {
        if rect.is_empty() || !rect.fits_in(self.width, self.height) {
            return Err(FilmError::processing(format!(
                "{what} rect {rect:?} is empty or outside the {}x{} surface",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Overwrite `rect` with an opaque fill.
    pub fn fill_rect(&mut self, rect: RectPx, color: Rgba8) -> FilmResult<()> {
        self.check_rect(rect, "fill")?;
        let px = color.to_array();
        let stride = self.stride();
        for y in rect.y..rect.bottom() {
            let start = y as usize * stride + rect.x as usize * 4;
            let row = &mut self.data[start..start + rect.w as usize * 4];
            for d in row.chunks_exact_mut(4) {
                d.copy_from_slice(&px);
            }
        }
        Ok(())
    }

    /// Copy `rect` into a new surface.
    pub fn crop(&self, rect: RectPx) -> FilmResult<Surface> {
        self.check_rect(rect, "crop")?;
        let stride = self.stride();
        let row_len = rect.w as usize * 4;
        let mut data = Vec::with_capacity(row_len * rect.h as usize);
        for y in rect.y..rect.bottom() {
            let start = y as usize * stride + rect.x as usize * 4;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Surface::from_raw(rect.w, rect.h, data)
    }

    /// Copy all of `src` into this surface with its top-left corner at `(x, y)`.
    pub fn blit(&mut self, src: &Surface, x: u32, y: u32) -> FilmResult<()> {
        let rect = RectPx::new(x, y, src.width, src.height);
        self.check_rect(rect, "blit")?;
        let stride = self.stride();
        let row_len = src.stride();
        for (row, src_row) in src.data.chunks_exact(row_len).enumerate() {
            let start = (y as usize + row) * stride + x as usize * 4;
            self.data[start..start + row_len].copy_from_slice(src_row);
        }
        Ok(())
    }

    /// Resample to exactly `width`×`height`.
    pub fn resize(&self, width: u32, height: u32, filter: FilterType) -> FilmResult<Surface> {
        byte_len(width, height)?;
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }
        let img = self.to_rgba_image()?;
        let out = image::imageops::resize(&img, width, height, filter);
        Surface::from_rgba_image(out)
    }

    /// Center-crop to the target aspect ratio, then resample to exactly `width`×`height`.
    pub fn cover_fit(&self, width: u32, height: u32, filter: FilterType) -> FilmResult<Surface> {
        byte_len(width, height)?;
        let src_w = u64::from(self.width);
        let src_h = u64::from(self.height);
        // Compare aspect ratios in integers: src_w/src_h vs width/height.
        let (crop_w, crop_h) = if src_w * u64::from(height) > src_h * u64::from(width) {
            (((src_h * u64::from(width)) / u64::from(height)).max(1), src_h)
        } else {
            (src_w, ((src_w * u64::from(height)) / u64::from(width)).max(1))
        };
        let crop = RectPx::new(
            ((src_w - crop_w) / 2) as u32,
            ((src_h - crop_h) / 2) as u32,
            crop_w as u32,
            crop_h as u32,
        );
        let cropped = if crop == self.bounds() {
            self.clone()
        } else {
            self.crop(crop)?
        };
        cropped.resize(width, height, filter)
    }

    /// Composite a premultiplied RGBA8 buffer (`w`×`h`) source-over at `(x, y)`.
    ///
    /// Pixels falling outside the surface are clipped.
    pub fn composite_premul_at(
        &mut self,
        src_premul: &[u8],
        w: u32,
        h: u32,
        x: i64,
        y: i64,
    ) -> FilmResult<()> {
        if src_premul.len() != (w as usize) * (h as usize) * 4 {
            return Err(FilmError::processing(
                "composite_premul_at expects a buffer matching w*h*4",
            ));
        }
        let stride = self.stride();
        for sy in 0..h as i64 {
            let dy = y + sy;
            if dy < 0 || dy >= i64::from(self.height) {
                continue;
            }
            for sx in 0..w as i64 {
                let dx = x + sx;
                if dx < 0 || dx >= i64::from(self.width) {
                    continue;
                }
                let si = (sy as usize * w as usize + sx as usize) * 4;
                let sa = src_premul[si + 3];
                if sa == 0 {
                    continue;
                }
                let di = dy as usize * stride + dx as usize * 4;
                let inv = 255u16 - u16::from(sa);
                for c in 0..3 {
                    let d = mul_div255_u8(u16::from(self.data[di + c]), inv);
                    self.data[di + c] = d.saturating_add(src_premul[si + c]);
                }
                let da = mul_div255_u8(u16::from(self.data[di + 3]), inv);
                self.data[di + 3] = da.saturating_add(sa);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/surface.rs"]
mod tests;
