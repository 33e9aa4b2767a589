use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};

use crate::assets::payload::to_data_url;
use crate::foundation::error::{FilmError, FilmResult};
use crate::raster::surface::Surface;

/// Still-image container and settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodeFormat {
    /// Baseline JPEG at `quality` (1–100).
    Jpeg {
        /// Encoder quality.
        quality: u8,
    },
    /// Lossless WebP.
    WebpLossless,
    /// PNG.
    Png,
}

impl EncodeFormat {
    /// MIME type of the encoded bytes.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::WebpLossless => "image/webp",
            Self::Png => "image/png",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::WebpLossless => "webp",
            Self::Png => "png",
        }
    }

    /// True when decoding returns exactly the encoded pixels.
    pub fn is_lossless(self) -> bool {
        !matches!(self, Self::Jpeg { .. })
    }

    /// Reject out-of-range settings.
    pub fn validate(self) -> FilmResult<()> {
        match self {
            Self::Jpeg { quality } if !(1..=100).contains(&quality) => Err(
                FilmError::validation(format!("jpeg quality {quality} is outside 1..=100")),
            ),
            _ => Ok(()),
        }
    }
}

/// Channel layout written to the container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Three color channels.
    #[default]
    Rgb,
    /// One luma channel taken from the red channel; for surfaces that are already gray.
    Gray,
}

/// Encoded still image plus the metadata callers persist alongside it.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Container used.
    pub format: EncodeFormat,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl EncodedImage {
    /// MIME type of [`EncodedImage::bytes`].
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// The bytes as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        to_data_url(self.mime(), &self.bytes)
    }
}

/// Encode an opaque surface. Alpha is dropped.
pub fn encode_surface(
    surface: &Surface,
    format: EncodeFormat,
    mode: ColorMode,
) -> FilmResult<EncodedImage> {
    format.validate()?;
    let (width, height) = surface.dimensions();
    let (pixels, color) = match mode {
        ColorMode::Rgb => (
            surface
                .data()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect::<Vec<u8>>(),
            ExtendedColorType::Rgb8,
        ),
        ColorMode::Gray => (
            surface.data().chunks_exact(4).map(|px| px[0]).collect(),
            ExtendedColorType::L8,
        ),
    };

    let mut bytes = Vec::new();
    let res = match format {
        EncodeFormat::Jpeg { quality } => {
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality)
                .write_image(&pixels, width, height, color)
        }
        EncodeFormat::WebpLossless => image::codecs::webp::WebPEncoder::new_lossless(&mut bytes)
            .write_image(&pixels, width, height, color),
        EncodeFormat::Png => image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(&pixels, width, height, color),
    };
    res.map_err(|e| {
        FilmError::processing(format!(
            "encode {width}x{height} {}: {e}",
            format.extension()
        ))
    })?;

    Ok(EncodedImage {
        format,
        width,
        height,
        bytes,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/image.rs"]
mod tests;
