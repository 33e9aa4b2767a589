use std::io::Cursor;
use std::sync::mpsc;
use std::time::Duration;

use crate::foundation::error::{FilmError, FilmResult};
use crate::raster::surface::Surface;

/// Largest width or height accepted from an encoded image.
pub const MAX_DECODE_EDGE: u32 = 8192;

/// Decode an encoded raster (format sniffed from the bytes) into an opaque [`Surface`].
///
/// Translucent pixels are flattened onto black. Images wider or taller than
/// [`MAX_DECODE_EDGE`] are rejected before their pixels are allocated.
pub fn decode_image(bytes: &[u8]) -> FilmResult<Surface> {
    if bytes.is_empty() {
        return Err(FilmError::decode("empty image payload"));
    }
    let mut reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| FilmError::decode(format!("sniff image format: {e}")))?;
    if reader.format().is_none() {
        return Err(FilmError::decode("unrecognized image format"));
    }
    let mut limits = image::Limits::default();
    limits.max_image_width = Some(MAX_DECODE_EDGE);
    limits.max_image_height = Some(MAX_DECODE_EDGE);
    reader.limits(limits);

    let img = reader
        .decode()
        .map_err(|e| FilmError::decode(format!("decode image: {e}")))?;
    let mut rgba = img.to_rgba8();
    flatten_alpha_in_place(&mut rgba);
    Surface::from_rgba_image(rgba)
}

/// [`decode_image`] on a worker thread, failing with `Decode` once `timeout` elapses.
///
/// A timed-out worker is detached; its result is dropped when it finishes.
pub fn decode_image_with_timeout(bytes: &[u8], timeout: Duration) -> FilmResult<Surface> {
    let owned = bytes.to_vec();
    let (tx, rx) = mpsc::sync_channel(1);
    std::thread::Builder::new()
        .name("filmgrid-decode".to_string())
        .spawn(move || {
            let _ = tx.send(decode_image(&owned));
        })
        .map_err(|e| FilmError::processing(format!("spawn decode worker: {e}")))?;
    match rx.recv_timeout(timeout) {
        Ok(res) => res,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(FilmError::decode(format!(
            "decode did not finish within {}ms",
            timeout.as_millis()
        ))),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(FilmError::decode("decode worker exited without a result"))
        }
    }
}

fn flatten_alpha_in_place(rgba: &mut image::RgbaImage) {
    for px in rgba.pixels_mut() {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        for c in 0..3 {
            px[c] = ((u16::from(px[c]) * a + 127) / 255) as u8;
        }
        px[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
