use super::*;
use crate::assets::decode::decode_image;
use crate::foundation::core::{RectPx, Rgba8};

fn sample() -> Surface {
    let mut s = Surface::filled(24, 16, Rgba8::rgb(200, 30, 40)).unwrap();
    s.fill_rect(RectPx::new(4, 4, 8, 8), Rgba8::rgb(10, 220, 90))
        .unwrap();
    s
}

#[test]
fn lossless_formats_decode_to_identical_pixels() {
    let s = sample();
    for format in [EncodeFormat::WebpLossless, EncodeFormat::Png] {
        let enc = encode_surface(&s, format, ColorMode::Rgb).unwrap();
        assert_eq!((enc.width, enc.height), (24, 16));
        let back = decode_image(&enc.bytes).unwrap();
        assert_eq!(back.data(), s.data(), "{format:?}");
    }
}

#[test]
fn jpeg_is_close_and_sized() {
    let s = Surface::filled(32, 32, Rgba8::rgb(180, 40, 40)).unwrap();
    let enc = encode_surface(&s, EncodeFormat::Jpeg { quality: 92 }, ColorMode::Rgb).unwrap();
    assert_eq!(enc.mime(), "image/jpeg");
    let back = decode_image(&enc.bytes).unwrap();
    assert_eq!(back.dimensions(), (32, 32));
    let px = back.pixel(16, 16);
    assert!((i16::from(px[0]) - 180).abs() <= 4);
}

#[test]
fn gray_mode_decodes_with_equal_channels() {
    let s = Surface::filled(16, 16, Rgba8::rgb(77, 77, 77)).unwrap();
    for format in [
        EncodeFormat::Jpeg { quality: 90 },
        EncodeFormat::WebpLossless,
        EncodeFormat::Png,
    ] {
        let enc = encode_surface(&s, format, ColorMode::Gray).unwrap();
        let back = decode_image(&enc.bytes).unwrap();
        assert!(
            back.data()
                .chunks_exact(4)
                .all(|px| px[0] == px[1] && px[1] == px[2]),
            "{format:?}"
        );
    }
}

#[test]
fn bad_quality_is_a_validation_error() {
    let s = sample();
    let err = encode_surface(&s, EncodeFormat::Jpeg { quality: 0 }, ColorMode::Rgb).unwrap_err();
    assert!(matches!(err, FilmError::Validation(_)));
}

#[test]
fn data_url_carries_the_mime() {
    let enc = encode_surface(&sample(), EncodeFormat::WebpLossless, ColorMode::Rgb).unwrap();
    assert!(enc.to_data_url().starts_with("data:image/webp;base64,"));
    assert!(format!("{enc:?}").contains("bytes_len"));
}

#[test]
fn format_serde_is_tagged() {
    let json = serde_json::to_string(&EncodeFormat::Jpeg { quality: 90 }).unwrap();
    assert_eq!(json, r#"{"kind":"jpeg","quality":90}"#);
    let back: EncodeFormat = serde_json::from_str(r#"{"kind":"webp_lossless"}"#).unwrap();
    assert_eq!(back, EncodeFormat::WebpLossless);
}
