use super::*;

#[test]
fn overlay_with_mid_gray_is_identity() {
    let lut = BlendLut::new(BlendMode::Overlay);
    for d in [0u8, 17, 64, 127, 128, 200, 255] {
        let out = lut.get(128, d);
        assert!((i16::from(out) - i16::from(d)).abs() <= 1, "d={d} out={out}");
    }
}

#[test]
fn screen_never_darkens() {
    let lut = BlendLut::new(BlendMode::Screen);
    for s in (0..=255u8).step_by(15) {
        for d in (0..=255u8).step_by(15) {
            assert!(lut.get(s, d) >= d);
        }
    }
}

#[test]
fn opacity_zero_is_noop() {
    let mut dst = vec![10u8, 20, 30, 255];
    let src = vec![255u8, 255, 255, 255];
    composite_in_place(&mut dst, &src, 0.0, BlendMode::Screen).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn normal_full_opacity_replaces_color_and_keeps_alpha() {
    let mut dst = vec![10u8, 20, 30, 255];
    let src = vec![200u8, 100, 50, 255];
    composite_in_place(&mut dst, &src, 1.0, BlendMode::Normal).unwrap();
    assert_eq!(dst, vec![200, 100, 50, 255]);
}

#[test]
fn transparent_source_pixels_are_skipped() {
    let mut dst = vec![10u8, 20, 30, 255];
    let src = vec![200u8, 100, 50, 0];
    composite_in_place(&mut dst, &src, 1.0, BlendMode::Multiply).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn mismatched_buffers_fail() {
    let mut dst = vec![0u8; 8];
    assert!(composite_in_place(&mut dst, &[0u8; 4], 1.0, BlendMode::Normal).is_err());
}

#[test]
fn color_overlay_tints_toward_color() {
    let mut dst = vec![0u8, 0, 0, 255];
    composite_color_in_place(&mut dst, Rgba8::rgb(255, 128, 0), 0.5, BlendMode::Screen);
    assert_eq!(dst, vec![128, 64, 0, 255]);
}
