use super::*;

#[test]
fn identity_tone_is_noop() {
    let src: Vec<u8> = vec![0, 64, 128, 255, 12, 250, 99, 255];
    let mut data = src.clone();
    apply_tone(&mut data, &ToneParams::default());
    assert_eq!(data, src);
}

#[test]
fn zero_saturation_produces_equal_channels() {
    let mut data = vec![255u8, 0, 0, 255, 10, 200, 90, 255];
    apply_tone(
        &mut data,
        &ToneParams {
            contrast: 1.2,
            saturation: 0.0,
            brightness: 1.05,
        },
    );
    for px in data.chunks_exact(4) {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(px[3], 255);
    }
}

#[test]
fn contrast_pushes_values_away_from_mid_gray() {
    let mut data = vec![100u8, 150, 128, 255];
    apply_tone(
        &mut data,
        &ToneParams {
            contrast: 1.5,
            ..ToneParams::default()
        },
    );
    assert!(data[0] < 100);
    assert!(data[1] > 150);
    assert!((i16::from(data[2]) - 128).abs() <= 1);
}

#[test]
fn brightness_scales_linearly() {
    let mut data = vec![100u8, 200, 0, 255];
    apply_tone(
        &mut data,
        &ToneParams {
            brightness: 1.1,
            ..ToneParams::default()
        },
    );
    assert_eq!(data, vec![110, 220, 0, 255]);
}

#[test]
fn overlay_tints_every_pixel_equally() {
    let mut data = [20u8, 20, 20, 255].repeat(3);
    apply_overlay(
        &mut data,
        &ColorOverlay {
            color: Rgba8::rgb(255, 160, 100),
            blend: BlendMode::Screen,
            opacity: 0.1,
        },
    );
    assert!(data[0] > data[1] && data[1] > data[2]);
    assert_eq!(&data[0..4], &data[4..8]);
}
