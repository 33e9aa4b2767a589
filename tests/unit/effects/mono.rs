use super::*;

#[test]
fn luma_collapse_equalizes_channels() {
    let mut data = vec![255u8, 0, 0, 255, 0, 255, 0, 255, 12, 34, 56, 200];
    enforce_grayscale(&mut data);
    assert!(is_grayscale(&data));
    assert_eq!(data[0], 76);
    assert_eq!(data[4], 150);
    assert_eq!(data[11], 200);
}

#[test]
fn luma_collapse_is_idempotent() {
    let mut data: Vec<u8> = (0..=255u8).flat_map(|v| [v, v / 2, 255 - v, 255]).collect();
    enforce_grayscale(&mut data);
    let once = data.clone();
    enforce_grayscale(&mut data);
    assert_eq!(data, once);
}

#[test]
fn contrast_stretch_keeps_mid_gray_and_clamps() {
    let mut data = vec![128u8, 0, 255, 255, 100, 160, 128, 255];
    contrast_stretch(&mut data, 1.6);
    assert_eq!(data[0], 128);
    assert_eq!(data[1], 0);
    assert_eq!(data[2], 255);
    assert!(data[4] < 100);
    assert!(data[5] > 160);
}

#[test]
fn grayscale_with_contrast_yields_gray() {
    let mut data = vec![200u8, 40, 90, 255, 10, 220, 130, 255];
    grayscale_with_contrast(&mut data, 1.2);
    assert!(is_grayscale(&data));
}

#[test]
fn color_is_not_grayscale() {
    assert!(!is_grayscale(&[1, 2, 3, 255]));
    assert!(is_grayscale(&[]));
}
