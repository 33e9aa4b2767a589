use super::*;
use crate::foundation::core::{RectPx, Rgba8};

#[test]
fn glow_never_darkens() {
    let mut s = Surface::filled(64, 64, Rgba8::rgb(30, 30, 30)).unwrap();
    s.fill_rect(RectPx::new(24, 24, 16, 16), Rgba8::rgb(240, 240, 240))
        .unwrap();
    let before = s.clone();
    apply_glow(&mut s, 0.25).unwrap();
    for (a, b) in before.data().iter().zip(s.data()) {
        assert!(b >= a);
    }
    assert_ne!(before.data(), s.data());
}

#[test]
fn glow_bleeds_light_past_edges() {
    let mut s = Surface::filled(64, 64, Rgba8::rgb(0, 0, 0)).unwrap();
    s.fill_rect(RectPx::new(24, 24, 16, 16), Rgba8::rgb(255, 255, 255))
        .unwrap();
    apply_glow(&mut s, 0.2).unwrap();
    assert!(s.pixel(22, 32)[0] > 0);
    assert_eq!(s.pixel(0, 0)[0], 0);
}

#[test]
fn zero_alpha_is_noop() {
    let mut s = Surface::filled(16, 16, Rgba8::rgb(10, 120, 200)).unwrap();
    let before = s.clone();
    apply_glow(&mut s, 0.0).unwrap();
    assert_eq!(before.data(), s.data());
}
