use super::*;

fn gradient(w: u32, h: u32) -> Surface {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[x as u8, y as u8, (x + y) as u8, 255]);
        }
    }
    Surface::from_raw(w, h, data).unwrap()
}

#[test]
fn zero_sized_surfaces_are_rejected() {
    assert!(Surface::filled(0, 4, Rgba8::rgb(0, 0, 0)).is_err());
    assert!(Surface::filled(MAX_SURFACE_EDGE + 1, 1, Rgba8::rgb(0, 0, 0)).is_err());
    assert!(Surface::from_raw(2, 2, vec![0; 15]).is_err());
}

#[test]
fn crop_then_blit_round_trips() {
    let src = gradient(16, 12);
    let rect = RectPx::new(3, 2, 5, 4);
    let piece = src.crop(rect).unwrap();
    assert_eq!(piece.dimensions(), (5, 4));
    assert_eq!(piece.pixel(0, 0), src.pixel(3, 2));
    assert_eq!(piece.pixel(4, 3), src.pixel(7, 5));

    let mut dst = Surface::filled(16, 12, Rgba8::rgb(0, 0, 0)).unwrap();
    dst.blit(&piece, 3, 2).unwrap();
    assert_eq!(dst.crop(rect).unwrap(), piece);
    assert_eq!(dst.pixel(0, 0), [0, 0, 0, 255]);
}

#[test]
fn out_of_bounds_rects_fail() {
    let src = gradient(8, 8);
    assert!(src.crop(RectPx::new(4, 4, 5, 1)).is_err());
    assert!(src.crop(RectPx::new(0, 0, 0, 1)).is_err());
    let mut dst = gradient(4, 4);
    assert!(dst.blit(&src, 0, 0).is_err());
}

#[test]
fn fill_rect_only_touches_rect() {
    let mut s = Surface::filled(6, 6, Rgba8::rgb(1, 2, 3)).unwrap();
    s.fill_rect(RectPx::new(1, 1, 2, 2), Rgba8::rgb(200, 0, 0))
        .unwrap();
    assert_eq!(s.pixel(1, 1), [200, 0, 0, 255]);
    assert_eq!(s.pixel(2, 2), [200, 0, 0, 255]);
    assert_eq!(s.pixel(3, 3), [1, 2, 3, 255]);
}

#[test]
fn cover_fit_center_crops_wide_input() {
    let mut s = Surface::filled(30, 10, Rgba8::rgb(0, 0, 255)).unwrap();
    s.fill_rect(RectPx::new(10, 0, 10, 10), Rgba8::rgb(255, 0, 0))
        .unwrap();
    let out = s.cover_fit(10, 10, FilterType::Nearest).unwrap();
    assert_eq!(out.dimensions(), (10, 10));
    assert!(out.data().chunks_exact(4).all(|p| p == [255, 0, 0, 255]));
}

#[test]
fn composite_premul_blends_and_clips() {
    let mut s = Surface::filled(2, 1, Rgba8::rgb(0, 0, 0)).unwrap();
    // 50% white, premultiplied, hanging one pixel off the right edge.
    let src = [128u8, 128, 128, 128, 128, 128, 128, 128];
    s.composite_premul_at(&src, 2, 1, 1, 0).unwrap();
    assert_eq!(s.pixel(0, 0), [0, 0, 0, 255]);
    assert_eq!(s.pixel(1, 0), [128, 128, 128, 255]);
}
