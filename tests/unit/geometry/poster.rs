use super::*;

#[test]
fn canonical_layout_stacks_top_to_bottom() {
    let l = PosterLayout::canonical();
    assert_eq!((l.width, l.height), (2400, 3600));
    assert!(l.label_top + (l.label_size as u32) < l.title_top);
    assert!(l.title_top + l.title_band <= l.image_slot.y);
    assert!(l.image_slot.bottom() < l.divider.y);
    assert!(l.divider.bottom() < l.footer_label_top);
    assert!(l.footer_value_top + (l.footer_value_size as u32) < l.height);
    assert!(l.image_slot.fits_in(l.width, l.height));
    assert_eq!(l.image_slot.w, l.image_slot.h);
    assert_eq!(l.image_slot.w, l.content_width());
    let title = l.title_rect();
    assert_eq!((title.x, title.w), (l.margin, l.content_width()));
    assert!(title.bottom() <= l.image_slot.y);
}

#[test]
fn scaling_to_full_width_is_identity() {
    assert_eq!(PosterLayout::scaled(POSTER_WIDTH), PosterLayout::canonical());
}

#[test]
fn scaled_layout_keeps_even_dimensions_and_slot_inside() {
    for w in [1080u32, 1081, 720, 333] {
        let l = PosterLayout::scaled(w);
        assert_eq!(l.width % 2, 0);
        assert_eq!(l.height % 2, 0);
        assert!(l.image_slot.fits_in(l.width, l.height));
        assert!(!l.image_slot.is_empty());
    }
    let l = PosterLayout::scaled(1080);
    assert_eq!((l.width, l.height), (1080, 1620));
    assert_eq!(l.image_slot, RectPx::new(67, 315, 945, 945));
}
