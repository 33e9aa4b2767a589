use std::io::Cursor;

use super::*;
use crate::geometry::grid::Quadrant;

fn png(w: u32, h: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb(rgb));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn close(a: [u8; 4], b: Rgba8, tol: i16) -> bool {
    (0..3).all(|c| (i16::from(a[c]) - i16::from(b.to_array()[c])).abs() <= tol)
}

#[test]
fn wrong_frame_count_fails_before_decoding() {
    let garbage: Vec<Vec<u8>> = vec![b"x".to_vec(); 3];
    let err = stitch_burst(&garbage, &StitchOptions::default(), None, None).unwrap_err();
    assert!(matches!(err, FilmError::InvalidInput(_)), "{err}");
    let five: Vec<Vec<u8>> = vec![b"x".to_vec(); 5];
    assert!(matches!(
        stitch_burst(&five, &StitchOptions::default(), None, None).unwrap_err(),
        FilmError::InvalidInput(_)
    ));
}

#[test]
fn decode_failure_names_the_frame() {
    let mut frames = vec![png(32, 32, [255, 0, 0]); 4];
    frames[2] = b"broken".to_vec();
    let err = stitch_burst(&frames, &StitchOptions::default(), None, None).unwrap_err();
    match err {
        FilmError::Decode(msg) => assert!(msg.starts_with("frame 2:"), "{msg}"),
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn frames_land_in_capture_order_on_the_matte() {
    let colors = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 0]];
    let frames: Vec<Vec<u8>> = colors.iter().map(|c| png(100, 100, *c)).collect();
    let opts = StitchOptions::default();
    let sheet = stitch_burst(&frames, &opts, None, None).unwrap();
    let g = sheet.geometry;
    assert_eq!(g.tile, 100);
    assert_eq!(sheet.surface.dimensions(), (212, 212));
    assert_eq!((sheet.encoded.width, sheet.encoded.height), (212, 212));
    assert_eq!(sheet.encoded.mime(), "image/jpeg");
    for q in Quadrant::ALL {
        let r = g.quadrant(q);
        let px = sheet.surface.pixel(r.x + r.w / 2, r.y + r.h / 2);
        let [red, green, blue] = colors[q.index()];
        assert_eq!(px, [red, green, blue, 255]);
    }
    assert_eq!(sheet.surface.pixel(1, 1), opts.matte.to_array());
    // Gap column between TL and TR.
    let gap_x = g.quadrant(Quadrant::TopLeft).right();
    assert_eq!(sheet.surface.pixel(gap_x, 50), opts.matte.to_array());
}

#[test]
fn tile_is_the_smallest_edge_capped_by_max_tile() {
    let frames = vec![
        png(300, 200, [9, 9, 9]),
        png(250, 250, [9, 9, 9]),
        png(400, 260, [9, 9, 9]),
        png(220, 500, [9, 9, 9]),
    ];
    let sheet = stitch_burst(&frames, &StitchOptions::default(), None, None).unwrap();
    assert_eq!(sheet.geometry.tile, 200);

    let opts = StitchOptions {
        max_tile: 64,
        ..StitchOptions::default()
    };
    let sheet = stitch_burst(&frames, &opts, None, None).unwrap();
    assert_eq!(sheet.geometry.tile, 64);
    assert_eq!(sheet.surface.width(), sheet.geometry.canvas_width());
}

#[test]
fn non_square_frames_are_center_cropped() {
    let mut wide = Surface::filled(300, 100, Rgba8::rgb(0, 0, 255)).unwrap();
    wide.fill_rect(RectPx::new(100, 0, 100, 100), Rgba8::rgb(255, 0, 0))
        .unwrap();
    let frames = vec![wide.clone(), wide.clone(), wide.clone(), wide];
    let sheet = stitch_surfaces(&frames, &StitchOptions::default(), None, None).unwrap();
    let r = sheet.geometry.quadrant(Quadrant::BottomRight);
    assert!(close(sheet.surface.pixel(r.x + 2, r.y + 50), Rgba8::rgb(255, 0, 0), 2));
    assert!(close(sheet.surface.pixel(r.right() - 3, r.y + 50), Rgba8::rgb(255, 0, 0), 2));
}

#[test]
fn separators_outline_each_frame() {
    let frames = vec![Surface::filled(200, 200, Rgba8::rgb(200, 200, 200)).unwrap(); 4];
    let opts = StitchOptions {
        separators: true,
        ..StitchOptions::default()
    };
    let sheet = stitch_surfaces(&frames, &opts, None, None).unwrap();
    let r = sheet.geometry.quadrant(Quadrant::TopLeft);
    assert_eq!(sheet.surface.pixel(r.x - 1, r.y + 10), opts.separator_color.to_array());
    assert_eq!(sheet.surface.pixel(r.x + 10, r.bottom()), opts.separator_color.to_array());
    assert_eq!(sheet.surface.pixel(r.x, r.y), [200, 200, 200, 255]);
}

#[test]
fn bannered_sheet_has_bands_and_needs_a_typesetter_for_text() {
    let frames = vec![Surface::filled(100, 100, Rgba8::rgb(50, 60, 70)).unwrap(); 4];
    let opts = StitchOptions {
        variant: GridVariant::Bannered,
        ..StitchOptions::default()
    };
    let sheet = stitch_surfaces(&frames, &opts, None, None).unwrap();
    assert_eq!(sheet.surface.dimensions(), (224, 224 + 30 + 40));
    let tl = sheet.geometry.quadrant(Quadrant::TopLeft);
    assert_eq!(tl.y, 30 + 10);

    let banner = BannerText::default();
    let err = stitch_surfaces(&frames, &opts, Some(&banner), None).unwrap_err();
    assert!(matches!(err, FilmError::Validation(_)));
}

#[test]
fn banner_text_is_ignored_for_the_simple_variant() {
    let frames = vec![Surface::filled(64, 64, Rgba8::rgb(1, 2, 3)).unwrap(); 4];
    let banner = BannerText {
        location: Some("Porto".into()),
        ..BannerText::default()
    };
    let sheet = stitch_surfaces(&frames, &StitchOptions::default(), Some(&banner), None).unwrap();
    assert_eq!(sheet.geometry.header, 0);
}

#[test]
fn banner_text_is_drawn_with_a_font() {
    let Ok(Some(mut ts)) = Typesetter::system() else {
        eprintln!("skipping: no system font");
        return;
    };
    let frames = vec![Surface::filled(400, 400, Rgba8::rgb(40, 40, 40)).unwrap(); 4];
    let opts = StitchOptions {
        variant: GridVariant::Bannered,
        ..StitchOptions::default()
    };
    let banner = BannerText {
        location: Some("LISBOA".into()),
        coordinates: Some("38.72, -9.14".into()),
        date: Some("2026.10.19".into()),
    };
    let sheet = stitch_surfaces(&frames, &opts, Some(&banner), Some(&mut ts)).unwrap();
    let head = sheet.geometry.header_rect();
    let inked = (head.x..head.right())
        .flat_map(|x| (head.y..head.bottom()).map(move |y| (x, y)))
        .any(|(x, y)| sheet.surface.pixel(x, y) != opts.matte.to_array());
    assert!(inked);
}

#[test]
fn options_validate_ranges() {
    assert!(StitchOptions::default().validate().is_ok());
    for bad in [
        StitchOptions {
            max_tile: 32,
            ..StitchOptions::default()
        },
        StitchOptions {
            max_tile: 2000,
            ..StitchOptions::default()
        },
        StitchOptions {
            jpeg_quality: 70,
            ..StitchOptions::default()
        },
    ] {
        assert!(matches!(bad.validate().unwrap_err(), FilmError::Validation(_)));
    }
}
