use super::*;

fn typesetter() -> Option<Typesetter> {
    match Typesetter::system() {
        Ok(Some(t)) => Some(t),
        _ => {
            eprintln!("skipping: no system font found (set {FONT_ENV})");
            None
        }
    }
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let err = Typesetter::from_bytes(b"not a font".to_vec()).unwrap_err();
    assert!(matches!(err, FilmError::Validation(_)));
}

#[test]
fn missing_font_file_is_a_validation_error() {
    let err = Typesetter::from_path(Path::new("/nonexistent/filmgrid/font.ttf")).unwrap_err();
    assert!(matches!(err, FilmError::Validation(_)));
}

#[test]
fn width_grows_with_size_and_length() {
    let Some(mut t) = typesetter() else { return };
    assert!(!t.family().trim().is_empty());
    let small = t.text_width("LISBON", 100.0).unwrap();
    let large = t.text_width("LISBON", 200.0).unwrap();
    let longer = t.text_width("LISBON PORTUGAL", 100.0).unwrap();
    assert!(small > 0.0);
    assert!(large > small * 1.8);
    assert!(longer > small);
}

#[test]
fn invalid_size_is_rejected() {
    let Some(mut t) = typesetter() else { return };
    assert!(t.measure("x", 0.0).is_err());
    assert!(t.measure("x", f32::NAN).is_err());
}

#[test]
fn draw_line_paints_inside_its_box_only() {
    let Some(mut t) = typesetter() else { return };
    let mut s = Surface::filled(400, 120, Rgba8::rgb(0, 0, 0)).unwrap();
    let ext = t
        .draw_line(
            &mut s,
            "FILM",
            &TextStyle::new(64.0, Rgba8::rgb(255, 255, 255)),
            20.0,
            10.0,
        )
        .unwrap();
    assert!(ext.width > 0.0 && ext.height > 0.0);
    let lit = |x0: u32, x1: u32| {
        (x0..x1).any(|x| (0..s.height()).any(|y| s.pixel(x, y)[0] > 0))
    };
    assert!(lit(20, 20 + ext.width.ceil() as u32));
    assert!(!lit(0, 19));
    assert!(!lit(22 + ext.width.ceil() as u32, 400));
}

#[test]
fn right_alignment_ends_at_anchor() {
    let Some(mut t) = typesetter() else { return };
    let mut s = Surface::filled(400, 100, Rgba8::rgb(0, 0, 0)).unwrap();
    let ext = t
        .draw_line(
            &mut s,
            "2026",
            &TextStyle::new(48.0, Rgba8::rgb(255, 255, 255)).aligned(TextAlign::Right),
            380.0,
            0.0,
        )
        .unwrap();
    assert!((ext.bounds.x1 - 380.0).abs() < 1e-3);
    assert!((ext.bounds.width() - f64::from(ext.width)).abs() < 1e-3);
    assert!((381..400).all(|x| (0..100).all(|y| s.pixel(x, y)[0] == 0)));
}

#[test]
fn empty_text_draws_nothing() {
    let Some(mut t) = typesetter() else { return };
    let mut s = Surface::filled(32, 32, Rgba8::rgb(5, 5, 5)).unwrap();
    let before = s.clone();
    t.draw_line(&mut s, "", &TextStyle::new(20.0, Rgba8::rgb(255, 0, 0)), 0.0, 0.0)
        .unwrap();
    assert_eq!(before.data(), s.data());
}
