use super::*;

#[test]
fn simple_tile_800_matches_the_documented_canvas() {
    let g = GridGeometry::from_tile(800, GridVariant::Simple);
    assert_eq!((g.padding, g.gap, g.header, g.footer), (40, 16, 0, 0));
    assert_eq!(g.canvas_width(), 1696);
    assert_eq!(g.canvas_height(), 1696);
    assert_eq!(g.quadrant(Quadrant::TopLeft), RectPx::new(40, 40, 800, 800));
    assert_eq!(
        g.quadrant(Quadrant::BottomRight),
        RectPx::new(856, 856, 800, 800)
    );
}

#[test]
fn bannered_offsets_quadrants_by_header() {
    let g = GridGeometry::from_tile(800, GridVariant::Bannered);
    assert_eq!((g.padding, g.gap, g.header, g.footer), (80, 32, 240, 320));
    assert_eq!(g.canvas_width(), 1792);
    assert_eq!(g.canvas_height(), 1792 + 240 + 320);
    assert_eq!(g.quadrant(Quadrant::TopLeft), RectPx::new(80, 320, 800, 800));
    assert_eq!(g.footer_rect().y, 240 + 1792);
    assert_eq!(g.footer_rect().bottom(), g.canvas_height());
}

#[test]
fn width_divisors_match_the_ratio_table() {
    assert_eq!(SIMPLE_RATIOS.width_divisor_permille(), 2120);
    assert_eq!(BANNERED_RATIOS.width_divisor_permille(), 2240);
}

#[test]
fn quadrants_tile_the_content_region_for_all_widths() {
    for variant in [GridVariant::Simple, GridVariant::Bannered] {
        for width in (8..4000).step_by(7) {
            let g = compute_grid_geometry(width, variant);
            if g.is_degenerate() {
                continue;
            }
            assert!(g.canvas_width() <= width);

            let q = g.quadrants;
            for r in &q {
                assert_eq!((r.w, r.h), (g.tile, g.tile));
            }
            for i in 0..4 {
                for j in (i + 1)..4 {
                    assert!(!q[i].intersects(q[j]), "overlap at width {width}");
                }
            }
            // Horizontal and vertical gaps are exactly G.
            assert_eq!(q[1].x - q[0].right(), g.gap);
            assert_eq!(q[2].y - q[0].bottom(), g.gap);
            assert_eq!(q[3].x, q[1].x);
            assert_eq!(q[3].y, q[2].y);

            let content = g.content_rect();
            assert_eq!(content.x, q[0].x);
            assert_eq!(content.y, q[0].y);
            assert_eq!(content.right(), q[3].right());
            assert_eq!(content.bottom(), q[3].bottom());
            assert_eq!(
                content.area(),
                4 * u64::from(g.tile) * u64::from(g.tile)
                    + 2 * u64::from(g.gap) * u64::from(2 * g.tile + g.gap)
                    - u64::from(g.gap) * u64::from(g.gap)
            );
            assert!(q[3].fits_in(g.canvas_width(), g.canvas_height()));
        }
    }
}

#[test]
fn geometry_round_trips_through_canvas_width() {
    for variant in [GridVariant::Simple, GridVariant::Bannered] {
        for tile in 1..1200 {
            let g = GridGeometry::from_tile(tile, variant);
            assert_eq!(compute_grid_geometry(g.canvas_width(), variant), g);
        }
    }
}

#[test]
fn largest_tile_is_chosen() {
    let g = compute_grid_geometry(1000, GridVariant::Simple);
    let next = GridGeometry::from_tile(g.tile + 1, GridVariant::Simple);
    assert!(g.canvas_width() <= 1000);
    assert!(next.canvas_width() > 1000);
}

#[test]
fn tiny_widths_are_degenerate_not_errors() {
    let g = compute_grid_geometry(1, GridVariant::Simple);
    assert!(g.is_degenerate());
    assert!(!g.fits_within(1, 1));
}

#[test]
fn quadrant_indices_follow_capture_order() {
    for (i, q) in Quadrant::ALL.iter().enumerate() {
        assert_eq!(q.index(), i);
        assert_eq!(Quadrant::from_index(i), Some(*q));
    }
    assert_eq!(Quadrant::from_index(4), None);
}
