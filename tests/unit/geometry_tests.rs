// Geometry kernel tests: coordinate mapping and rotated extents

use markplace::geometry::{
    normalize_degrees, pdf_to_pixel, pixel_to_pdf, project_rotated_extent, PageGeometry, Point,
    PreviewTransform, Size,
};
use rstest::rstest;

const EPS: f64 = 1e-9;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

#[rstest]
#[case(PageGeometry::new(612.0, 792.0), Size::new(600.0, 776.0))]
#[case(PageGeometry::new(595.0, 842.0), Size::new(1190.0, 1684.0))]
#[case(PageGeometry::new(1000.0, 500.0), Size::new(333.0, 177.0))]
#[case(PageGeometry::new(612.0, 792.0).with_origin(Point::new(18.0, 36.0)), Size::new(480.0, 620.0))]
fn test_pixel_round_trip(#[case] page: PageGeometry, #[case] preview: Size) {
    // Test: mapping a point to pixels and back returns the original point
    for point in [
        Point::new(0.0, 0.0),
        Point::new(page.width / 3.0, page.height / 7.0),
        Point::new(page.width, page.height),
    ] {
        let pixel = pdf_to_pixel(point, &page, preview).unwrap();
        let back = pixel_to_pdf(pixel, &page, preview).unwrap();
        assert!(close(back.x, point.x), "x drifted: {} -> {}", point.x, back.x);
        assert!(close(back.y, point.y), "y drifted: {} -> {}", point.y, back.y);
    }
}

#[test]
fn test_page_center_maps_to_preview_center() {
    let page = PageGeometry::new(612.0, 792.0);
    let preview = Size::new(306.0, 396.0);
    let pixel = pdf_to_pixel(page.center(), &page, preview).unwrap();
    assert_eq!(pixel, Point::new(153.0, 198.0));
}

#[rstest]
#[case(Size::new(0.0, 100.0))]
#[case(Size::new(100.0, -1.0))]
#[case(Size::new(f64::NAN, 100.0))]
#[case(Size::new(100.0, f64::INFINITY))]
fn test_invalid_preview_is_not_ready(#[case] preview: Size) {
    let page = PageGeometry::new(612.0, 792.0);
    assert!(PreviewTransform::new(page, preview).is_none());
    assert!(pdf_to_pixel(Point::zero(), &page, preview).is_none());
}

#[test]
fn test_invalid_page_is_not_ready() {
    let preview = Size::new(600.0, 800.0);
    assert!(PreviewTransform::new(PageGeometry::new(0.0, 792.0), preview).is_none());
    assert!(pixel_to_pdf(Point::zero(), &PageGeometry::new(612.0, 0.0), preview).is_none());
}

#[rstest]
#[case(30.0)]
#[case(45.0)]
#[case(90.0)]
#[case(137.5)]
fn test_extent_ignores_rotation_sign(#[case] degrees: f64) {
    // Test: θ and -θ give the same projected extent
    let positive = project_rotated_extent(240.0, 50.0, degrees);
    let negative = project_rotated_extent(240.0, 50.0, -degrees);
    assert!(close(positive.width, negative.width));
    assert!(close(positive.height, negative.height));
}

#[test]
fn test_extent_at_quarter_turn_swaps_sides() {
    let extent = project_rotated_extent(240.0, 50.0, 90.0);
    assert!((extent.width - 50.0).abs() < 1e-6);
    assert!((extent.height - 240.0).abs() < 1e-6);
}

#[rstest]
#[case(0.0, 0.0)]
#[case(360.0, 0.0)]
#[case(-90.0, 270.0)]
#[case(725.0, 5.0)]
#[case(f64::NAN, 0.0)]
fn test_normalize_degrees(#[case] input: f64, #[case] expected: f64) {
    let normalized = normalize_degrees(input);
    assert!((0.0..360.0).contains(&normalized));
    assert!(close(normalized, expected));
}
