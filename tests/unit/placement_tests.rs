// Placement generation tests: single, 3x3 grid and tiled layouts

use markplace::backend::{PageModifiers, WireElement};
use markplace::geometry::{PageGeometry, Point};
use markplace::watermark::{
    generate_placements, tiled_grid, Density, Layout, Placement, WatermarkSpec,
};
use rstest::rstest;

fn tiled(density: Density) -> WatermarkSpec {
    WatermarkSpec::text("CONFIDENTIAL")
        .with_layout(Layout::Tiled)
        .with_density(density)
}

#[test]
fn test_grid_on_square_page() {
    let spec = WatermarkSpec::text("DRAFT").with_layout(Layout::Grid3x3);
    let set = generate_placements(&spec, &PageGeometry::new(300.0, 300.0), None);

    let expected: Vec<Placement> = [50.0, 150.0, 250.0]
        .iter()
        .flat_map(|&x| [50.0, 150.0, 250.0].map(|y| Placement::new(x, y)))
        .collect();
    assert_eq!(set.as_slice(), expected.as_slice());
}

#[test]
fn test_single_on_letter_page() {
    let set = generate_placements(
        &WatermarkSpec::default(),
        &PageGeometry::new(612.0, 792.0),
        None,
    );
    assert_eq!(set.as_slice(), &[Placement::new(306.0, 396.0)]);

    let set = generate_placements(
        &WatermarkSpec::default(),
        &PageGeometry::new(612.0, 792.0),
        Some(Point::new(100.0, 700.0)),
    );
    assert_eq!(set.as_slice(), &[Placement::new(100.0, 700.0)]);
}

#[test]
fn test_tiled_letter_moderate() {
    // Test: "CONFIDENTIAL" at 50pt rotated 45° on a letter page
    // width 300, height 50, extent ~247.49 x 247.49
    // moderate step 371.2 x 495.0 -> 1 column, 1 row
    let grid = tiled_grid(
        &PageGeometry::new(612.0, 792.0),
        tiled(Density::Moderate).projected_extent(),
        Density::Moderate,
    );
    assert_eq!((grid.cols, grid.rows), (1, 1));

    let set = generate_placements(
        &tiled(Density::Moderate),
        &PageGeometry::new(612.0, 792.0),
        None,
    );
    assert_eq!(set.as_slice(), &[Placement::new(306.0, 396.0)]);
}

#[test]
fn test_tiled_letter_dense() {
    // dense step 247.5 x 297.0 -> 2 columns, 2 rows
    let set = generate_placements(&tiled(Density::Dense), &PageGeometry::new(612.0, 792.0), None);
    assert_eq!(
        set.as_slice(),
        &[
            Placement::new(153.0, 198.0),
            Placement::new(153.0, 594.0),
            Placement::new(459.0, 198.0),
            Placement::new(459.0, 594.0),
        ]
    );
}

#[rstest]
#[case(100_000.0, 100_000.0)]
#[case(1.0, 1.0)]
#[case(0.0, 0.0)]
#[case(-50.0, 200.0)]
#[case(f64::INFINITY, f64::NAN)]
fn test_tiled_counts_stay_bounded(#[case] width: f64, #[case] height: f64) {
    for density in [Density::Loose, Density::Moderate, Density::Dense] {
        let spec = WatermarkSpec::text("x").with_layout(Layout::Tiled).with_density(density);
        let grid = tiled_grid(&PageGeometry::new(width, height), spec.projected_extent(), density);
        assert!((1..=15).contains(&grid.cols), "cols = {}", grid.cols);
        assert!((1..=20).contains(&grid.rows), "rows = {}", grid.rows);
    }
}

#[test]
fn test_tiled_step_has_floor() {
    let grid = tiled_grid(
        &PageGeometry::new(1000.0, 1000.0),
        WatermarkSpec::text("").projected_extent(),
        Density::Dense,
    );
    assert_eq!((grid.step_x, grid.step_y), (100.0, 100.0));
    assert_eq!((grid.cols, grid.rows), (10, 10));
}

#[rstest]
#[case(Layout::Single)]
#[case(Layout::Grid3x3)]
#[case(Layout::Tiled)]
fn test_placements_are_deterministic(#[case] layout: Layout) {
    let spec = WatermarkSpec::text("REPEAT").with_layout(layout).with_rotation(30.0);
    let page = PageGeometry::new(842.0, 595.0);
    assert_eq!(
        generate_placements(&spec, &page, None),
        generate_placements(&spec, &page, None)
    );
}

#[test]
fn test_wire_elements_carry_visual_attributes() {
    let spec = WatermarkSpec::text("DRAFT")
        .with_layout(Layout::Grid3x3)
        .with_opacity(0.5)
        .with_rotation(-30.0);
    let set = generate_placements(&spec, &PageGeometry::new(300.0, 300.0), None);
    let modifiers = PageModifiers::single_page(0, set.to_wire(&spec));

    let elements = modifiers.get(0).unwrap();
    assert_eq!(elements.len(), 9);
    match &elements[0] {
        WireElement::Text(text) => {
            assert_eq!(text.text, "DRAFT");
            assert_eq!((text.x, text.y), (50.0, 50.0));
            assert_eq!(text.angle, 330.0);
            assert_eq!(text.opacity, 0.5);
            assert_eq!(text.fontsize, 50);
            assert_eq!(text.fontname, "song");
        }
        other => panic!("Expected text element, got {:?}", other),
    }
}

#[test]
fn test_image_wire_elements_are_placeholders() {
    let spec = WatermarkSpec::image(400.0, 200.0).with_image_scale(0.25);
    let set = generate_placements(&spec, &PageGeometry::new(612.0, 792.0), None);
    let json = serde_json::to_value(set.to_wire(&spec)).unwrap();
    assert_eq!(json[0]["type"], "image");
    assert_eq!(json[0]["scale"], 0.25);
    assert_eq!(json[0]["isPlaceholder"], true);
}
