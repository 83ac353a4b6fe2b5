// Tool session tests: overlay gestures, render plans and export requests

use bytes::Bytes;
use markplace::backend::{Document, PageInfo, PdfInfo, WireElement};
use markplace::geometry::{Point, Size};
use markplace::overlay::{CountingPointerHost, GestureKind, OverlayController, OverlayUpdate};
use markplace::preview::PreviewMode;
use markplace::session::{WatermarkEvent, WatermarkSession};
use markplace::watermark::{Layout, WatermarkError, WatermarkSpec};

fn info(pages: &[(f64, f64)]) -> PdfInfo {
    PdfInfo {
        page_count: pages.len(),
        pages: pages
            .iter()
            .enumerate()
            .map(|(i, &(width, height))| PageInfo {
                index: Some(i),
                width,
                height,
            })
            .collect(),
        ..PdfInfo::default()
    }
}

fn loaded(spec: WatermarkSpec, pages: &[(f64, f64)]) -> WatermarkSession {
    WatermarkSession::new(spec).apply(WatermarkEvent::DocumentLoaded {
        document: Document::new("report.pdf", Bytes::from_static(b"%PDF-1.7")),
        info: info(pages),
    })
}

#[test]
fn test_drag_gesture_moves_watermark() {
    // Test: a 10px drag on a half-size preview moves the watermark 20 PDF units
    let session = loaded(WatermarkSpec::text("DRAFT"), &[(612.0, 792.0)]);
    let host = CountingPointerHost::new();
    let mut overlay = OverlayController::new(host.clone());

    let preview = Size::new(306.0, 396.0);
    overlay
        .begin_drag_on(
            Point::new(153.0, 198.0),
            session.position().unwrap(),
            &session.page_geometry().unwrap(),
            preview,
        )
        .unwrap();
    let update = overlay.pointer_move(Point::new(163.0, 188.0)).unwrap();
    assert_eq!(overlay.pointer_up().unwrap(), GestureKind::Dragging);
    assert_eq!(host.attached(), 0);

    let session = session.apply(WatermarkEvent::Overlay(update));
    assert_eq!(session.position(), Some(Point::new(326.0, 376.0)));

    let style = session.overlay_style(preview).unwrap();
    assert_eq!(style.center, Point::new(163.0, 188.0));
}

#[test]
fn test_rotate_and_resize_update_spec() {
    let session = loaded(WatermarkSpec::text("DRAFT"), &[(612.0, 792.0)]);
    let mut overlay = OverlayController::new(CountingPointerHost::new());

    // Pointer straight right of center: atan2 = 0, plus the handle offset
    overlay
        .begin_rotate(Point::new(0.0, 0.0), Point::new(100.0, 100.0))
        .unwrap();
    let rotated = overlay.pointer_move(Point::new(200.0, 100.0)).unwrap();
    assert_eq!(rotated, OverlayUpdate::Rotated(90.0));
    overlay.pointer_up().unwrap();

    overlay
        .begin_scale(Point::new(0.0, 0.0), session.spec())
        .unwrap();
    let resized = overlay.pointer_move(Point::new(-500.0, -500.0)).unwrap();
    assert_eq!(resized, OverlayUpdate::FontSize(10));
    overlay.cancel();

    let session = session
        .apply(WatermarkEvent::Overlay(rotated))
        .apply(WatermarkEvent::Overlay(resized));
    assert_eq!(session.spec().rotation_degrees, 90.0);
    assert_eq!(session.spec().text_attributes().unwrap().font_size, 10);
}

#[test]
fn test_single_layout_previews_clean_page() {
    let session = loaded(WatermarkSpec::text("DRAFT"), &[(612.0, 792.0)]);
    let plan = session.preview_plan().unwrap();
    assert_eq!(plan.mode, PreviewMode::Clean);

    // Moving the overlay keeps the plan identical: no re-render needed
    let moved = session
        .clone()
        .apply(WatermarkEvent::PositionChanged(Point::new(10.0, 10.0)));
    assert!(plan.satisfies(&moved.preview_plan().unwrap()));
}

#[test]
fn test_tiled_layout_previews_engine_render() {
    let session = loaded(
        WatermarkSpec::text("DRAFT").with_layout(Layout::Tiled),
        &[(612.0, 792.0), (612.0, 792.0)],
    )
    .apply(WatermarkEvent::PageSelected(1));

    let plan = session.preview_plan().unwrap();
    assert_eq!(plan.mode, PreviewMode::Watermarked);
    assert_eq!(plan.page_index, 1);
    assert_eq!(plan.request.modifiers.pages().collect::<Vec<_>>(), vec![1]);
    assert!(session.overlay_style(Size::new(306.0, 396.0)).is_none());
}

#[test]
fn test_export_replicates_selected_page_to_all_pages() {
    let session = loaded(
        WatermarkSpec::text("DRAFT").with_layout(Layout::Grid3x3),
        &[(600.0, 900.0), (600.0, 900.0), (600.0, 900.0)],
    );
    let request = session.export_request().unwrap();

    assert_eq!(request.modifiers.page_count(), 3);
    assert_eq!(request.modifiers.element_count(), 27);
    let first = request.modifiers.get(0).unwrap();
    assert_eq!(first, request.modifiers.get(2).unwrap());
    assert_eq!(first[0].position(), (100.0, 150.0));
    assert!(request.watermark_image.is_none());
}

#[test]
fn test_page_change_recenters_only_when_geometry_changes() {
    let session = loaded(
        WatermarkSpec::text("DRAFT"),
        &[(612.0, 792.0), (612.0, 792.0), (842.0, 595.0)],
    )
    .apply(WatermarkEvent::PositionChanged(Point::new(50.0, 60.0)));

    let same = session.clone().apply(WatermarkEvent::PageSelected(1));
    assert_eq!(same.position(), Some(Point::new(50.0, 60.0)));

    let landscape = session.apply(WatermarkEvent::PageSelected(2));
    assert_eq!(landscape.position(), Some(Point::new(421.0, 297.5)));
}

#[test]
fn test_image_watermark_needs_upload_before_export() {
    let session = loaded(WatermarkSpec::image(400.0, 200.0), &[(612.0, 792.0)]);
    assert!(matches!(
        session.export_request(),
        Err(WatermarkError::NotReady(_))
    ));

    let session = session.apply(WatermarkEvent::ImageLoaded {
        image: Bytes::from_static(b"\x89PNG"),
        natural_width: 400.0,
        natural_height: 200.0,
    });
    let request = session.export_request().unwrap();
    assert!(request.watermark_image.is_some());
    assert!(matches!(
        request.modifiers.get(0).unwrap()[0],
        WireElement::Image(_)
    ));
}

#[test]
fn test_unknown_geometry_blocks_plans() {
    let session = WatermarkSession::new(WatermarkSpec::text("DRAFT")).apply(
        WatermarkEvent::DocumentInfoFailed {
            document: Document::new("broken.pdf", Bytes::from_static(b"%PDF")),
        },
    );
    assert!(session.position().is_none());
    assert!(session.preview_plan().is_none());
    assert!(session.export_request().is_err());
}
