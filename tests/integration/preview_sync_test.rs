// Preview synchronizer tests on a paused clock
//
// The clock auto-advances whenever every task is idle, so sleeping in the
// test walks through debounce windows and mock render delays in virtual
// time.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use markplace::backend::{Document, MockRenderBackend};
use markplace::config::PreviewConfig;
use markplace::geometry::Point;
use markplace::preview::{PreviewMode, PreviewSynchronizer, RenderPlan};
use markplace::session::{WatermarkEvent, WatermarkSession};
use markplace::watermark::{Layout, WatermarkSpec};

const DEBOUNCE: Duration = Duration::from_millis(300);

fn setup() -> (Arc<MockRenderBackend>, PreviewSynchronizer<MockRenderBackend>) {
    let backend = Arc::new(MockRenderBackend::with_pages(1, 612.0, 792.0));
    let sync = PreviewSynchronizer::new(backend.clone(), DEBOUNCE);
    (backend, sync)
}

fn session(layout: Layout) -> WatermarkSession {
    let document = Document::new("contract.pdf", Bytes::from_static(b"%PDF-1.7"));
    let info = markplace::backend::PdfInfo {
        page_count: 1,
        pages: vec![markplace::backend::PageInfo {
            index: Some(0),
            width: 612.0,
            height: 792.0,
        }],
        ..Default::default()
    };
    WatermarkSession::new(WatermarkSpec::text("CONFIDENTIAL").with_layout(layout))
        .apply(WatermarkEvent::DocumentLoaded { document, info })
}

fn rotated(session: &WatermarkSession, degrees: f64) -> RenderPlan {
    let spec = session.spec().clone().with_rotation(degrees);
    session
        .clone()
        .apply(WatermarkEvent::SpecChanged(spec))
        .preview_plan()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_edits_renders_once_with_latest_inputs() {
    let (backend, sync) = setup();
    let base = session(Layout::Tiled);

    for degrees in [10.0, 20.0, 30.0, 40.0] {
        sync.submit(rotated(&base, degrees));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(backend.preview_count(), 0);
    assert!(sync.is_debouncing());

    tokio::time::sleep(DEBOUNCE * 2).await;

    let calls = backend.preview_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].request, rotated(&base, 40.0).request);

    let frame = sync.current_frame().unwrap();
    assert_eq!(frame.mode, PreviewMode::Watermarked);
    assert_eq!(frame.image, MockRenderBackend::preview_image(0, 1));
    assert!(!sync.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_superseded_render_never_reaches_the_screen() {
    let (backend, sync) = setup();
    let base = session(Layout::Tiled);
    backend.push_preview_delay(Duration::from_secs(2));

    sync.submit(rotated(&base, 15.0));
    tokio::time::sleep(DEBOUNCE + Duration::from_millis(100)).await;
    assert!(sync.is_loading());

    sync.submit(rotated(&base, 75.0));
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(backend.preview_count(), 2);
    let frame = sync.current_frame().unwrap();
    assert_eq!(frame.request_id, 2);
    assert_eq!(frame.image, MockRenderBackend::preview_image(0, 2));
}

#[tokio::test(start_paused = true)]
async fn test_frames_are_observed_through_subscription() {
    let (_backend, sync) = setup();
    let mut frames = sync.subscribe();

    sync.submit(session(Layout::Grid3x3).preview_plan().unwrap());
    frames.changed().await.unwrap();

    let frame = frames.borrow().clone().unwrap();
    assert_eq!(frame.page_index, 0);
    assert_eq!(frame.mode, PreviewMode::Watermarked);
}

#[tokio::test(start_paused = true)]
async fn test_moving_single_watermark_needs_no_new_render() {
    let (backend, sync) = setup();
    let mut state = session(Layout::Single);

    sync.submit(state.preview_plan().unwrap());
    tokio::time::sleep(DEBOUNCE * 2).await;
    assert_eq!(backend.preview_count(), 1);
    assert_eq!(backend.preview_calls()[0].request.modifiers.element_count(), 0);

    for step in 1..=5 {
        let offset = step as f64 * 20.0;
        state = state.apply(WatermarkEvent::PositionChanged(Point::new(offset, offset)));
        sync.submit(state.preview_plan().unwrap());
        assert!(!sync.is_debouncing());
    }
    tokio::time::sleep(DEBOUNCE * 2).await;
    assert_eq!(backend.preview_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retrigger_skips_debounce() {
    let (backend, sync) = setup();

    sync.submit(session(Layout::Tiled).preview_plan().unwrap());
    sync.retrigger();
    assert!(!sync.is_debouncing());
    assert!(sync.is_loading());

    tokio::time::sleep(DEBOUNCE * 3).await;
    assert_eq!(backend.preview_count(), 1);
    assert!(sync.current_frame().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_failed_render_keeps_previous_frame() {
    let (backend, sync) = setup();
    let base = session(Layout::Tiled);

    sync.submit(rotated(&base, 45.0));
    tokio::time::sleep(DEBOUNCE * 2).await;
    let shown = sync.current_frame().unwrap();

    backend.set_preview_failure(true);
    sync.submit(rotated(&base, 60.0));
    tokio::time::sleep(DEBOUNCE * 2).await;

    assert_eq!(backend.preview_count(), 2);
    assert_eq!(sync.current_frame(), Some(shown));
    assert!(!sync.is_loading());

    // Retrying the same inputs goes to the engine again
    backend.set_preview_failure(false);
    sync.retrigger();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(sync.current_frame().unwrap().request_id, 3);
}

#[tokio::test(start_paused = true)]
async fn test_closing_document_clears_frame_and_pending_work() {
    let (backend, sync) = setup();
    let base = session(Layout::Tiled);

    sync.submit(rotated(&base, 45.0));
    tokio::time::sleep(DEBOUNCE * 2).await;
    assert!(sync.current_frame().is_some());

    sync.submit(rotated(&base, 90.0));
    sync.close_document();
    tokio::time::sleep(DEBOUNCE * 2).await;

    assert!(sync.current_frame().is_none());
    assert_eq!(backend.preview_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_synchronizer_stops_pending_render() {
    let (backend, sync) = setup();
    let frames = sync.subscribe();

    sync.submit(session(Layout::Tiled).preview_plan().unwrap());
    drop(sync);
    tokio::time::sleep(DEBOUNCE * 3).await;

    assert_eq!(backend.preview_count(), 0);
    assert!(frames.borrow().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_debounce_comes_from_preview_config() {
    let backend = Arc::new(MockRenderBackend::with_pages(1, 612.0, 792.0));
    let config = PreviewConfig {
        watermark_debounce_ms: 450,
        removal_debounce_ms: 120,
    };

    let watermark = PreviewSynchronizer::for_watermark(backend.clone(), &config);
    assert_eq!(watermark.debounce(), Duration::from_millis(450));

    let removal = PreviewSynchronizer::for_removal(backend.clone(), &config);
    assert_eq!(removal.debounce(), Duration::from_millis(120));

    // Nothing is rendered before the configured quiet period ends
    removal.submit(session(Layout::Tiled).preview_plan().unwrap());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(backend.preview_count(), 0);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(backend.preview_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_render_waits_for_published_frame() {
    let backend = Arc::new(MockRenderBackend::with_pages(1, 612.0, 792.0));
    let sync = PreviewSynchronizer::for_watermark(backend.clone(), &PreviewConfig::default());

    let frame = sync
        .render(session(Layout::Grid3x3).preview_plan().unwrap(), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(frame.mode, PreviewMode::Watermarked);
    assert_eq!(frame.image, MockRenderBackend::preview_image(0, 1));
    assert_eq!(backend.preview_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_render_gives_up_when_engine_fails() {
    let (backend, sync) = setup();
    backend.set_preview_failure(true);

    let frame = sync
        .render(session(Layout::Tiled).preview_plan().unwrap(), Duration::from_secs(1))
        .await;
    assert!(frame.is_none());
    assert_eq!(backend.preview_count(), 1);
}
