// Export and removal flows against the in-memory rendering engine

use bytes::Bytes;
use markplace::backend::{
    BackendError, Document, ElementKind, MockRenderBackend, PageAnalysis, PageElement,
    RenderBackend,
};
use markplace::error::Error;
use markplace::removal::TargetRef;
use markplace::session::{
    export_document, RemovalEvent, RemovalSession, WatermarkEvent, WatermarkSession,
};
use markplace::watermark::{Density, Layout, WatermarkSpec};

fn document() -> Document {
    Document::new("handbook.pdf", Bytes::from_static(b"%PDF-1.7 handbook"))
}

async fn load(backend: &MockRenderBackend, spec: WatermarkSpec) -> WatermarkSession {
    let document = document();
    let info = backend.pdf_info(&document).await.unwrap();
    WatermarkSession::new(spec).apply(WatermarkEvent::DocumentLoaded { document, info })
}

#[tokio::test]
async fn test_export_tiled_watermark_on_every_page() {
    let backend = MockRenderBackend::with_pages(4, 612.0, 792.0);
    let spec = WatermarkSpec::text("CONFIDENTIAL")
        .with_layout(Layout::Tiled)
        .with_density(Density::Dense);
    let session = load(&backend, spec).await;

    let pdf = export_document(&backend, &session).await.unwrap();
    assert_eq!(pdf, Bytes::from_static(b"%PDF-mock pages=4 elements=16"));

    let calls = backend.reconstruct_calls();
    assert_eq!(calls.len(), 1);
    let modifiers = &calls[0].modifiers;
    assert_eq!(modifiers.pages().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert!(calls[0].removals.is_none());
}

#[tokio::test]
async fn test_export_uses_dragged_position() {
    let backend = MockRenderBackend::with_pages(2, 612.0, 792.0);
    let session = load(&backend, WatermarkSpec::text("DRAFT"))
        .await
        .apply(WatermarkEvent::PositionChanged(markplace::geometry::Point::new(
            100.0, 650.0,
        )));

    export_document(&backend, &session).await.unwrap();
    let modifiers = &backend.reconstruct_calls()[0].modifiers;
    for page in 0..2 {
        assert_eq!(modifiers.get(page).unwrap()[0].position(), (100.0, 650.0));
    }
}

#[tokio::test]
async fn test_export_without_document_is_not_ready() {
    let backend = MockRenderBackend::new();
    let session = WatermarkSession::new(WatermarkSpec::default());

    let err = export_document(&backend, &session).await.unwrap_err();
    assert!(matches!(err, Error::Watermark(_)));
    assert!(backend.reconstruct_calls().is_empty());
}

#[tokio::test]
async fn test_export_surfaces_engine_failure() {
    let backend = MockRenderBackend::with_pages(1, 612.0, 792.0);
    let session = load(&backend, WatermarkSpec::text("DRAFT")).await;
    backend.set_unavailable(true);

    let err = export_document(&backend, &session).await.unwrap_err();
    assert!(matches!(err, Error::Backend(BackendError::Connection(_))));
}

fn analysis() -> PageAnalysis {
    let text = |id: &str, content: &str, bbox: [f64; 4]| PageElement {
        kind: ElementKind::Text,
        id: id.to_string(),
        content: Some(content.to_string()),
        bbox,
        color: Some(0xAAAAAA),
        font: Some("Helvetica".to_string()),
        size: Some(60.0),
        metadata: None,
        page: 0,
    };
    PageAnalysis {
        texts: vec!["SAMPLE".into(), "Employee handbook".into()],
        interactive_elements: vec![
            text("t-0", "SAMPLE", [150.0, 350.0, 450.0, 420.0]),
            text("t-1", "Employee handbook", [72.0, 72.0, 300.0, 96.0]),
            PageElement {
                kind: ElementKind::Image,
                id: "img_5".to_string(),
                content: None,
                bbox: [400.0, 700.0, 560.0, 760.0],
                color: None,
                font: None,
                size: None,
                metadata: None,
                page: 0,
            },
        ],
        page_width: 612.0,
        page_height: 792.0,
        page_rect: Some([0.0, 0.0, 612.0, 792.0]),
        suggested_watermarks: vec!["SAMPLE".into(), "DO NOT COPY".into()],
        ..PageAnalysis::default()
    }
}

#[tokio::test]
async fn test_removal_flow_reconstructs_with_targets() {
    let backend = MockRenderBackend::with_pages(3, 612.0, 792.0);
    backend.set_analysis(0, analysis());
    let document = document();

    let info = backend.pdf_info(&document).await.unwrap();
    let mut session = RemovalSession::new()
        .apply(RemovalEvent::DocumentLoaded(document.clone()))
        .apply(RemovalEvent::PageCountLoaded(info.page_count));

    let (page, analyze_all) = session.analysis_request().unwrap();
    let analysis = backend.analyze(&document, page, analyze_all).await.unwrap();
    session = session.apply(RemovalEvent::AnalysisLoaded(analysis));
    assert_eq!(backend.analyze_calls(), vec![(0, true)]);
    assert_eq!(session.pending_suggestions(), vec!["SAMPLE", "DO NOT COPY"]);

    let image = session.analysis().unwrap().interactive_elements[2].clone();
    session = session
        .apply(RemovalEvent::KeywordAdded("SAMPLE".into()))
        .apply(RemovalEvent::SuggestionAccepted("DO NOT COPY".into()))
        .apply(RemovalEvent::ElementToggled(image));
    assert!(session.pending_suggestions().is_empty());

    backend
        .reconstruct(&document, &session.export_request())
        .await
        .unwrap();
    let removals = backend.reconstruct_calls()[0].removals.clone().unwrap();
    assert_eq!(removals.text.len(), 2);
    assert!(matches!(
        removals.text.iter().next(),
        Some(TargetRef::Element(e)) if e.id.as_deref() == Some("t-0")
    ));
    assert_eq!(removals.xobjects.len(), 1);
    assert!(backend.reconstruct_calls()[0].modifiers.is_empty());
}

#[tokio::test]
async fn test_missing_analysis_leaves_removal_usable() {
    let backend = MockRenderBackend::with_pages(2, 612.0, 792.0);
    let document = document();
    let mut session = RemovalSession::new()
        .apply(RemovalEvent::DocumentLoaded(document.clone()))
        .apply(RemovalEvent::PageCountLoaded(2))
        .apply(RemovalEvent::PageSelected(1));

    let (page, analyze_all) = session.analysis_request().unwrap();
    if backend.analyze(&document, page, analyze_all).await.is_err() {
        session = session.apply(RemovalEvent::AnalysisFailed);
    }
    session = session.apply(RemovalEvent::KeywordAdded("WATERMARK".into()));

    assert!(session.analysis().is_none());
    assert!(matches!(
        session.targets().text.iter().next(),
        Some(TargetRef::Bare(s)) if s == "WATERMARK"
    ));
}
