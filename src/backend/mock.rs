//! In-memory rendering engine for tests and offline planning.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::{
    BackendError, Document, PageAnalysis, PageInfo, PdfInfo, RenderBackend, RenderRequest,
};

/// A recorded `preview` call.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewCall {
    pub document_id: u64,
    pub page_index: usize,
    pub request: RenderRequest,
}

#[derive(Default)]
struct MockState {
    info: Option<PdfInfo>,
    analyses: BTreeMap<usize, PageAnalysis>,
    preview_delays: VecDeque<Duration>,
    info_calls: usize,
    analyze_calls: Vec<(usize, bool)>,
    preview_calls: Vec<PreviewCall>,
    reconstruct_calls: Vec<RenderRequest>,
    /// Simulate errors if true
    simulate_unavailable: bool,
    simulate_preview_failure: bool,
}

/// Mock engine that answers from canned responses and records every call.
///
/// Preview responses are `"page-{index}-call-{n}"` where `n` counts preview
/// calls from 1, so tests can tell which request produced a frame.
#[derive(Clone, Default)]
pub struct MockRenderBackend {
    state: Arc<RwLock<MockState>>,
}

impl MockRenderBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock reporting `page_count` pages of `width × height`.
    pub fn with_pages(page_count: usize, width: f64, height: f64) -> Self {
        let mock = Self::new();
        mock.set_pdf_info(uniform_info(page_count, width, height));
        mock
    }

    pub fn set_pdf_info(&self, info: PdfInfo) {
        self.state.write().info = Some(info);
    }

    pub fn set_analysis(&self, page_index: usize, analysis: PageAnalysis) {
        self.state.write().analyses.insert(page_index, analysis);
    }

    /// Delays applied to the next preview calls, one per call, in order.
    pub fn push_preview_delay(&self, delay: Duration) {
        self.state.write().preview_delays.push_back(delay);
    }

    /// Every operation fails with a connection error while enabled.
    pub fn set_unavailable(&self, enabled: bool) {
        self.state.write().simulate_unavailable = enabled;
    }

    /// Preview calls fail with a 500 status while enabled.
    pub fn set_preview_failure(&self, enabled: bool) {
        self.state.write().simulate_preview_failure = enabled;
    }

    pub fn info_calls(&self) -> usize {
        self.state.read().info_calls
    }

    pub fn analyze_calls(&self) -> Vec<(usize, bool)> {
        self.state.read().analyze_calls.clone()
    }

    pub fn preview_calls(&self) -> Vec<PreviewCall> {
        self.state.read().preview_calls.clone()
    }

    pub fn preview_count(&self) -> usize {
        self.state.read().preview_calls.len()
    }

    pub fn reconstruct_calls(&self) -> Vec<RenderRequest> {
        self.state.read().reconstruct_calls.clone()
    }

    /// The image the `n`th preview call (1-based) responds with.
    pub fn preview_image(page_index: usize, n: usize) -> Bytes {
        Bytes::from(format!("page-{}-call-{}", page_index, n))
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.state.read().simulate_unavailable {
            return Err(BackendError::Connection(
                "Simulated engine unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

fn uniform_info(page_count: usize, width: f64, height: f64) -> PdfInfo {
    PdfInfo {
        page_count,
        pages: (0..page_count)
            .map(|i| PageInfo {
                index: Some(i),
                width,
                height,
            })
            .collect(),
        ..PdfInfo::default()
    }
}

#[async_trait]
impl RenderBackend for MockRenderBackend {
    async fn pdf_info(&self, _document: &Document) -> Result<PdfInfo, BackendError> {
        self.state.write().info_calls += 1;
        self.check_available()?;

        Ok(self
            .state
            .read()
            .info
            .clone()
            .unwrap_or_else(|| uniform_info(1, 612.0, 792.0)))
    }

    async fn analyze(
        &self,
        _document: &Document,
        page_index: usize,
        analyze_all: bool,
    ) -> Result<PageAnalysis, BackendError> {
        self.state
            .write()
            .analyze_calls
            .push((page_index, analyze_all));
        self.check_available()?;

        self.state
            .read()
            .analyses
            .get(&page_index)
            .cloned()
            .ok_or(BackendError::Status {
                status: 404,
                message: format!("No analysis for page {}", page_index),
            })
    }

    async fn preview(
        &self,
        document: &Document,
        page_index: usize,
        request: &RenderRequest,
    ) -> Result<Bytes, BackendError> {
        let (n, delay) = {
            let mut state = self.state.write();
            state.preview_calls.push(PreviewCall {
                document_id: document.id(),
                page_index,
                request: request.clone(),
            });
            (
                state.preview_calls.len(),
                state.preview_delays.pop_front().unwrap_or_default(),
            )
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.check_available()?;
        if self.state.read().simulate_preview_failure {
            return Err(BackendError::Status {
                status: 500,
                message: "Simulated render failure".to_string(),
            });
        }

        Ok(Self::preview_image(page_index, n))
    }

    async fn reconstruct(
        &self,
        _document: &Document,
        request: &RenderRequest,
    ) -> Result<Bytes, BackendError> {
        self.state.write().reconstruct_calls.push(request.clone());
        self.check_available()?;

        Ok(Bytes::from(format!(
            "%PDF-mock pages={} elements={}",
            request.modifiers.page_count(),
            request.modifiers.element_count()
        )))
    }
}
