//! Remove-watermark tool state.

use crate::backend::{Document, ElementKind, PageAnalysis, PageElement, PageModifiers, RenderRequest};
use crate::geometry::{PixelRect, Point, PreviewTransform, Size};
use crate::preview::RenderPlan;
use crate::removal::RemovalTargets;

#[derive(Debug, Clone, PartialEq)]
pub enum RemovalEvent {
    DocumentLoaded(Document),
    PageCountLoaded(usize),
    PageSelected(usize),
    AnalysisLoaded(PageAnalysis),
    AnalysisFailed,
    KeywordAdded(String),
    XObjectAdded(String),
    SuggestionAccepted(String),
    ElementToggled(PageElement),
    TargetRemoved { kind: ElementKind, identity: String },
    TargetsCleared,
}

/// An analysed element projected into preview pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBox<'a> {
    pub element: &'a PageElement,
    pub rect: PixelRect,
    pub selected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RemovalSession {
    document: Option<Document>,
    page_count: Option<usize>,
    current_page: usize,
    analysis: Option<PageAnalysis>,
    suggestions: Vec<String>,
    targets: RemovalTargets,
    first_analysis_pending: bool,
}

impl RemovalSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(mut self, event: RemovalEvent) -> Self {
        match event {
            RemovalEvent::DocumentLoaded(document) => {
                tracing::info!(document = document.id(), name = %document.name(), "Document loaded");
                self = Self {
                    document: Some(document),
                    first_analysis_pending: true,
                    ..Self::default()
                };
            }
            RemovalEvent::PageCountLoaded(count) => {
                self.page_count = Some(count);
                self.current_page = self.clamp_page(self.current_page);
            }
            RemovalEvent::PageSelected(index) => {
                let index = self.clamp_page(index);
                if index != self.current_page {
                    self.current_page = index;
                    self.analysis = None;
                }
            }
            RemovalEvent::AnalysisLoaded(analysis) => {
                if self.first_analysis_pending {
                    self.suggestions = analysis.suggested_watermarks.clone();
                    self.first_analysis_pending = false;
                }
                tracing::debug!(
                    page = self.current_page,
                    elements = analysis.interactive_elements.len(),
                    suggestions = self.suggestions.len(),
                    "Page analysis loaded"
                );
                self.analysis = Some(analysis);
            }
            RemovalEvent::AnalysisFailed => {
                tracing::warn!(page = self.current_page, "Page analysis failed");
            }
            RemovalEvent::KeywordAdded(keyword) => {
                let catalog = self
                    .analysis
                    .as_ref()
                    .map(|a| a.interactive_elements.as_slice())
                    .unwrap_or(&[]);
                self.targets.add_keyword(&keyword, catalog);
            }
            RemovalEvent::XObjectAdded(id) => {
                self.targets.add_xobject(&id, self.current_page);
            }
            RemovalEvent::SuggestionAccepted(text) => {
                self.targets.accept_suggestion(&text);
            }
            RemovalEvent::ElementToggled(element) => {
                self.targets.toggle_element(&element);
            }
            RemovalEvent::TargetRemoved { kind, identity } => {
                self.targets.set_for_mut(kind).remove(&identity);
            }
            RemovalEvent::TargetsCleared => self.targets.clear(),
        }
        self
    }

    fn clamp_page(&self, index: usize) -> usize {
        index.min(self.page_count.unwrap_or(1).saturating_sub(1))
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn analysis(&self) -> Option<&PageAnalysis> {
        self.analysis.as_ref()
    }

    pub fn targets(&self) -> &RemovalTargets {
        &self.targets
    }

    /// `(page_index, analyze_all)` for the next `analyze` call. The first
    /// analysis of a document scans every page for repeated text.
    pub fn analysis_request(&self) -> Option<(usize, bool)> {
        self.document.as_ref()?;
        Some((self.current_page, self.first_analysis_pending))
    }

    /// Cross-page suggestions not yet targeted.
    pub fn pending_suggestions(&self) -> Vec<&str> {
        self.targets.pending_suggestions(&self.suggestions)
    }

    /// Detected texts containing `search` (case-insensitive) that are not
    /// already targeted.
    pub fn detected_text_matches(&self, search: &str) -> Vec<&str> {
        let needle = search.to_lowercase();
        self.analysis
            .iter()
            .flat_map(|a| a.texts.iter())
            .map(String::as_str)
            .filter(|t| !self.targets.is_text_targeted(t))
            .filter(|t| t.to_lowercase().contains(&needle))
            .collect()
    }

    /// Every interactive element as a preview-pixel box, in analysis order.
    pub fn element_boxes(&self, preview: Size) -> Vec<ElementBox<'_>> {
        let Some(analysis) = &self.analysis else {
            return Vec::new();
        };
        let Some(transform) = PreviewTransform::new(analysis.page_geometry(), preview) else {
            return Vec::new();
        };

        analysis
            .interactive_elements
            .iter()
            .map(|element| ElementBox {
                element,
                rect: transform.pdf_rect_to_pixel(element.bbox),
                selected: self.targets.is_selected(element),
            })
            .collect()
    }

    /// Topmost element under a preview pixel. Later elements are drawn over
    /// earlier ones.
    pub fn element_at(&self, pixel: Point, preview: Size) -> Option<&PageElement> {
        self.element_boxes(preview)
            .into_iter()
            .rev()
            .find(|b| b.rect.contains(pixel))
            .map(|b| b.element)
    }

    /// Preview of the current page with the removal targets applied.
    pub fn preview_plan(&self) -> Option<RenderPlan> {
        let document = self.document.clone()?;
        Some(RenderPlan::watermarked(
            document,
            self.current_page,
            RenderRequest::new(PageModifiers::new()).with_removals(self.targets.clone()),
        ))
    }

    /// Reconstruct request applying the removal targets to the document.
    pub fn export_request(&self) -> RenderRequest {
        RenderRequest::new(PageModifiers::new()).with_removals(self.targets.clone())
    }
}
