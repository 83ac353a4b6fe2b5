//! Add-watermark tool state.

use bytes::Bytes;

use crate::backend::{Document, PageModifiers, PdfInfo, RenderBackend, RenderRequest};
use crate::error::Result;
use crate::geometry::{PageGeometry, Point, PreviewTransform, Size};
use crate::overlay::{overlay_style, OverlayStyle, OverlayUpdate};
use crate::preview::RenderPlan;
use crate::watermark::{
    generate_placements, ImageAttributes, PlacementSet, WatermarkContent, WatermarkError,
    WatermarkSpec,
};

#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkEvent {
    /// A document was uploaded and `pdf-info` succeeded
    DocumentLoaded { document: Document, info: PdfInfo },
    /// A document was uploaded but `pdf-info` failed; geometry stays unknown
    DocumentInfoFailed { document: Document },
    SpecChanged(WatermarkSpec),
    PositionChanged(Point),
    Overlay(OverlayUpdate),
    PageSelected(usize),
    /// An image watermark was chosen; switches the recipe to image content
    ImageLoaded {
        image: Bytes,
        natural_width: f64,
        natural_height: f64,
    },
}

/// Owned state of the add-watermark tool. Every change goes through
/// [`apply`](Self::apply), which returns the next state.
#[derive(Debug, Clone, Default)]
pub struct WatermarkSession {
    document: Option<Document>,
    info: Option<PdfInfo>,
    page_index: usize,
    spec: WatermarkSpec,
    position: Option<Point>,
    watermark_image: Option<Bytes>,
}

impl WatermarkSession {
    pub fn new(spec: WatermarkSpec) -> Self {
        Self {
            spec,
            ..Default::default()
        }
    }

    pub fn apply(mut self, event: WatermarkEvent) -> Self {
        match event {
            WatermarkEvent::DocumentLoaded { document, info } => {
                tracing::info!(
                    document = document.id(),
                    name = %document.name(),
                    pages = info.page_count,
                    "Document loaded"
                );
                self.document = Some(document);
                self.info = Some(info);
                self.page_index = 0;
                self.position = self.page_geometry().map(|g| g.center());
            }
            WatermarkEvent::DocumentInfoFailed { document } => {
                tracing::warn!(document = document.id(), "Page geometry unavailable");
                self.document = Some(document);
                self.info = None;
                self.page_index = 0;
                self.position = None;
            }
            WatermarkEvent::SpecChanged(spec) => self.spec = spec,
            WatermarkEvent::PositionChanged(position) => {
                if position.is_finite() {
                    self.position = Some(position);
                }
            }
            WatermarkEvent::Overlay(update) => self = self.apply_overlay(update),
            WatermarkEvent::PageSelected(index) => {
                let previous = self.page_geometry();
                self.page_index = index.min(self.page_count().saturating_sub(1));
                let current = self.page_geometry();
                if previous != current {
                    self.position = current.map(|g| g.center());
                }
            }
            WatermarkEvent::ImageLoaded {
                image,
                natural_width,
                natural_height,
            } => {
                let scale = self
                    .spec
                    .image_attributes()
                    .map_or(ImageAttributes::default().scale, |i| i.scale);
                self.spec = self
                    .spec
                    .with_content(WatermarkContent::Image(ImageAttributes {
                        natural_width,
                        natural_height,
                        scale,
                    }));
                self.watermark_image = Some(image);
            }
        }
        self
    }

    fn apply_overlay(mut self, update: OverlayUpdate) -> Self {
        match update {
            OverlayUpdate::Moved(p) => self.position = Some(p),
            OverlayUpdate::Rotated(deg) => self.spec = self.spec.with_rotation(deg),
            OverlayUpdate::FontSize(size) => self.spec = self.spec.with_font_size(size),
            OverlayUpdate::ImageScale(scale) => self.spec = self.spec.with_image_scale(scale),
        }
        self
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn spec(&self) -> &WatermarkSpec {
        &self.spec
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_count(&self) -> usize {
        self.info.as_ref().map_or(0, |i| i.page_count)
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// `None` until `pdf-info` succeeded for the selected page.
    pub fn page_geometry(&self) -> Option<PageGeometry> {
        self.info.as_ref()?.page_geometry(self.page_index)
    }

    pub fn placements(&self) -> Option<PlacementSet> {
        let page = self.page_geometry()?;
        Some(generate_placements(&self.spec, &page, self.position))
    }

    /// What the preview should show for the current inputs.
    ///
    /// A single instance is drawn locally, so only a clean raster is needed.
    pub fn preview_plan(&self) -> Option<RenderPlan> {
        let document = self.document.clone()?;
        let placements = self.placements()?;

        if self.spec.layout.is_single() {
            return Some(RenderPlan::clean(document, self.page_index));
        }

        let modifiers = PageModifiers::single_page(self.page_index, placements.to_wire(&self.spec));
        Some(RenderPlan::watermarked(
            document,
            self.page_index,
            RenderRequest::new(modifiers).with_watermark_image(self.image_upload()),
        ))
    }

    /// Locally drawn overlay, for the single-point layout only.
    pub fn overlay_style(&self, preview: Size) -> Option<OverlayStyle> {
        if !self.spec.layout.is_single() {
            return None;
        }
        let transform = PreviewTransform::new(self.page_geometry()?, preview)?;
        Some(overlay_style(&self.spec, self.position?, &transform))
    }

    /// The selected page's placements replicated to every page.
    pub fn export_modifiers(&self) -> Option<PageModifiers> {
        let placements = self.placements()?;
        Some(PageModifiers::replicated(
            &placements.to_wire(&self.spec),
            self.page_count(),
        ))
    }

    /// Full export request, or why it cannot be built yet.
    pub fn export_request(&self) -> std::result::Result<RenderRequest, WatermarkError> {
        self.spec.validate()?;
        if self.document.is_none() {
            return Err(WatermarkError::NotReady("no document loaded".to_string()));
        }
        let modifiers = self
            .export_modifiers()
            .ok_or_else(|| WatermarkError::NotReady("page geometry unknown".to_string()))?;
        if self.spec.image_attributes().is_some() && self.watermark_image.is_none() {
            return Err(WatermarkError::NotReady(
                "image watermark has no image uploaded".to_string(),
            ));
        }
        Ok(RenderRequest::new(modifiers).with_watermark_image(self.image_upload()))
    }

    fn image_upload(&self) -> Option<Bytes> {
        self.spec
            .image_attributes()
            .and(self.watermark_image.clone())
    }
}

/// Burn the watermark into every page and return the new PDF.
pub async fn export_document<B: RenderBackend + ?Sized>(
    backend: &B,
    session: &WatermarkSession,
) -> Result<Bytes> {
    let request = session.export_request()?;
    let document = session
        .document()
        .ok_or_else(|| WatermarkError::NotReady("no document loaded".to_string()))?;

    tracing::info!(
        document = document.id(),
        pages = request.modifiers.page_count(),
        elements = request.modifiers.element_count(),
        "Exporting watermarked document"
    );
    let pdf = backend.reconstruct(document, &request).await?;
    Ok(pdf)
}
