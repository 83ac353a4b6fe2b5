//! Boundary to the external PDF rendering engine.
//!
//! The engine parses, rasterises and rewrites PDFs; this crate only decides
//! what to send it. Four operations are consumed:
//!
//! - `pdf-info`: page count and per-page geometry
//! - `analyze`: selectable elements on one page, plus cross-page suggestions
//! - `preview`: one page rendered with placements and/or removals applied
//! - `reconstruct`: the final document with every modification applied

pub mod http;
pub mod mock;
pub mod wire;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::PageGeometry;
use crate::removal::RemovalTargets;

pub use http::HttpRenderBackend;
pub use mock::MockRenderBackend;
pub use wire::{ImageElement, PageModifiers, TextElement, WireElement};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Errors returned by a [`RenderBackend`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Invalid backend configuration: {0}")]
    InvalidConfig(String),

    #[error("Connection to rendering engine failed: {0}")]
    Connection(String),

    #[error("Rendering engine returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode engine response: {0}")]
    Decode(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl BackendError {
    /// Cancellation is expected during preview supersession and must not be
    /// surfaced as a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// An uploaded PDF. Cheap to clone; identity is the id assigned on creation,
/// so re-uploading the same bytes is a different document.
#[derive(Clone)]
pub struct Document {
    id: u64,
    name: String,
    bytes: Bytes,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Document {}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Modifications for a `preview` or `reconstruct` call.
#[derive(Clone, Default, PartialEq)]
pub struct RenderRequest {
    pub modifiers: PageModifiers,
    pub removals: Option<RemovalTargets>,
    /// Uploaded as `watermark_image`; referenced by image elements.
    pub watermark_image: Option<Bytes>,
}

impl RenderRequest {
    pub fn new(modifiers: PageModifiers) -> Self {
        Self {
            modifiers,
            ..Default::default()
        }
    }

    pub fn with_removals(mut self, removals: RemovalTargets) -> Self {
        self.removals = Some(removals);
        self
    }

    pub fn with_watermark_image(mut self, image: Option<Bytes>) -> Self {
        self.watermark_image = image;
        self
    }
}

impl fmt::Debug for RenderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderRequest")
            .field("modifiers", &self.modifiers)
            .field("removals", &self.removals)
            .field(
                "watermark_image",
                &self.watermark_image.as_ref().map(Bytes::len),
            )
            .finish()
    }
}

/// Size of one page as reported by `pdf-info`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub index: Option<usize>,
    pub width: f64,
    pub height: f64,
}

/// Response of `pdf-info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfInfo {
    pub page_count: usize,
    #[serde(default)]
    pub pages: Vec<PageInfo>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub is_encrypted: bool,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub permissions: BTreeMap<String, bool>,
    /// Document statistics the engine reports but this crate does not use
    /// (`total_images`, `has_forms`, `is_scanned`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PdfInfo {
    /// Geometry of page `index`, if the engine reported a usable size for it.
    pub fn page_geometry(&self, index: usize) -> Option<PageGeometry> {
        let page = self.pages.get(index)?;
        let geometry = PageGeometry::new(page.width, page.height);
        geometry.size().is_valid().then_some(geometry)
    }
}

/// Kind of a selectable element found by `analyze`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
    Drawing,
    Widget,
    Link,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Drawing => "drawing",
            Self::Widget => "widget",
            Self::Link => "link",
        }
    }
}

/// One selectable element; `bbox` is `[x0, y0, x1, y1]` in PDF user space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub bbox: [f64; 4],
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub page: usize,
}

/// Response of `analyze`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageAnalysis {
    #[serde(default)]
    pub texts: Vec<String>,
    #[serde(default)]
    pub image_ids: Vec<String>,
    #[serde(default)]
    pub drawing_ids: Vec<String>,
    #[serde(default)]
    pub interactive_elements: Vec<PageElement>,
    pub page_width: f64,
    pub page_height: f64,
    #[serde(default)]
    pub page_rect: Option<[f64; 4]>,
    #[serde(default)]
    pub suggested_watermarks: Vec<String>,
}

impl PageAnalysis {
    /// Page geometry with the page-rect origin applied.
    pub fn page_geometry(&self) -> PageGeometry {
        let geometry = PageGeometry::new(self.page_width, self.page_height);
        match self.page_rect {
            Some([x0, y0, _, _]) => geometry.with_origin(crate::geometry::Point::new(x0, y0)),
            None => geometry,
        }
    }

    pub fn elements_of(&self, kind: ElementKind) -> impl Iterator<Item = &PageElement> {
        self.interactive_elements
            .iter()
            .filter(move |e| e.kind == kind)
    }
}

/// The rendering engine.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Page count and geometry
    async fn pdf_info(&self, document: &Document) -> Result<PdfInfo, BackendError>;

    /// Selectable elements of one page. `analyze_all` asks the engine to scan
    /// every page for repeated content suggestions.
    async fn analyze(
        &self,
        document: &Document,
        page_index: usize,
        analyze_all: bool,
    ) -> Result<PageAnalysis, BackendError>;

    /// Raster image of one page with the request applied
    async fn preview(
        &self,
        document: &Document,
        page_index: usize,
        request: &RenderRequest,
    ) -> Result<Bytes, BackendError>;

    /// Final PDF with the request applied to every page it names
    async fn reconstruct(
        &self,
        document: &Document,
        request: &RenderRequest,
    ) -> Result<Bytes, BackendError>;
}
