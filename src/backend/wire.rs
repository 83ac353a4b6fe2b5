//! Wire shapes for additive placements.
//!
//! `page_modifiers_json` is a JSON object keyed by page index (as a string)
//! whose values are ordered element lists:
//!
//! ```json
//! {"0": [{"type": "text", "x": 306.0, "y": 396.0, "angle": 45.0, "opacity": 0.3,
//!         "text": "DRAFT", "fontsize": 50, "color": "#000000", "fontname": "song"}]}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One element the rendering engine should add to a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireElement {
    Text(TextElement),
    Image(ImageElement),
}

impl WireElement {
    pub fn position(&self) -> (f64, f64) {
        match self {
            Self::Text(t) => (t.x, t.y),
            Self::Image(i) => (i.x, i.y),
        }
    }
}

/// Text element; `(x, y)` is the insertion point in PDF user space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub opacity: f64,
    pub text: String,
    pub fontsize: u32,
    pub color: String,
    pub fontname: String,
}

/// Image element; `(x, y)` is the image center. The image bytes travel as a
/// separate `watermark_image` upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub opacity: f64,
    pub scale: f64,
    #[serde(rename = "isPlaceholder", default)]
    pub is_placeholder: bool,
}

/// Page index → ordered element list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageModifiers(BTreeMap<usize, Vec<WireElement>>);

impl PageModifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modifiers touching a single page. An empty list is still sent so the
    /// engine renders that page untouched.
    pub fn single_page(page_index: usize, elements: Vec<WireElement>) -> Self {
        let mut modifiers = Self::new();
        modifiers.insert(page_index, elements);
        modifiers
    }

    /// The same element list on every page `0..page_count`.
    pub fn replicated(elements: &[WireElement], page_count: usize) -> Self {
        Self((0..page_count).map(|i| (i, elements.to_vec())).collect())
    }

    pub fn insert(&mut self, page_index: usize, elements: Vec<WireElement>) {
        self.0.insert(page_index, elements);
    }

    pub fn get(&self, page_index: usize) -> Option<&[WireElement]> {
        self.0.get(&page_index).map(Vec::as_slice)
    }

    pub fn pages(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }

    pub fn page_count(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements across all pages.
    pub fn element_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
