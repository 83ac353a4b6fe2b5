//! Removal targets for the watermark-removal tool.
//!
//! Targets are grouped by element kind, matching the engine's
//! `remove_targets_json` shape:
//!
//! ```json
//! {"text": ["DRAFT", {"id": "t-3", "content": "SAMPLE", "bbox": [10, 20, 90, 40], "page": 0}],
//!  "xobjects": [{"id": "img_7", "page": 0, "type": "image"}],
//!  "drawings": [], "widgets": [], "links": []}
//! ```
//!
//! Each group is a [`TargetSet`]; two entries never share an identity.

pub mod targets;

use serde::{Deserialize, Serialize};

use crate::backend::{ElementKind, PageElement};

pub use targets::{same_target, ElementRef, TargetRef, TargetSet};

/// Everything the user selected for removal, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemovalTargets {
    #[serde(default)]
    pub text: TargetSet,
    #[serde(default)]
    pub xobjects: TargetSet,
    #[serde(default)]
    pub drawings: TargetSet,
    #[serde(default)]
    pub widgets: TargetSet,
    #[serde(default)]
    pub links: TargetSet,
}

impl RemovalTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_for(&self, kind: ElementKind) -> &TargetSet {
        match kind {
            ElementKind::Text => &self.text,
            ElementKind::Image => &self.xobjects,
            ElementKind::Drawing => &self.drawings,
            ElementKind::Widget => &self.widgets,
            ElementKind::Link => &self.links,
        }
    }

    pub fn set_for_mut(&mut self, kind: ElementKind) -> &mut TargetSet {
        match kind {
            ElementKind::Text => &mut self.text,
            ElementKind::Image => &mut self.xobjects,
            ElementKind::Drawing => &mut self.drawings,
            ElementKind::Widget => &mut self.widgets,
            ElementKind::Link => &mut self.links,
        }
    }

    /// Whether a clicked element is currently targeted.
    ///
    /// A text element is selected by a record with its id or by a bare
    /// keyword equal to its content; other kinds only by id.
    pub fn is_selected(&self, element: &PageElement) -> bool {
        self.set_for(element.kind)
            .iter()
            .any(|t| selects(t, element))
    }

    /// Select or deselect a clicked element. Returns whether it is selected
    /// afterwards.
    pub fn toggle_element(&mut self, element: &PageElement) -> bool {
        let set = self.set_for_mut(element.kind);
        if set.iter().any(|t| selects(t, element)) {
            set.remove_where(|t| selects(t, element));
            false
        } else {
            set.add(ElementRef::from_element(element).into())
        }
    }

    /// Add a typed keyword to the text targets, as a structured record when
    /// a text element with exactly that content is known. Blank keywords and
    /// keywords some text target already matches by content are ignored.
    pub fn add_keyword(&mut self, keyword: &str, catalog: &[PageElement]) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.is_text_targeted(keyword) {
            return false;
        }
        self.text
            .add_resolved(TargetRef::bare(keyword), catalog)
    }

    /// Target an image XObject by id.
    pub fn add_xobject(&mut self, id: &str, page: usize) -> bool {
        let id = id.trim();
        if id.is_empty() {
            return false;
        }
        self.xobjects
            .add(ElementRef::by_id(id, page, ElementKind::Image).into())
    }

    /// Accept a cross-page suggestion. Suggestions stay bare so every
    /// occurrence on every page is matched.
    pub fn accept_suggestion(&mut self, text: &str) -> bool {
        self.text.add(TargetRef::bare(text))
    }

    /// Whether some text target already matches `text` by content.
    pub fn is_text_targeted(&self, text: &str) -> bool {
        self.text.iter().any(|t| t.text() == Some(text))
    }

    /// Suggestions not yet targeted, in their original order.
    pub fn pending_suggestions<'a>(&self, suggestions: &'a [String]) -> Vec<&'a str> {
        suggestions
            .iter()
            .map(String::as_str)
            .filter(|s| !self.is_text_targeted(s))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.text.len()
            + self.xobjects.len()
            + self.drawings.len()
            + self.widgets.len()
            + self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.xobjects.clear();
        self.drawings.clear();
        self.widgets.clear();
        self.links.clear();
    }
}

fn selects(target: &TargetRef, element: &PageElement) -> bool {
    match (element.kind, target) {
        (ElementKind::Text, TargetRef::Bare(s)) => element.content.as_deref() == Some(s.as_str()),
        (_, TargetRef::Bare(s)) => *s == element.id,
        (_, TargetRef::Element(e)) => e.id.as_deref() == Some(element.id.as_str()),
    }
}
