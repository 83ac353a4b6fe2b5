//! Target references and the identity-aware set holding them.

use serde::{Deserialize, Serialize};

use crate::backend::{ElementKind, PageElement};

/// Positional record of one page element slated for removal.
///
/// Carrying `id` and `bbox` lets the engine lock onto exactly this element
/// instead of every occurrence of its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default)]
    pub page: usize,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ElementKind>,
}

impl ElementRef {
    /// Reference to an element by id only.
    pub fn by_id(id: impl Into<String>, page: usize, kind: ElementKind) -> Self {
        Self {
            id: Some(id.into()),
            content: None,
            bbox: None,
            color: None,
            font: None,
            size: None,
            page,
            kind: Some(kind),
        }
    }

    /// Reference built from an analysed element. Text keeps its content and
    /// style so the engine can match it exactly; other kinds only need the id.
    pub fn from_element(element: &PageElement) -> Self {
        match element.kind {
            ElementKind::Text => Self {
                id: Some(element.id.clone()),
                content: element.content.clone(),
                bbox: Some(element.bbox),
                color: element.color,
                font: element.font.clone(),
                size: element.size,
                page: element.page,
                kind: Some(ElementKind::Text),
            },
            kind => Self::by_id(element.id.clone(), element.page, kind),
        }
    }
}

/// Something to delete: a bare text match, or a positionally locked element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetRef {
    Bare(String),
    Element(ElementRef),
}

impl TargetRef {
    pub fn bare(text: impl Into<String>) -> Self {
        Self::Bare(text.into())
    }

    /// The value used for equality: the id of a record when present, its
    /// content otherwise, or the bare string itself.
    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::Bare(s) => Some(s),
            Self::Element(e) => e.id.as_deref().or(e.content.as_deref()),
        }
    }

    /// Text this target would match by content, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Bare(s) => Some(s),
            Self::Element(e) => e.content.as_deref(),
        }
    }

    pub fn is_bare(&self) -> bool {
        matches!(self, Self::Bare(_))
    }
}

impl From<ElementRef> for TargetRef {
    fn from(e: ElementRef) -> Self {
        Self::Element(e)
    }
}

/// Whether two references denote the same target, whichever representation
/// either side uses. References without any identity never match.
pub fn same_target(a: &TargetRef, b: &TargetRef) -> bool {
    match (a.identity(), b.identity()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Ordered set of targets with no two entries sharing an identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSet {
    entries: Vec<TargetRef>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless an entry with the same identity exists. Returns whether
    /// the set changed.
    pub fn add(&mut self, target: TargetRef) -> bool {
        if target.identity().is_none() || self.contains(&target) {
            return false;
        }
        self.entries.push(target);
        true
    }

    /// Like [`add`](Self::add), but a bare string exactly matching the
    /// content of a text element in `catalog` is stored as that element's
    /// record instead. Nothing is inserted when either the given reference
    /// or its resolved record is already present.
    pub fn add_resolved(&mut self, target: TargetRef, catalog: &[PageElement]) -> bool {
        if self.contains(&target) {
            return false;
        }
        self.add(resolve(target, catalog))
    }

    /// Remove the target if present, add it otherwise. Returns whether it is
    /// present afterwards.
    pub fn toggle(&mut self, target: TargetRef) -> bool {
        if self.contains(&target) {
            self.entries.retain(|e| !same_target(e, &target));
            false
        } else {
            self.add(target)
        }
    }

    /// Like [`toggle`](Self::toggle). Membership is checked on the given
    /// reference first, so a bare entry is removed even when the catalog
    /// would resolve it to a record; only the insert path resolves.
    pub fn toggle_resolved(&mut self, target: TargetRef, catalog: &[PageElement]) -> bool {
        if self.contains(&target) {
            return self.toggle(target);
        }
        self.toggle(resolve(target, catalog))
    }

    pub fn contains(&self, target: &TargetRef) -> bool {
        self.entries.iter().any(|e| same_target(e, target))
    }

    /// Remove every entry whose identity is `identity`. Returns how many were
    /// removed.
    pub fn remove(&mut self, identity: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.identity() != Some(identity));
        before - self.entries.len()
    }

    /// Remove every entry matching `predicate`.
    pub fn remove_where(&mut self, predicate: impl Fn(&TargetRef) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !predicate(e));
        before - self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TargetRef> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a TargetRef;
    type IntoIter = std::slice::Iter<'a, TargetRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn resolve(target: TargetRef, catalog: &[PageElement]) -> TargetRef {
    let TargetRef::Bare(text) = &target else {
        return target;
    };

    catalog
        .iter()
        .find(|e| e.kind == ElementKind::Text && e.content.as_deref() == Some(text.as_str()))
        .map(|e| TargetRef::Element(ElementRef::from_element(e)))
        .unwrap_or(target)
}
