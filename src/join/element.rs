use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Color, Key};

/// Identity tag of a rendered element, unique within its store.
///
/// Survives data refreshes: an element matched by key keeps its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(u64);

impl ElementId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkKind {
    Rect,
    Circle,
    Path,
    Text,
    /// Container whose `TranslateX` offsets its children.
    Group,
}

/// Visual attribute names understood by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attr {
    X,
    Y,
    Width,
    Height,
    Cx,
    Cy,
    R,
    CornerRadius,
    TranslateX,
    Fill,
    Stroke,
    StrokeWidth,
    Opacity,
    PathData,
    Text,
    FontSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Number(f64),
    Color(Color),
    Text(String),
}

impl AttrValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Color> for AttrValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Small ordered attribute set; setting an existing attribute replaces it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    entries: SmallVec<[(Attr, AttrValue); 8]>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, attr: Attr, value: impl Into<AttrValue>) -> Self {
        self.set(attr, value);
        self
    }

    pub fn set(&mut self, attr: Attr, value: impl Into<AttrValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == attr) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((attr, value)),
        }
    }

    #[must_use]
    pub fn get(&self, attr: Attr) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(name, _)| *name == attr)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn number(&self, attr: Attr) -> Option<f64> {
        self.get(attr).and_then(AttrValue::as_number)
    }

    #[must_use]
    pub fn color(&self, attr: Attr) -> Option<Color> {
        self.get(attr).and_then(AttrValue::as_color)
    }

    #[must_use]
    pub fn text(&self, attr: Attr) -> Option<&str> {
        self.get(attr).and_then(AttrValue::as_text)
    }

    /// Overwrites every attribute present in `other`.
    pub fn merge(&mut self, other: &Attributes) {
        for (attr, value) in other.iter() {
            self.set(*attr, value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Attr, AttrValue)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One visual primitive bound to exactly one key.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedElement {
    id: ElementId,
    key: Key,
    kind: MarkKind,
    parent: Option<Key>,
    attributes: Attributes,
    exiting: bool,
}

impl RenderedElement {
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    #[must_use]
    pub fn kind(&self) -> MarkKind {
        self.kind
    }

    /// Key of the enclosing group element, for nested joins.
    #[must_use]
    pub fn parent(&self) -> Option<&Key> {
        self.parent.as_ref()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Key>) {
        self.parent = parent;
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    #[must_use]
    pub fn number(&self, attr: Attr) -> Option<f64> {
        self.attributes.number(attr)
    }

    /// `true` while the element is animating out ahead of removal.
    #[must_use]
    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    pub(crate) fn set_exiting(&mut self, exiting: bool) {
        self.exiting = exiting;
    }
}

/// Keyed, insertion-ordered element storage owned by one scene.
#[derive(Debug, Default)]
pub struct ElementStore {
    next_id: u64,
    elements: IndexMap<Key, RenderedElement>,
    ids: HashMap<ElementId, Key>,
}

impl ElementStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new element; any element already stored under `key` is replaced.
    pub fn insert(
        &mut self,
        key: Key,
        kind: MarkKind,
        parent: Option<Key>,
        attributes: Attributes,
    ) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        if let Some(previous) = self.elements.get(&key) {
            self.ids.remove(&previous.id);
        }
        self.ids.insert(id, key.clone());
        self.elements.insert(
            key.clone(),
            RenderedElement {
                id,
                key,
                kind,
                parent,
                attributes,
                exiting: false,
            },
        );
        id
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RenderedElement> {
        self.elements.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut RenderedElement> {
        self.elements.get_mut(key)
    }

    #[must_use]
    pub fn by_id(&self, id: ElementId) -> Option<&RenderedElement> {
        self.ids.get(&id).and_then(|key| self.elements.get(key))
    }

    pub fn by_id_mut(&mut self, id: ElementId) -> Option<&mut RenderedElement> {
        let key = self.ids.get(&id)?;
        self.elements.get_mut(key)
    }

    pub fn remove_by_id(&mut self, id: ElementId) -> Option<RenderedElement> {
        let key = self.ids.remove(&id)?;
        self.elements.shift_remove(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.elements.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderedElement> {
        self.elements.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RenderedElement> {
        self.elements.values_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
