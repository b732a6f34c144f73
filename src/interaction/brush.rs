use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Key, LinearScale};

/// Axis-aligned rectangle in plot pixels, corners normalized so that
/// `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BrushRect {
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    #[must_use]
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self::new(a.0, a.1, b.0, b.1)
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.x1 - self.x0
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.y1 - self.y0
    }

    /// Zero-area (or non-finite) rectangles select nothing.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Closed containment: points on the border are inside.
    #[must_use]
    pub fn contains(self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    #[must_use]
    pub fn clamp_point(self, x: f64, y: f64) -> (f64, f64) {
        (x.clamp(self.x0, self.x1), y.clamp(self.y0, self.y1))
    }
}

/// Keys whose projected point falls inside `rect`.
///
/// `None` or a zero-area rectangle yields an empty set. Records whose
/// projected coordinates are not finite never match.
pub fn hit_test<T>(
    rect: Option<&BrushRect>,
    data: &[T],
    x_scale: LinearScale,
    y_scale: LinearScale,
    accessor: impl Fn(&T) -> (Key, f64, f64),
) -> IndexSet<Key> {
    let Some(rect) = rect.copied().filter(|rect| !rect.is_degenerate()) else {
        return IndexSet::new();
    };

    let hits: IndexSet<Key> = data
        .iter()
        .filter_map(|datum| {
            let (key, x, y) = accessor(datum);
            let (px, py) = (x_scale.map(x), y_scale.map(y));
            (px.is_finite() && py.is_finite() && rect.contains(px, py)).then_some(key)
        })
        .collect();
    trace!(candidates = data.len(), hits = hits.len(), "brush hit test");
    hits
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushPhase {
    Start,
    Brush,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushEvent {
    pub phase: BrushPhase,
    /// `None` once the brush has been cleared.
    pub selection: Option<BrushRect>,
}

/// What a view should do with a finished brush gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrushOutcome {
    /// The brush was removed: no filter.
    Cleared,
    /// Keys captured by the brushed region (possibly none).
    Region(IndexSet<Key>),
}

/// Pointer-driven rectangular brush confined to a plot extent.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushGesture {
    extent: BrushRect,
    anchor: Option<(f64, f64)>,
    selection: Option<BrushRect>,
}

impl BrushGesture {
    #[must_use]
    pub fn new(extent: BrushRect) -> Self {
        Self {
            extent,
            anchor: None,
            selection: None,
        }
    }

    #[must_use]
    pub fn extent(&self) -> BrushRect {
        self.extent
    }

    #[must_use]
    pub fn selection(&self) -> Option<BrushRect> {
        self.selection
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> BrushEvent {
        let point = self.extent.clamp_point(x, y);
        self.anchor = Some(point);
        self.selection = Some(BrushRect::from_corners(point, point));
        BrushEvent {
            phase: BrushPhase::Start,
            selection: self.selection,
        }
    }

    /// Ignored (returns `None`) when no drag is in progress.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<BrushEvent> {
        let anchor = self.anchor?;
        let point = self.extent.clamp_point(x, y);
        self.selection = Some(BrushRect::from_corners(anchor, point));
        Some(BrushEvent {
            phase: BrushPhase::Brush,
            selection: self.selection,
        })
    }

    /// Finishes the drag; a click without movement clears the brush.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<BrushEvent> {
        let anchor = self.anchor.take()?;
        let point = self.extent.clamp_point(x, y);
        let rect = BrushRect::from_corners(anchor, point);
        self.selection = (!rect.is_degenerate()).then_some(rect);
        Some(BrushEvent {
            phase: BrushPhase::End,
            selection: self.selection,
        })
    }

    /// Programmatic removal of the brush.
    pub fn clear(&mut self) -> BrushEvent {
        self.anchor = None;
        self.selection = None;
        BrushEvent {
            phase: BrushPhase::End,
            selection: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BrushGesture, BrushPhase, BrushRect};

    #[test]
    fn corners_are_normalized() {
        let rect = BrushRect::new(10.0, 20.0, 0.0, 5.0);
        assert_eq!(rect, BrushRect::new(0.0, 5.0, 10.0, 20.0));
        assert!(rect.contains(10.0, 20.0));
        assert!(!rect.contains(10.1, 20.0));
    }

    #[test]
    fn drag_is_clamped_to_extent() {
        let mut gesture = BrushGesture::new(BrushRect::new(0.0, 0.0, 100.0, 50.0));
        gesture.pointer_down(-10.0, 10.0);
        let event = gesture.pointer_move(500.0, 500.0).expect("dragging");
        assert_eq!(event.phase, BrushPhase::Brush);
        assert_eq!(event.selection, Some(BrushRect::new(0.0, 10.0, 100.0, 50.0)));
    }

    #[test]
    fn click_without_drag_clears() {
        let mut gesture = BrushGesture::new(BrushRect::new(0.0, 0.0, 100.0, 50.0));
        gesture.pointer_down(20.0, 20.0);
        let event = gesture.pointer_up(20.0, 20.0).expect("was dragging");
        assert_eq!(event.selection, None);
        assert!(gesture.pointer_move(30.0, 30.0).is_none());
    }
}
