use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of one record and of the element rendered for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Logical size of the drawing surface (the SVG `viewBox`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    #[must_use]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Pixel box the marks are drawn into: viewport minus margins.
///
/// Element coordinates are relative to `(origin_x, origin_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    #[must_use]
    pub fn new(viewport: Viewport, margins: Margins) -> Self {
        Self {
            origin_x: margins.left,
            origin_y: margins.top,
            width: (f64::from(viewport.width) - margins.left - margins.right).max(0.0),
            height: (f64::from(viewport.height) - margins.top - margins.bottom).max(0.0),
        }
    }

    /// Same as [`PlotArea::new`] but never narrower than `min_width`.
    #[must_use]
    pub fn with_min_width(viewport: Viewport, margins: Margins, min_width: f64) -> Self {
        let mut area = Self::new(viewport, margins);
        area.width = area.width.max(min_width);
        area
    }
}

#[cfg(test)]
mod tests {
    use super::{Margins, PlotArea, Viewport};

    #[test]
    fn plot_area_subtracts_margins() {
        let area = PlotArea::new(Viewport::new(900, 400), Margins::new(28.0, 90.0, 42.0, 60.0));
        assert_eq!(area.width, 750.0);
        assert_eq!(area.height, 330.0);
        assert_eq!(area.origin_x, 60.0);
        assert_eq!(area.origin_y, 28.0);
    }

    #[test]
    fn plot_area_never_goes_negative() {
        let area = PlotArea::new(Viewport::new(10, 10), Margins::new(20.0, 20.0, 20.0, 20.0));
        assert_eq!(area.width, 0.0);
        assert_eq!(area.height, 0.0);
    }
}
