use indexmap::IndexMap;

use crate::core::color::Color;
use crate::core::types::Key;
use crate::error::{ChartError, ChartResult};

/// Nine-step single-hue blue scheme, light to dark.
const BLUES: [&str; 9] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

/// Uniform cubic B-spline basis through four control values.
fn basis(t1: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

fn basis_channel(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let (t, i) = if t <= 0.0 {
        (0.0, 0)
    } else if t >= 1.0 {
        (1.0, n - 1)
    } else {
        (t, (t * n as f64).floor() as usize)
    };
    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 { values[i + 2] } else { 2.0 * v2 - v1 };
    basis((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
}

/// Continuous domain mapped through a smooth multi-stop color ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct SequentialColorScale {
    domain: (f64, f64),
    stops: Vec<Color>,
}

impl SequentialColorScale {
    pub fn new(domain: (f64, f64), stops: Vec<Color>) -> ChartResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(ChartError::InvalidData(
                "color scale domain must be finite".to_owned(),
            ));
        }
        if stops.len() < 2 {
            return Err(ChartError::InvalidData(
                "color ramp needs at least two stops".to_owned(),
            ));
        }
        Ok(Self { domain, stops })
    }

    /// The light-to-dark blue ramp over `domain`.
    pub fn blues(domain: (f64, f64)) -> ChartResult<Self> {
        let stops = BLUES
            .iter()
            .map(|hex| Color::from_hex(hex))
            .collect::<ChartResult<Vec<_>>>()?;
        Self::new(domain, stops)
    }

    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn map(&self, value: f64) -> Color {
        let (d0, d1) = self.domain;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        let t = if t.is_nan() { 0.0 } else { t };

        let channel = |pick: fn(&Color) -> f64| {
            let values: Vec<f64> = self.stops.iter().map(pick).collect();
            basis_channel(&values, t).clamp(0.0, 1.0)
        };
        Color::rgb(
            channel(|c| c.red),
            channel(|c| c.green),
            channel(|c| c.blue),
        )
    }
}

/// Categorical palette lookup; categories outside the domain get `unknown`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalColorScale {
    domain: IndexMap<Key, usize>,
    palette: Vec<Color>,
    unknown: Color,
}

impl OrdinalColorScale {
    pub fn new(domain: impl IntoIterator<Item = Key>, palette: Vec<Color>) -> ChartResult<Self> {
        if palette.is_empty() {
            return Err(ChartError::InvalidData(
                "ordinal palette must not be empty".to_owned(),
            ));
        }
        let mut indexed = IndexMap::new();
        for key in domain {
            let next = indexed.len();
            indexed.entry(key).or_insert(next);
        }
        Ok(Self {
            domain: indexed,
            palette,
            unknown: Color::rgb8(0x99, 0x99, 0x99),
        })
    }

    /// Parses the palette from hex strings.
    pub fn from_hex(domain: impl IntoIterator<Item = Key>, palette: &[String]) -> ChartResult<Self> {
        let colors = palette
            .iter()
            .map(|hex| Color::from_hex(hex))
            .collect::<ChartResult<Vec<_>>>()?;
        Self::new(domain, colors)
    }

    #[must_use]
    pub fn map(&self, key: &str) -> Color {
        self.domain
            .get(key)
            .map_or(self.unknown, |index| self.palette[index % self.palette.len()])
    }
}
