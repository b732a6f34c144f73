use indexmap::IndexSet;

use crate::core::types::Key;
use crate::error::{ChartError, ChartResult};

fn ensure_finite_pair(name: &str, pair: (f64, f64)) -> ChartResult<()> {
    if !pair.0.is_finite() || !pair.1.is_finite() {
        return Err(ChartError::InvalidData(format!(
            "{name} bounds must be finite, got [{}, {}]",
            pair.0, pair.1
        )));
    }
    Ok(())
}

fn interpolate(range: (f64, f64), t: f64) -> f64 {
    range.0 * (1.0 - t) + range.1 * t
}

/// Continuous mapping from a numeric domain onto a pixel range.
///
/// A zero-width domain maps every value to the middle of the range instead of
/// failing, so a single-record subset still renders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        ensure_finite_pair("scale domain", domain)?;
        ensure_finite_pair("scale range", range)?;
        Ok(Self { domain, range })
    }

    /// Builds a scale over the `[min, max]` extent of `values`.
    ///
    /// Non-finite values are ignored; an empty extent falls back to `fallback`.
    pub fn from_extent(
        values: impl IntoIterator<Item = f64>,
        range: (f64, f64),
        fallback: (f64, f64),
    ) -> ChartResult<Self> {
        Self::new(extent(values).unwrap_or(fallback), range)
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        interpolate(self.range, t)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let (r0, r1) = self.range;
        let span = r1 - r0;
        let t = if span == 0.0 { 0.5 } else { (pixel - r0) / span };
        interpolate(self.domain, t)
    }

    /// Extends the domain to round values so that it starts and ends on
    /// multiples of the tick step for roughly `count` ticks.
    ///
    /// A zero-width domain, or one whose step never settles, is returned
    /// unchanged.
    #[must_use]
    pub fn nice(self, count: usize) -> Self {
        let (mut start, mut stop) = self.domain;
        if start == stop || count == 0 {
            return self;
        }
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }

        let mut previous_step = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count as f64);
            if !step.is_finite() || step == 0.0 {
                return self;
            }
            if previous_step == Some(step) {
                let domain = if reversed { (stop, start) } else { (start, stop) };
                return Self { domain, ..self };
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            }
            previous_step = Some(step);
        }
        self
    }

    /// Round tick values inside the domain, approximately `count` of them.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count as f64)
    }
}

/// `[min, max]` over the finite values, or `None` when there are none.
#[must_use]
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

fn step_factor(error: f64) -> f64 {
    if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    }
}

/// Tick step for `[start, stop]`; negative values encode `1 / |step|` for
/// sub-unit steps so round values stay exact.
#[must_use]
pub fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let factor = step_factor(step / 10f64.powf(power));
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let factor = step_factor(step / 10f64.powf(power));

    let (mut i1, mut i2, increment);
    if power < 0.0 {
        let inc = 10f64.powf(-power) / factor;
        i1 = (start * inc).round();
        i2 = (stop * inc).round();
        if i1 / inc < start {
            i1 += 1.0;
        }
        if i2 / inc > stop {
            i2 -= 1.0;
        }
        increment = -inc;
    } else {
        let inc = 10f64.powf(power) * factor;
        i1 = (start / inc).round();
        i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
        increment = inc;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, increment)
}

#[must_use]
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reversed = stop < start;
    let (lo, hi) = if reversed { (stop, start) } else { (start, stop) };
    let (i1, i2, increment) = tick_spec(lo, hi, count);
    if !(i2 >= i1) {
        return Vec::new();
    }

    let n = (i2 - i1) as usize + 1;
    let mut values: Vec<f64> = (0..n)
        .map(|i| {
            let index = i1 + i as f64;
            if increment < 0.0 {
                index / -increment
            } else {
                index * increment
            }
        })
        .collect();
    if reversed {
        values.reverse();
    }
    values
}

/// Ordinal mapping from an ordered category set onto evenly spaced bands.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: IndexSet<Key>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
    start: f64,
    step: f64,
    bandwidth: f64,
    reversed: bool,
}

impl BandScale {
    /// Creates a band scale with equal inner and outer `padding`.
    pub fn new(
        domain: impl IntoIterator<Item = Key>,
        range: (f64, f64),
        padding: f64,
    ) -> ChartResult<Self> {
        Self::with_paddings(domain, range, padding, padding)
    }

    pub fn with_paddings(
        domain: impl IntoIterator<Item = Key>,
        range: (f64, f64),
        padding_inner: f64,
        padding_outer: f64,
    ) -> ChartResult<Self> {
        ensure_finite_pair("band range", range)?;
        if !(0.0..=1.0).contains(&padding_inner) || !padding_outer.is_finite() || padding_outer < 0.0
        {
            return Err(ChartError::InvalidData(format!(
                "band padding must be inner in [0, 1] and outer >= 0, got {padding_inner}/{padding_outer}"
            )));
        }

        let mut scale = Self {
            domain: domain.into_iter().collect(),
            range,
            padding_inner,
            padding_outer,
            align: 0.5,
            start: 0.0,
            step: 0.0,
            bandwidth: 0.0,
            reversed: false,
        };
        scale.rescale();
        Ok(scale)
    }

    fn rescale(&mut self) {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        self.reversed = r1 < r0;
        let (start, stop) = if self.reversed { (r1, r0) } else { (r0, r1) };

        self.step = (stop - start) / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        self.start = start + (stop - start - self.step * (n - self.padding_inner)) * self.align;
        self.bandwidth = self.step * (1.0 - self.padding_inner);
    }

    #[must_use]
    pub fn domain(&self) -> impl Iterator<Item = &Key> {
        self.domain.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Start offset of the band for `key`; `None` for unknown categories.
    #[must_use]
    pub fn map(&self, key: &str) -> Option<f64> {
        let index = self.domain.get_index_of(key)?;
        let index = if self.reversed {
            self.domain.len() - 1 - index
        } else {
            index
        };
        Some(self.start + self.step * index as f64)
    }

    /// Center of the band for `key`.
    #[must_use]
    pub fn center(&self, key: &str) -> Option<f64> {
        self.map(key).map(|start| start + self.bandwidth * 0.5)
    }
}

/// Square-root mapping, used for sizes encoded as circle radii.
///
/// With a zero-origin domain and range the radius is `k * sqrt(value)`, so the
/// drawn area grows linearly with the value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    domain: (f64, f64),
    range: (f64, f64),
}

fn signed_sqrt(value: f64) -> f64 {
    value.abs().sqrt().copysign(value)
}

impl SqrtScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        ensure_finite_pair("sqrt domain", domain)?;
        ensure_finite_pair("sqrt range", range)?;
        Ok(Self { domain, range })
    }

    /// `[0, max_value] -> [0, max_radius]`.
    pub fn area_proportional(max_value: f64, max_radius: f64) -> ChartResult<Self> {
        Self::new((0.0, max_value), (0.0, max_radius))
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let d0 = signed_sqrt(self.domain.0);
        let d1 = signed_sqrt(self.domain.1);
        let span = d1 - d0;
        let t = if span == 0.0 {
            0.5
        } else {
            (signed_sqrt(value) - d0) / span
        };
        interpolate(self.range, t)
    }
}
