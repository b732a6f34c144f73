use serde::{Deserialize, Serialize};

use crate::core::scale::{BandScale, LinearScale};

/// Which side of the plot an axis is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisOrient {
    Top,
    Right,
    Bottom,
    Left,
}

/// One labelled tick, `position` in plot-area pixels along the axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

/// A fully resolved axis ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub orient: AxisOrient,
    /// Offset of the axis line from the plot origin, perpendicular to it.
    pub offset: f64,
    pub range: (f64, f64),
    pub ticks: Vec<AxisTick>,
}

#[must_use]
pub fn linear_axis(
    orient: AxisOrient,
    offset: f64,
    scale: LinearScale,
    count: usize,
    format: impl Fn(f64) -> String,
) -> Axis {
    let ticks = scale
        .ticks(count)
        .into_iter()
        .map(|value| AxisTick {
            position: scale.map(value),
            label: format(value),
        })
        .collect();
    Axis {
        orient,
        offset,
        range: scale.range(),
        ticks,
    }
}

#[must_use]
pub fn band_axis(orient: AxisOrient, offset: f64, scale: &BandScale, range: (f64, f64)) -> Axis {
    let ticks = scale
        .domain()
        .filter_map(|key| {
            scale.center(key.as_str()).map(|position| AxisTick {
                position,
                label: key.to_string(),
            })
        })
        .collect();
    Axis {
        orient,
        offset,
        range,
        ticks,
    }
}

/// Shortest decimal form: `40` instead of `40.0`, `0.2` stays `0.2`.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let text = format!("{value:.6}");
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value))
}

#[must_use]
pub fn format_integer(value: f64) -> String {
    format!("{}", value.round() as i64)
}

/// Whole number with `,` thousands separators.
#[must_use]
pub fn format_grouped(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[must_use]
pub fn format_currency(value: f64) -> String {
    format!("${}", format_grouped(value))
}

#[cfg(test)]
mod tests {
    use super::{format_currency, format_number, format_percent};

    #[test]
    fn formats_match_axis_conventions() {
        assert_eq!(format_percent(40.0), "40%");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_currency(81_647.0), "$81,647");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000");
    }
}
