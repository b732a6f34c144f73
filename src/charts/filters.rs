//! Filter policies that choose a chart's visible subset.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use ordered_float::OrderedFloat;
use tracing::debug;

use crate::core::InternetUseRecord;

pub const CAP_MIN: usize = 20;
pub const CAP_MAX: usize = 500;
pub const CAP_FALLBACK: usize = 150;

/// Interprets free-form cap input.
///
/// Numbers are truncated toward zero and clamped to `[CAP_MIN, CAP_MAX]`;
/// blank, non-numeric or non-finite input falls back to `CAP_FALLBACK`.
#[must_use]
pub fn clamp_cap(input: &str) -> usize {
    let Some(value) = input.trim().parse::<f64>().ok().filter(|v| v.is_finite()) else {
        debug!(input, fallback = CAP_FALLBACK, "cap input is not a finite number");
        return CAP_FALLBACK;
    };
    let truncated = value.trunc();
    let cap = truncated.clamp(CAP_MIN as f64, CAP_MAX as f64) as usize;
    if cap as f64 != truncated {
        debug!(input, cap, "clamped cap input");
    }
    cap
}

/// Distinct years present, ascending.
#[must_use]
pub fn year_options(records: &[InternetUseRecord]) -> Vec<i32> {
    records
        .iter()
        .map(|record| record.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The most recent year, selected by default.
#[must_use]
pub fn default_year(options: &[i32]) -> Option<i32> {
    options.last().copied()
}

/// The `n` largest items by `value`, descending; ties keep input order.
pub fn top_n_by_value<T>(
    items: impl IntoIterator<Item = T>,
    n: usize,
    value: impl Fn(&T) -> f64,
) -> Vec<T> {
    let mut items: Vec<T> = items.into_iter().collect();
    items.sort_by_key(|item| Reverse(OrderedFloat(value(item))));
    items.truncate(n);
    items
}
