//! SVG path data for line marks.
//!
//! Points with a non-finite coordinate are treated as undefined: they break
//! the line into separate sub-paths instead of being drawn.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Curve {
    /// Straight segments between consecutive points.
    Linear,
    /// Cubic segments that preserve monotonicity in y for x-sorted input.
    #[default]
    MonotoneX,
}

/// Three-decimal coordinate with trailing zeros trimmed.
pub(crate) fn format_coord(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_owned()
    } else {
        text.to_owned()
    }
}

struct PathWriter {
    out: String,
}

impl PathWriter {
    fn move_to(&mut self, x: f64, y: f64) {
        let _ = write!(self.out, "M{},{}", format_coord(x), format_coord(y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let _ = write!(self.out, "L{},{}", format_coord(x), format_coord(y));
    }

    fn bezier_to(&mut self, c1: (f64, f64), c2: (f64, f64), end: (f64, f64)) {
        let _ = write!(
            self.out,
            "C{},{},{},{},{},{}",
            format_coord(c1.0),
            format_coord(c1.1),
            format_coord(c2.0),
            format_coord(c2.1),
            format_coord(end.0),
            format_coord(end.1)
        );
    }

    fn close(&mut self) {
        self.out.push('Z');
    }
}

fn sign(value: f64) -> f64 {
    if value < 0.0 { -1.0 } else { 1.0 }
}

/// Fritsch-Carlson style tangent state for one sub-path.
struct MonotoneSegment {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    t0: f64,
    point: u8,
}

impl MonotoneSegment {
    fn new() -> Self {
        Self {
            x0: f64::NAN,
            y0: f64::NAN,
            x1: f64::NAN,
            y1: f64::NAN,
            t0: f64::NAN,
            point: 0,
        }
    }

    fn slope3(&self, x2: f64, y2: f64) -> f64 {
        let h0 = self.x1 - self.x0;
        let h1 = x2 - self.x1;
        let s0 = (self.y1 - self.y0) / if h0 != 0.0 { h0 } else if h1 < 0.0 { -0.0 } else { 0.0 };
        let s1 = (y2 - self.y1) / if h1 != 0.0 { h1 } else if h0 < 0.0 { -0.0 } else { 0.0 };
        let p = (s0 * h1 + s1 * h0) / (h0 + h1);
        let slope = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
        if slope.is_finite() { slope } else { 0.0 }
    }

    fn slope2(&self, t: f64) -> f64 {
        let h = self.x1 - self.x0;
        if h != 0.0 {
            (3.0 * (self.y1 - self.y0) / h - t) / 2.0
        } else {
            t
        }
    }

    fn curve(&self, writer: &mut PathWriter, t0: f64, t1: f64) {
        let dx = (self.x1 - self.x0) / 3.0;
        writer.bezier_to(
            (self.x0 + dx, self.y0 + dx * t0),
            (self.x1 - dx, self.y1 - dx * t1),
            (self.x1, self.y1),
        );
    }

    fn push(&mut self, writer: &mut PathWriter, x: f64, y: f64) {
        if x == self.x1 && y == self.y1 {
            return;
        }
        let mut t1 = f64::NAN;
        match self.point {
            0 => {
                self.point = 1;
                writer.move_to(x, y);
            }
            1 => self.point = 2,
            2 => {
                self.point = 3;
                t1 = self.slope3(x, y);
                let t0 = self.slope2(t1);
                self.curve(writer, t0, t1);
            }
            _ => {
                t1 = self.slope3(x, y);
                self.curve(writer, self.t0, t1);
            }
        }
        self.x0 = self.x1;
        self.x1 = x;
        self.y0 = self.y1;
        self.y1 = y;
        self.t0 = t1;
    }

    fn finish(&mut self, writer: &mut PathWriter) {
        match self.point {
            1 => writer.close(),
            2 => writer.line_to(self.x1, self.y1),
            3 => {
                let t1 = self.slope2(self.t0);
                self.curve(writer, self.t0, t1);
            }
            _ => {}
        }
    }
}

fn defined_runs(points: &[(f64, f64)]) -> impl Iterator<Item = &[(f64, f64)]> {
    points
        .split(|(x, y)| !x.is_finite() || !y.is_finite())
        .filter(|run| !run.is_empty())
}

/// Builds SVG path data for `points` (already in pixel space).
#[must_use]
pub fn line_path(points: &[(f64, f64)], curve: Curve) -> String {
    let mut writer = PathWriter { out: String::new() };
    for run in defined_runs(points) {
        match curve {
            Curve::Linear => {
                let (x, y) = run[0];
                writer.move_to(x, y);
                for &(x, y) in &run[1..] {
                    writer.line_to(x, y);
                }
                if run.len() == 1 {
                    writer.close();
                }
            }
            Curve::MonotoneX => {
                let mut segment = MonotoneSegment::new();
                for &(x, y) in run {
                    segment.push(&mut writer, x, y);
                }
                segment.finish(&mut writer);
            }
        }
    }
    writer.out
}

#[cfg(test)]
mod tests {
    use super::{Curve, line_path};

    #[test]
    fn linear_path_joins_points() {
        let path = line_path(&[(0.0, 10.0), (5.5, 2.0), (10.0, 0.0)], Curve::Linear);
        assert_eq!(path, "M0,10L5.5,2L10,0");
    }

    #[test]
    fn undefined_points_split_sub_paths() {
        let path = line_path(
            &[(0.0, 0.0), (1.0, 1.0), (2.0, f64::NAN), (3.0, 3.0), (4.0, 4.0)],
            Curve::Linear,
        );
        assert_eq!(path, "M0,0L1,1M3,3L4,4");
    }

    #[test]
    fn isolated_point_is_closed() {
        assert_eq!(line_path(&[(1.0, 2.0)], Curve::Linear), "M1,2Z");
        assert_eq!(line_path(&[(1.0, 2.0)], Curve::MonotoneX), "M1,2Z");
    }

    #[test]
    fn monotone_two_points_is_a_straight_segment() {
        assert_eq!(
            line_path(&[(0.0, 0.0), (10.0, 10.0)], Curve::MonotoneX),
            "M0,0L10,10"
        );
    }

    #[test]
    fn monotone_collinear_points_stay_on_the_line() {
        let path = line_path(&[(0.0, 0.0), (3.0, 3.0), (6.0, 6.0)], Curve::MonotoneX);
        assert_eq!(path, "M0,0C1,1,2,2,3,3C4,4,5,5,6,6");
    }

    #[test]
    fn empty_input_yields_empty_path() {
        assert!(line_path(&[], Curve::MonotoneX).is_empty());
    }
}
