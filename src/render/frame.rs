use crate::core::{Axis, AxisOrient, Color, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::join::{Attr, MarkKind, RenderedElement, Scene};
use crate::render::{
    CirclePrimitive, LinePrimitive, PathPrimitive, RectPrimitive, TextHAlign, TextPrimitive,
};

const AXIS_TICK_SIZE: f64 = 6.0;
const AXIS_FONT_PX: f64 = 11.0;
const DEFAULT_FONT_PX: f64 = 12.0;

/// How a [`Scene`] is placed into a frame.
#[derive(Debug, Clone, Copy)]
pub struct PaintOptions<'a> {
    /// Pixel offset of the scene's coordinate system (the plot origin).
    pub origin: (f64, f64),
    pub text_align: TextHAlign,
    /// Group elements whose `TranslateX` shifts children by parent key.
    pub groups: Option<&'a Scene>,
}

impl<'a> PaintOptions<'a> {
    #[must_use]
    pub fn at(origin: (f64, f64)) -> Self {
        Self {
            origin,
            text_align: TextHAlign::Left,
            groups: None,
        }
    }

    #[must_use]
    pub fn with_text_align(mut self, text_align: TextHAlign) -> Self {
        self.text_align = text_align;
        self
    }

    #[must_use]
    pub fn with_groups(mut self, groups: &'a Scene) -> Self {
        self.groups = Some(groups);
        self
    }

    fn offset_of(&self, element: &RenderedElement) -> (f64, f64) {
        let shift = element
            .parent()
            .and_then(|parent| self.groups.and_then(|groups| groups.get(parent.as_str())))
            .and_then(|group| group.number(Attr::TranslateX))
            .unwrap_or(0.0);
        (self.origin.0 + shift, self.origin.1)
    }
}

/// Backend-agnostic scene for one chart draw pass.
///
/// Primitives are drawn in the order rects, circles, paths, lines, texts.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub rects: Vec<RectPrimitive>,
    pub circles: Vec<CirclePrimitive>,
    pub paths: Vec<PathPrimitive>,
    pub lines: Vec<LinePrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            rects: Vec::new(),
            circles: Vec::new(),
            paths: Vec::new(),
            lines: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_line(mut self, line: LinePrimitive) -> Self {
        self.lines.push(line);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: TextPrimitive) -> Self {
        self.texts.push(text);
        self
    }

    #[must_use]
    pub fn with_rect(mut self, rect: RectPrimitive) -> Self {
        self.rects.push(rect);
        self
    }

    /// Converts every element of `scene` (exiting ones included) into
    /// primitives. Group elements only contribute their translation.
    pub fn paint_scene(&mut self, scene: &Scene, options: PaintOptions<'_>) {
        for element in scene.elements() {
            let (ox, oy) = options.offset_of(element);
            let attrs = element.attributes();
            let number = |attr: Attr| attrs.number(attr).unwrap_or(0.0);
            let opacity = attrs.number(Attr::Opacity).unwrap_or(1.0).clamp(0.0, 1.0);
            let fill = attrs.color(Attr::Fill).unwrap_or(Color::BLACK);

            match element.kind() {
                MarkKind::Rect => self.rects.push(
                    RectPrimitive::new(
                        ox + number(Attr::X),
                        oy + number(Attr::Y),
                        number(Attr::Width).max(0.0),
                        number(Attr::Height).max(0.0),
                        fill,
                    )
                    .with_corner_radius(number(Attr::CornerRadius).max(0.0))
                    .with_opacity(opacity),
                ),
                MarkKind::Circle => self.circles.push(
                    CirclePrimitive::new(
                        ox + number(Attr::Cx),
                        oy + number(Attr::Cy),
                        number(Attr::R).max(0.0),
                        fill,
                    )
                    .with_stroke(
                        attrs.color(Attr::Stroke).unwrap_or(Color::WHITE),
                        number(Attr::StrokeWidth).max(0.0),
                    )
                    .with_opacity(opacity),
                ),
                MarkKind::Path => {
                    let Some(data) = attrs.text(Attr::PathData).filter(|d| !d.is_empty()) else {
                        continue;
                    };
                    let stroke = attrs.color(Attr::Stroke).unwrap_or(fill);
                    let width = attrs.number(Attr::StrokeWidth).unwrap_or(1.5);
                    self.paths.push(
                        PathPrimitive::new(translate_path(data, ox, oy), stroke, width)
                            .with_opacity(opacity),
                    );
                }
                MarkKind::Text => {
                    let Some(text) = attrs.text(Attr::Text).filter(|t| !t.is_empty()) else {
                        continue;
                    };
                    self.texts.push(
                        TextPrimitive::new(
                            text,
                            ox + number(Attr::X),
                            oy + number(Attr::Y),
                            attrs.number(Attr::FontSize).unwrap_or(DEFAULT_FONT_PX),
                            fill,
                            options.text_align,
                        )
                        .with_opacity(opacity),
                    );
                }
                MarkKind::Group => {}
            }
        }
    }

    /// Axis line, tick marks and tick labels relative to `origin`.
    pub fn paint_axis(&mut self, axis: &Axis, origin: (f64, f64)) {
        let color = Color::rgb8(0x33, 0x33, 0x33);
        let (ox, oy) = origin;
        let (start, end) = axis.range;
        match axis.orient {
            AxisOrient::Bottom | AxisOrient::Top => {
                let y = oy + axis.offset;
                let dir = if axis.orient == AxisOrient::Bottom { 1.0 } else { -1.0 };
                self.lines
                    .push(LinePrimitive::new(ox + start, y, ox + end, y, 1.0, color));
                for tick in &axis.ticks {
                    let x = ox + tick.position;
                    self.lines.push(LinePrimitive::new(
                        x,
                        y,
                        x,
                        y + dir * AXIS_TICK_SIZE,
                        1.0,
                        color,
                    ));
                    if !tick.label.is_empty() {
                        let label_y = if dir > 0.0 { y + 18.0 } else { y - 9.0 };
                        self.texts.push(TextPrimitive::new(
                            tick.label.as_str(),
                            x,
                            label_y,
                            AXIS_FONT_PX,
                            color,
                            TextHAlign::Center,
                        ));
                    }
                }
            }
            AxisOrient::Left | AxisOrient::Right => {
                let x = ox + axis.offset;
                let (dir, align) = if axis.orient == AxisOrient::Left {
                    (-1.0, TextHAlign::Right)
                } else {
                    (1.0, TextHAlign::Left)
                };
                self.lines
                    .push(LinePrimitive::new(x, oy + start, x, oy + end, 1.0, color));
                for tick in &axis.ticks {
                    let y = oy + tick.position;
                    self.lines.push(LinePrimitive::new(
                        x,
                        y,
                        x + dir * AXIS_TICK_SIZE,
                        y,
                        1.0,
                        color,
                    ));
                    if !tick.label.is_empty() {
                        self.texts.push(TextPrimitive::new(
                            tick.label.as_str(),
                            x + dir * (AXIS_TICK_SIZE + 3.0),
                            y + 4.0,
                            AXIS_FONT_PX,
                            color,
                            align,
                        ));
                    }
                }
            }
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for rect in &self.rects {
            rect.validate()?;
        }
        for circle in &self.circles {
            circle.validate()?;
        }
        for path in &self.paths {
            path.validate()?;
        }
        for line in &self.lines {
            line.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.rects.len() + self.circles.len() + self.paths.len() + self.lines.len() + self.texts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitive_count() == 0
    }
}

/// Shifts absolute path commands (`M`, `L`, `C`, `Z`) by `(dx, dy)`.
fn translate_path(data: &str, dx: f64, dy: f64) -> String {
    if dx == 0.0 && dy == 0.0 {
        return data.to_owned();
    }
    let mut out = String::with_capacity(data.len() + 16);
    let mut number = String::new();
    let mut index = 0usize;
    let flush = |number: &mut String, index: &mut usize, out: &mut String| {
        if number.is_empty() {
            return;
        }
        let shifted = number
            .parse::<f64>()
            .map(|value| value + if *index % 2 == 0 { dx } else { dy })
            .map(crate::core::line_path::format_coord)
            .unwrap_or_else(|_| number.clone());
        out.push_str(&shifted);
        number.clear();
        *index += 1;
    };
    for ch in data.chars() {
        match ch {
            'M' | 'L' | 'C' | 'Z' => {
                flush(&mut number, &mut index, &mut out);
                index = 0;
                out.push(ch);
            }
            ',' => {
                flush(&mut number, &mut index, &mut out);
                out.push(ch);
            }
            _ => number.push(ch),
        }
    }
    flush(&mut number, &mut index, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::translate_path;

    #[test]
    fn path_translation_shifts_x_and_y_pairs() {
        assert_eq!(translate_path("M0,10L5.5,2Z", 10.0, 1.0), "M10,11L15.5,3Z");
        assert_eq!(
            translate_path("M0,0C1,1,2,2,3,3", 1.0, 0.0),
            "M1,0C2,1,3,2,4,3"
        );
    }
}
