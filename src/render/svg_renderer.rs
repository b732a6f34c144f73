use std::fmt::Write as _;

use tracing::debug;

use crate::core::Color;
use crate::core::line_path::format_coord;
use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer, TextHAlign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SvgRenderStats {
    pub rects_drawn: usize,
    pub circles_drawn: usize,
    pub paths_drawn: usize,
    pub lines_drawn: usize,
    pub texts_drawn: usize,
}

/// Serializes frames into standalone SVG documents.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    background: Option<Color>,
    document: String,
    last_stats: SvgRenderStats,
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }

    /// Document produced by the last successful `render` call.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> String {
        self.document
    }

    #[must_use]
    pub fn last_stats(&self) -> SvgRenderStats {
        self.last_stats
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn opacity_attr(opacity: f64) -> String {
    if opacity >= 1.0 {
        String::new()
    } else {
        format!(r#" opacity="{}""#, format_coord(opacity))
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;

        let (width, height) = (frame.viewport.width, frame.viewport.height);
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}">"#
        );
        if let Some(background) = self.background {
            let _ = writeln!(
                out,
                r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
                background.to_css()
            );
        }

        for rect in &frame.rects {
            let radius = if rect.corner_radius > 0.0 {
                format!(r#" rx="{}""#, format_coord(rect.corner_radius))
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}"{radius} fill="{}"{}/>"#,
                format_coord(rect.x),
                format_coord(rect.y),
                format_coord(rect.width),
                format_coord(rect.height),
                rect.fill.to_css(),
                opacity_attr(rect.opacity)
            );
        }
        for circle in &frame.circles {
            let _ = writeln!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}" stroke="{}" stroke-width="{}"{}/>"#,
                format_coord(circle.cx),
                format_coord(circle.cy),
                format_coord(circle.r),
                circle.fill.to_css(),
                circle.stroke.to_css(),
                format_coord(circle.stroke_width),
                opacity_attr(circle.opacity)
            );
        }
        for path in &frame.paths {
            let _ = writeln!(
                out,
                r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}"{}/>"#,
                path.data,
                path.stroke.to_css(),
                format_coord(path.stroke_width),
                opacity_attr(path.opacity)
            );
        }
        for line in &frame.lines {
            let _ = writeln!(
                out,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
                format_coord(line.x1),
                format_coord(line.y1),
                format_coord(line.x2),
                format_coord(line.y2),
                line.color.to_css(),
                format_coord(line.stroke_width)
            );
        }
        for text in &frame.texts {
            let anchor = match text.h_align {
                TextHAlign::Left => "start",
                TextHAlign::Center => "middle",
                TextHAlign::Right => "end",
            };
            let _ = writeln!(
                out,
                r#"<text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="{anchor}"{}>{}</text>"#,
                format_coord(text.x),
                format_coord(text.y),
                format_coord(text.font_size_px),
                text.color.to_css(),
                opacity_attr(text.opacity),
                escape_text(&text.text)
            );
        }
        out.push_str("</svg>\n");

        self.last_stats = SvgRenderStats {
            rects_drawn: frame.rects.len(),
            circles_drawn: frame.circles.len(),
            paths_drawn: frame.paths.len(),
            lines_drawn: frame.lines.len(),
            texts_drawn: frame.texts.len(),
        };
        debug!(bytes = out.len(), primitives = frame.primitive_count(), "rendered svg frame");
        self.document = out;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::escape_text;

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape_text("A&B <c>"), "A&amp;B &lt;c&gt;");
    }
}
