use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::charts::filters::{CAP_FALLBACK, clamp_cap};
use crate::charts::{ChartView, frame_viewport};
use crate::core::axis::{format_percent, linear_axis};
use crate::core::{
    AxisOrient, Color, CountryIndicators, Key, LinearScale, Margins, PlotArea,
    SequentialColorScale, SqrtScale, Viewport,
};
use crate::error::ChartResult;
use crate::interaction::{
    BrushEvent, BrushGesture, BrushOutcome, BrushRect, EventChannel, SelectionBroadcaster,
    SelectionChanged, SelectionSnapshot, SubscriptionId, hit_test,
};
use crate::join::{Attr, Attributes, Encoding, JoinSummary, JoinTiming, MarkKind, RenderedElement, Scene};
use crate::render::{PaintOptions, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterChartConfig {
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default = "default_margins")]
    pub margins: Margins,
    #[serde(default = "default_radius_range")]
    pub radius_range: (f64, f64),
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    #[serde(default = "default_update_ms")]
    pub update_ms: f64,
    #[serde(default = "default_exit_ms")]
    pub exit_ms: f64,
    #[serde(default = "default_cap")]
    pub default_cap: usize,
    #[serde(default = "default_selected_opacity")]
    pub selected_opacity: f64,
    #[serde(default = "default_dimmed_opacity")]
    pub dimmed_opacity: f64,
}

impl Default for ScatterChartConfig {
    fn default() -> Self {
        Self {
            viewport: default_viewport(),
            margins: default_margins(),
            radius_range: default_radius_range(),
            stroke_color: default_stroke_color(),
            update_ms: default_update_ms(),
            exit_ms: default_exit_ms(),
            default_cap: default_cap(),
            selected_opacity: default_selected_opacity(),
            dimmed_opacity: default_dimmed_opacity(),
        }
    }
}

impl ScatterChartConfig {
    #[must_use]
    pub fn with_default_cap(mut self, default_cap: usize) -> Self {
        self.default_cap = default_cap;
        self
    }
}

fn default_viewport() -> Viewport {
    Viewport::new(1100, 520)
}

fn default_margins() -> Margins {
    Margins::new(24.0, 28.0, 56.0, 70.0)
}

fn default_radius_range() -> (f64, f64) {
    (3.0, 14.0)
}

fn default_stroke_color() -> String {
    "#1f3c88".to_owned()
}

fn default_update_ms() -> f64 {
    500.0
}

fn default_exit_ms() -> f64 {
    300.0
}

fn default_cap() -> usize {
    CAP_FALLBACK
}

fn default_selected_opacity() -> f64 {
    0.95
}

fn default_dimmed_opacity() -> f64 {
    0.2
}

const STROKE_WIDTH: f64 = 0.6;
const STROKE_WIDTH_SELECTED: f64 = 1.6;
const STROKE_WIDTH_HOVER: f64 = 1.2;

/// Hover details for one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub title: String,
    pub lines: Vec<String>,
}

struct DotEncoding<'a> {
    x: LinearScale,
    y: LinearScale,
    radius: SqrtScale,
    color: &'a SequentialColorScale,
    stroke: Color,
}

impl Encoding<CountryIndicators> for DotEncoding<'_> {
    fn key(&self, country: &CountryIndicators) -> Key {
        country.name_key()
    }

    fn enter(&self, country: &CountryIndicators) -> Attributes {
        Attributes::new()
            .with(Attr::Cx, self.x.map(country.urban_rate))
            .with(Attr::Cy, self.y.map(country.internet_rate))
            .with(Attr::R, 0.0)
            .with(Attr::Fill, self.color.map(country.internet_rate))
            .with(Attr::Opacity, 0.9)
            .with(Attr::Stroke, self.stroke)
            .with(Attr::StrokeWidth, STROKE_WIDTH)
    }

    fn update(&self, country: &CountryIndicators) -> Attributes {
        Attributes::new()
            .with(Attr::Cx, self.x.map(country.urban_rate))
            .with(Attr::Cy, self.y.map(country.internet_rate))
            .with(Attr::R, self.radius.map(country.internet_rate))
            .with(Attr::Fill, self.color.map(country.internet_rate))
    }

    fn exit(&self, _element: &RenderedElement) -> Attributes {
        Attributes::new().with(Attr::R, 0.0)
    }
}

/// Urbanization against internet use, with a cap on the number of countries
/// and a rectangular brush that publishes the captured countries.
///
/// Points are keyed by full country name. Brush coordinates are plot-area
/// pixels (origin at the top-left corner of the plot).
#[derive(Debug)]
pub struct ScatterChart {
    config: ScatterChartConfig,
    stroke: Color,
    plot: PlotArea,
    records: Vec<CountryIndicators>,
    cap: usize,
    visible: Vec<CountryIndicators>,
    x: LinearScale,
    y: LinearScale,
    radius: SqrtScale,
    color: SequentialColorScale,
    dots: Scene,
    brush: BrushGesture,
    selection: SelectionBroadcaster,
    hovered: Option<Key>,
}

impl ScatterChart {
    pub fn new(records: Vec<CountryIndicators>, config: ScatterChartConfig) -> ChartResult<Self> {
        let stroke = Color::from_hex(&config.stroke_color)?;
        let plot = PlotArea::new(config.viewport, config.margins);
        let x = LinearScale::new((0.0, 100.0), (0.0, plot.width))?.nice(10);
        let y = LinearScale::new((0.0, 100.0), (plot.height, 0.0))?.nice(10);
        let radius = SqrtScale::new((0.0, 100.0), config.radius_range)?;
        let color = SequentialColorScale::blues((0.0, 100.0))?;
        let brush = BrushGesture::new(BrushRect::new(0.0, 0.0, plot.width, plot.height));
        let cap = config.default_cap;

        let mut chart = Self {
            config,
            stroke,
            plot,
            records,
            cap,
            visible: Vec::new(),
            x,
            y,
            radius,
            color,
            dots: Scene::new("dots", MarkKind::Circle),
            brush,
            selection: SelectionBroadcaster::new("scatter"),
            hovered: None,
        };
        chart.set_cap(cap)?;
        Ok(chart)
    }

    /// Applies free-form cap input (see [`clamp_cap`]); returns the cap used.
    pub fn set_cap_input(&mut self, input: &str) -> ChartResult<usize> {
        let cap = clamp_cap(input);
        self.set_cap(cap)?;
        Ok(cap)
    }

    /// Shows the first `cap` countries in file order.
    ///
    /// Any brush and selection are cleared, with one notification.
    pub fn set_cap(&mut self, cap: usize) -> ChartResult<JoinSummary> {
        let visible: Vec<CountryIndicators> = self.records.iter().take(cap).cloned().collect();
        let encoding = DotEncoding {
            x: self.x,
            y: self.y,
            radius: self.radius,
            color: &self.color,
            stroke: self.stroke,
        };
        let timing = JoinTiming::new(self.config.update_ms, self.config.exit_ms);
        let summary = self.dots.join(&visible, &encoding, timing)?;

        self.cap = cap;
        self.visible = visible;
        self.brush.clear();
        self.selection.clear();
        self.apply_selection_styles();
        debug!(cap, shown = self.visible.len(), "scatter subset updated");
        Ok(summary)
    }

    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }

    #[must_use]
    pub fn visible(&self) -> &[CountryIndicators] {
        &self.visible
    }

    #[must_use]
    pub fn count_label(&self) -> String {
        format!("Showing {} countries", self.visible.len())
    }

    pub fn brush_start(&mut self, x: f64, y: f64) -> BrushOutcome {
        let event = self.brush.pointer_down(x, y);
        self.apply_brush(event)
    }

    /// `None` when no drag is in progress.
    pub fn brush_move(&mut self, x: f64, y: f64) -> Option<BrushOutcome> {
        let event = self.brush.pointer_move(x, y)?;
        Some(self.apply_brush(event))
    }

    pub fn brush_end(&mut self, x: f64, y: f64) -> Option<BrushOutcome> {
        let event = self.brush.pointer_up(x, y)?;
        Some(self.apply_brush(event))
    }

    /// Removes the brush (double-click).
    pub fn brush_clear(&mut self) -> BrushOutcome {
        let event = self.brush.clear();
        self.apply_brush(event)
    }

    /// Brushes `rect` in one step, as if dragged corner to corner.
    pub fn brush_region(&mut self, rect: BrushRect) -> BrushOutcome {
        self.brush_start(rect.x0, rect.y0);
        self.brush_move(rect.x1, rect.y1);
        self.brush_end(rect.x1, rect.y1)
            .unwrap_or(BrushOutcome::Cleared)
    }

    #[must_use]
    pub fn brush_selection(&self) -> Option<BrushRect> {
        self.brush.selection()
    }

    fn apply_brush(&mut self, event: BrushEvent) -> BrushOutcome {
        let region = event.selection.filter(|rect| !rect.is_degenerate());
        let outcome = match region {
            Some(rect) => BrushOutcome::Region(hit_test(
                Some(&rect),
                &self.visible,
                self.x,
                self.y,
                |country| (country.name_key(), country.urban_rate, country.internet_rate),
            )),
            None => BrushOutcome::Cleared,
        };
        match &outcome {
            BrushOutcome::Region(keys) => self.selection.replace(keys.iter().cloned()),
            BrushOutcome::Cleared => self.selection.clear(),
        }
        self.apply_selection_styles();
        outcome
    }

    /// Tooltip for the point under the pointer, and hover stroke.
    pub fn pointer_enter(&mut self, key: &str) -> Option<Tooltip> {
        let country = self.visible.iter().find(|country| country.name == key)?;
        let tooltip = Tooltip {
            title: country.name.clone(),
            lines: vec![
                format!("Urban rate: {:.1}%", country.urban_rate),
                format!("Internet: {:.1}%", country.internet_rate),
            ],
        };
        self.hovered = Some(Key::from(key));
        self.apply_selection_styles();
        Some(tooltip)
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = None;
        self.apply_selection_styles();
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionSnapshot {
        self.selection.selection()
    }

    pub fn subscribe(&self, handler: impl FnMut(&SelectionChanged) + 'static) -> SubscriptionId {
        self.selection.subscribe(handler)
    }

    #[must_use]
    pub fn selection_channel(&self) -> EventChannel<SelectionChanged> {
        self.selection.channel()
    }

    #[must_use]
    pub fn x_scale(&self) -> LinearScale {
        self.x
    }

    #[must_use]
    pub fn y_scale(&self) -> LinearScale {
        self.y
    }

    #[must_use]
    pub fn radius_scale(&self) -> SqrtScale {
        self.radius
    }

    #[must_use]
    pub fn plot_area(&self) -> PlotArea {
        self.plot
    }

    #[must_use]
    pub fn dots(&self) -> &Scene {
        &self.dots
    }

    fn apply_selection_styles(&mut self) {
        let selection = self.selection.selection();
        let hovered = self.hovered.as_ref();
        let (selected_opacity, dimmed_opacity) =
            (self.config.selected_opacity, self.config.dimmed_opacity);
        self.dots.restyle(|element| {
            let key = element.key().as_str();
            let opacity = if selection.admits(key) {
                selected_opacity
            } else {
                dimmed_opacity
            };
            let stroke_width = if selection.contains(key) {
                STROKE_WIDTH_SELECTED
            } else if hovered.is_some_and(|hovered| hovered.as_str() == key) {
                STROKE_WIDTH_HOVER
            } else {
                STROKE_WIDTH
            };
            let attrs = element.attributes_mut();
            attrs.set(Attr::Opacity, opacity);
            attrs.set(Attr::StrokeWidth, stroke_width);
        });
    }
}

impl ChartView for ScatterChart {
    fn view_id(&self) -> &'static str {
        "scatter-chart"
    }

    fn tick(&mut self, now_ms: f64) -> bool {
        self.dots.tick(now_ms);
        self.is_animating()
    }

    fn is_animating(&self) -> bool {
        self.dots.is_animating()
    }

    fn render_frame(&self) -> RenderFrame {
        let origin = (self.plot.origin_x, self.plot.origin_y);
        let mut frame = RenderFrame::new(frame_viewport(
            self.config.viewport,
            self.config.margins,
            self.plot,
        ));
        let ink = Color::rgb8(0x22, 0x22, 0x22);

        frame.paint_axis(
            &linear_axis(AxisOrient::Bottom, self.plot.height, self.x, 10, format_percent),
            origin,
        );
        frame.paint_axis(
            &linear_axis(AxisOrient::Left, 0.0, self.y, 6, format_percent),
            origin,
        );
        frame.paint_scene(&self.dots, PaintOptions::at(origin));

        if let Some(rect) = self.brush.selection().filter(|rect| !rect.is_degenerate()) {
            frame.rects.push(
                RectPrimitive::new(
                    origin.0 + rect.x0,
                    origin.1 + rect.y0,
                    rect.width(),
                    rect.height(),
                    Color::rgb8(0x77, 0x77, 0x77),
                )
                .with_opacity(0.3),
            );
        }

        frame.texts.push(TextPrimitive::new(
            "Urbanization rate (%)",
            origin.0 + self.plot.width / 2.0,
            origin.1 + self.plot.height + 42.0,
            12.0,
            ink,
            TextHAlign::Center,
        ));
        frame.texts.push(TextPrimitive::new(
            "Internet use (%)",
            origin.0 - 48.0,
            origin.1 - 8.0,
            12.0,
            ink,
            TextHAlign::Left,
        ));
        frame.texts.push(TextPrimitive::new(
            self.count_label(),
            origin.0 + self.plot.width,
            origin.1 - 8.0,
            12.0,
            ink,
            TextHAlign::Right,
        ));
        frame
    }
}
