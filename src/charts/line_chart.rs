use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::charts::{ChartView, SelectionListener, frame_viewport};
use crate::core::axis::{format_integer, format_percent, linear_axis};
use crate::core::{
    AxisOrient, Color, Curve, InternetUseRecord, Key, LinearScale, Margins, OrdinalColorScale,
    PlotArea, Viewport, line_path,
};
use crate::error::ChartResult;
use crate::interaction::{SelectionChanged, SelectionSnapshot};
use crate::join::{Attr, Attributes, Encoding, JoinSummary, JoinTiming, MarkKind, RenderedElement, Scene};
use crate::render::{PaintOptions, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive};

const STROKE_HIGHLIGHTED: f64 = 3.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChartConfig {
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default = "default_margins")]
    pub margins: Margins,
    /// Series shown, in legend order.
    #[serde(default = "default_codes")]
    pub codes: Vec<Key>,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default)]
    pub curve: Curve,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default = "default_toggle_ms")]
    pub toggle_ms: f64,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for LineChartConfig {
    fn default() -> Self {
        Self {
            viewport: default_viewport(),
            margins: default_margins(),
            codes: default_codes(),
            palette: default_palette(),
            curve: Curve::default(),
            stroke_width: default_stroke_width(),
            toggle_ms: default_toggle_ms(),
            title: default_title(),
        }
    }
}

impl LineChartConfig {
    #[must_use]
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    #[must_use]
    pub fn with_codes(mut self, codes: Vec<Key>) -> Self {
        self.codes = codes;
        self
    }
}

fn default_viewport() -> Viewport {
    Viewport::new(900, 400)
}

fn default_margins() -> Margins {
    Margins::new(28.0, 90.0, 42.0, 60.0)
}

fn default_codes() -> Vec<Key> {
    ["USA", "GBR", "DEU", "JPN", "MEX"]
        .into_iter()
        .map(Key::from)
        .collect()
}

fn default_palette() -> Vec<String> {
    ["#4e79a7", "#f28e2c", "#59a14f", "#e15759", "#9c755f"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn default_stroke_width() -> f64 {
    2.0
}

fn default_toggle_ms() -> f64 {
    300.0
}

fn default_title() -> String {
    "Percent Internet Usage Over Time".to_owned()
}

/// One country's observations, sorted by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub code: Key,
    pub points: Vec<(i32, f64)>,
}

struct SeriesEncoding<'a> {
    x: LinearScale,
    y: LinearScale,
    curve: Curve,
    color: &'a OrdinalColorScale,
    stroke_width: f64,
}

impl SeriesEncoding<'_> {
    fn path(&self, series: &LineSeries) -> String {
        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .map(|(year, value)| (self.x.map(f64::from(*year)), self.y.map(*value)))
            .collect();
        line_path(&points, self.curve)
    }
}

impl Encoding<LineSeries> for SeriesEncoding<'_> {
    fn key(&self, series: &LineSeries) -> Key {
        series.code.clone()
    }

    fn enter(&self, series: &LineSeries) -> Attributes {
        Attributes::new()
            .with(Attr::PathData, self.path(series))
            .with(Attr::Stroke, self.color.map(series.code.as_str()))
            .with(Attr::StrokeWidth, self.stroke_width)
            .with(Attr::Opacity, 0.0)
    }

    fn update(&self, series: &LineSeries) -> Attributes {
        Attributes::new()
            .with(Attr::PathData, self.path(series))
            .with(Attr::Opacity, 1.0)
    }

    fn exit(&self, _element: &RenderedElement) -> Attributes {
        Attributes::new().with(Attr::Opacity, 0.0)
    }
}

/// Internet use over time for a fixed list of countries.
#[derive(Debug)]
pub struct LineChart {
    config: LineChartConfig,
    plot: PlotArea,
    series: Vec<LineSeries>,
    enabled: IndexSet<Key>,
    x: LinearScale,
    y: LinearScale,
    color: OrdinalColorScale,
    paths: Scene,
    highlight: SelectionSnapshot,
}

impl LineChart {
    /// Groups `records` into the configured series and shows all of them.
    pub fn new(records: &[InternetUseRecord], config: LineChartConfig) -> ChartResult<Self> {
        let plot = PlotArea::new(config.viewport, config.margins);
        let series: Vec<LineSeries> = config
            .codes
            .iter()
            .filter_map(|code| {
                let mut points: Vec<(i32, f64)> = records
                    .iter()
                    .filter(|record| &record.code == code)
                    .map(|record| (record.year, record.value))
                    .collect();
                points.sort_by_key(|(year, _)| *year);
                (!points.is_empty()).then(|| LineSeries {
                    code: code.clone(),
                    points,
                })
            })
            .collect();
        if series.len() < config.codes.len() {
            warn!(
                configured = config.codes.len(),
                found = series.len(),
                "some line series have no data"
            );
        }

        let years = series
            .iter()
            .flat_map(|s| s.points.iter().map(|(year, _)| f64::from(*year)));
        let x = LinearScale::from_extent(years, (0.0, plot.width), (0.0, 1.0))?;
        let y = LinearScale::new((0.0, 100.0), (plot.height, 0.0))?.nice(10);
        let color = OrdinalColorScale::from_hex(config.codes.iter().cloned(), &config.palette)?;

        let mut chart = Self {
            config,
            plot,
            series,
            enabled: IndexSet::new(),
            x,
            y,
            color,
            paths: Scene::new("series", MarkKind::Path),
            highlight: SelectionSnapshot::default(),
        };
        let all: Vec<Key> = chart.series.iter().map(|s| s.code.clone()).collect();
        chart.set_series(all)?;
        Ok(chart)
    }

    /// Shows exactly the series in `codes`; unknown codes are ignored.
    pub fn set_series(&mut self, codes: impl IntoIterator<Item = Key>) -> ChartResult<JoinSummary> {
        let wanted: IndexSet<Key> = codes.into_iter().collect();
        let shown: Vec<LineSeries> = self
            .series
            .iter()
            .filter(|series| wanted.contains(&series.code))
            .cloned()
            .collect();

        let encoding = SeriesEncoding {
            x: self.x,
            y: self.y,
            curve: self.config.curve,
            color: &self.color,
            stroke_width: self.config.stroke_width,
        };
        let timing = JoinTiming::new(self.config.toggle_ms, self.config.toggle_ms);
        let summary = self.paths.join(&shown, &encoding, timing)?;

        self.enabled = shown.into_iter().map(|series| series.code).collect();
        debug!(shown = self.enabled.len(), "line series updated");
        self.apply_highlight();
        Ok(summary)
    }

    /// Flips one series on or off; returns whether it is shown afterwards.
    pub fn toggle_series(&mut self, code: &str) -> ChartResult<bool> {
        let mut next = self.enabled.clone();
        let shown = if next.shift_remove(code) {
            false
        } else {
            next.insert(Key::from(code));
            true
        };
        self.set_series(next)?;
        Ok(shown && self.enabled.contains(code))
    }

    #[must_use]
    pub fn series(&self) -> &[LineSeries] {
        &self.series
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Key> {
        self.enabled.iter()
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
    pub fn paths(&self) -> &Scene {
        &self.paths
    }

    fn apply_highlight(&mut self) {
        let highlight = &self.highlight;
        let base = self.config.stroke_width;
        self.paths.restyle(|element| {
            let width = if highlight.filtering && highlight.contains(element.key().as_str()) {
                STROKE_HIGHLIGHTED
            } else {
                base
            };
            element.attributes_mut().set(Attr::StrokeWidth, width);
        });
    }

    fn paint_legend(&self, frame: &mut RenderFrame) {
        let left = self.plot.origin_x + self.plot.width + 12.0;
        let top = self.plot.origin_y + 6.0;
        for (row, code) in self.config.codes.iter().enumerate() {
            let y = top + row as f64 * 18.0;
            let opacity = if self.enabled.contains(code) { 1.0 } else { 0.35 };
            frame.rects.push(
                RectPrimitive::new(left, y, 12.0, 12.0, self.color.map(code.as_str()))
                    .with_corner_radius(2.0)
                    .with_opacity(opacity),
            );
            frame.texts.push(
                TextPrimitive::new(
                    code.as_str(),
                    left + 18.0,
                    y + 10.0,
                    12.0,
                    Color::rgb8(0x22, 0x22, 0x22),
                    TextHAlign::Left,
                )
                .with_opacity(opacity),
            );
        }
    }
}

impl SelectionListener for LineChart {
    fn on_selection(&mut self, event: &SelectionChanged) {
        self.highlight = event.selection.clone();
        self.apply_highlight();
    }
}

impl ChartView for LineChart {
    fn view_id(&self) -> &'static str {
        "line-chart"
    }

    fn tick(&mut self, now_ms: f64) -> bool {
        self.paths.tick(now_ms);
        self.is_animating()
    }

    fn is_animating(&self) -> bool {
        self.paths.is_animating()
    }

    fn render_frame(&self) -> RenderFrame {
        let origin = (self.plot.origin_x, self.plot.origin_y);
        let mut frame = RenderFrame::new(frame_viewport(
            self.config.viewport,
            self.config.margins,
            self.plot,
        ));

        frame.paint_axis(
            &linear_axis(AxisOrient::Bottom, self.plot.height, self.x, 10, format_integer),
            origin,
        );
        frame.paint_axis(
            &linear_axis(AxisOrient::Left, 0.0, self.y, 6, format_percent),
            origin,
        );
        frame.paint_scene(&self.paths, PaintOptions::at(origin));
        if !self.config.title.is_empty() {
            frame.texts.push(TextPrimitive::new(
                self.config.title.as_str(),
                origin.0 + self.plot.width / 2.0,
                origin.1 - 8.0,
                16.0,
                Color::rgb8(0x22, 0x22, 0x22),
                TextHAlign::Center,
            ));
        }
        self.paint_legend(&mut frame);
        frame
    }
}
