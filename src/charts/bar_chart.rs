use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::charts::filters::{default_year, top_n_by_value, year_options};
use crate::charts::{ChartView, SelectionListener, frame_viewport};
use crate::core::axis::{band_axis, format_percent, linear_axis};
use crate::core::{
    AxisOrient, BandScale, Color, InternetUseRecord, Key, LinearScale, Margins, PlotArea, Viewport,
};
use crate::error::ChartResult;
use crate::interaction::{SelectionChanged, SelectionSnapshot};
use crate::join::{Attr, Attributes, Encoding, JoinSummary, JoinTiming, MarkKind, RenderedElement, Scene};
use crate::render::{PaintOptions, RenderFrame, TextHAlign, TextPrimitive};

const LABEL_FONT_PX: f64 = 12.0;

/// Layout and timing of the top-N bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChartConfig {
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default = "default_margins")]
    pub margins: Margins,
    #[serde(default = "default_min_plot_width")]
    pub min_plot_width: f64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_band_padding")]
    pub band_padding: f64,
    #[serde(default = "default_bar_color")]
    pub bar_color: String,
    #[serde(default = "default_update_ms")]
    pub update_ms: f64,
    #[serde(default = "default_exit_ms")]
    pub exit_ms: f64,
    /// Opacity of bars left out of a foreign selection.
    #[serde(default = "default_dimmed_opacity")]
    pub dimmed_opacity: f64,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            viewport: default_viewport(),
            margins: default_margins(),
            min_plot_width: default_min_plot_width(),
            top_n: default_top_n(),
            band_padding: default_band_padding(),
            bar_color: default_bar_color(),
            update_ms: default_update_ms(),
            exit_ms: default_exit_ms(),
            dimmed_opacity: default_dimmed_opacity(),
        }
    }
}

impl BarChartConfig {
    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    #[must_use]
    pub fn with_dimmed_opacity(mut self, dimmed_opacity: f64) -> Self {
        self.dimmed_opacity = dimmed_opacity;
        self
    }

    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }
}

fn default_viewport() -> Viewport {
    Viewport::new(760, 380)
}

fn default_margins() -> Margins {
    Margins::new(10.0, 24.0, 36.0, 140.0)
}

fn default_min_plot_width() -> f64 {
    340.0
}

fn default_top_n() -> usize {
    5
}

fn default_band_padding() -> f64 {
    0.12
}

fn default_bar_color() -> String {
    "#7aa6ff".to_owned()
}

fn default_update_ms() -> f64 {
    600.0
}

fn default_exit_ms() -> f64 {
    300.0
}

fn default_dimmed_opacity() -> f64 {
    0.3
}

struct BarEncoding<'a> {
    x: LinearScale,
    y: &'a BandScale,
    fill: Color,
    highlight: &'a SelectionSnapshot,
    dimmed_opacity: f64,
}

impl Encoding<InternetUseRecord> for BarEncoding<'_> {
    fn key(&self, record: &InternetUseRecord) -> Key {
        record.code.clone()
    }

    fn enter(&self, record: &InternetUseRecord) -> Attributes {
        Attributes::new()
            .with(Attr::X, 0.0)
            .with(Attr::Y, self.y.map(record.code.as_str()).unwrap_or(0.0))
            .with(Attr::Height, self.y.bandwidth())
            .with(Attr::Width, 0.0)
            .with(Attr::Fill, self.fill)
            .with(Attr::Opacity, highlight_opacity(self.highlight, &record.code, self.dimmed_opacity))
    }

    fn update(&self, record: &InternetUseRecord) -> Attributes {
        Attributes::new()
            .with(Attr::Y, self.y.map(record.code.as_str()).unwrap_or(0.0))
            .with(Attr::Height, self.y.bandwidth())
            .with(Attr::Width, self.x.map(record.value))
    }

    fn exit(&self, _element: &RenderedElement) -> Attributes {
        Attributes::new().with(Attr::Width, 0.0)
    }
}

struct ValueLabelEncoding<'a> {
    x: LinearScale,
    y: &'a BandScale,
}

impl ValueLabelEncoding<'_> {
    fn baseline(&self, code: &Key) -> f64 {
        self.y.center(code.as_str()).unwrap_or(0.0) + LABEL_FONT_PX * 0.35
    }
}

impl Encoding<InternetUseRecord> for ValueLabelEncoding<'_> {
    fn key(&self, record: &InternetUseRecord) -> Key {
        record.code.clone()
    }

    fn enter(&self, record: &InternetUseRecord) -> Attributes {
        Attributes::new()
            .with(Attr::X, 0.0)
            .with(Attr::Y, self.baseline(&record.code))
            .with(Attr::FontSize, LABEL_FONT_PX)
            .with(Attr::Fill, Color::rgb8(0x22, 0x22, 0x22))
    }

    fn update(&self, record: &InternetUseRecord) -> Attributes {
        Attributes::new()
            .with(Attr::X, self.x.map(record.value) + 6.0)
            .with(Attr::Y, self.baseline(&record.code))
            .with(Attr::Text, format!("{:.1}%", record.value))
    }

    fn exit(&self, _element: &RenderedElement) -> Attributes {
        Attributes::new()
    }
}

fn highlight_opacity(highlight: &SelectionSnapshot, key: &Key, dimmed_opacity: f64) -> f64 {
    if highlight.admits(key.as_str()) {
        1.0
    } else {
        dimmed_opacity
    }
}

/// Top-N countries by internet use for one selected year.
#[derive(Debug)]
pub struct BarChart {
    config: BarChartConfig,
    fill: Color,
    records: Vec<InternetUseRecord>,
    years: Vec<i32>,
    year: Option<i32>,
    plot: PlotArea,
    visible: Vec<InternetUseRecord>,
    x: LinearScale,
    y: BandScale,
    bars: Scene,
    labels: Scene,
    highlight: SelectionSnapshot,
}

impl BarChart {
    /// Builds the chart and renders the most recent year.
    pub fn new(records: Vec<InternetUseRecord>, config: BarChartConfig) -> ChartResult<Self> {
        let fill = Color::from_hex(&config.bar_color)?;
        let plot = PlotArea::with_min_width(config.viewport, config.margins, config.min_plot_width);
        let years = year_options(&records);
        let year = default_year(&years);
        let x = LinearScale::new((0.0, 100.0), (0.0, plot.width))?;
        let y = BandScale::new(std::iter::empty(), (0.0, plot.height), config.band_padding)?;

        let mut chart = Self {
            config,
            fill,
            records,
            years,
            year: None,
            plot,
            visible: Vec::new(),
            x,
            y,
            bars: Scene::new("bars", MarkKind::Rect),
            labels: Scene::new("bar-labels", MarkKind::Text),
            highlight: SelectionSnapshot::default(),
        };
        if let Some(year) = year {
            chart.select_year(year)?;
        } else {
            warn!("bar chart has no records to show");
        }
        Ok(chart)
    }

    /// Year options for the select control, ascending.
    #[must_use]
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.year
    }

    /// Rebuilds the visible subset for `year` and joins it.
    ///
    /// A year without records leaves an empty chart on the default domain.
    pub fn select_year(&mut self, year: i32) -> ChartResult<JoinSummary> {
        let for_year = self
            .records
            .iter()
            .filter(|record| record.year == year)
            .cloned();
        let visible = top_n_by_value(for_year, self.config.top_n, |record| record.value);

        let max = visible
            .iter()
            .map(|record| record.value)
            .fold(f64::NAN, f64::max);
        let max = if max.is_finite() && max != 0.0 { max } else { 100.0 };
        let x = LinearScale::new((0.0, max), (0.0, self.plot.width))?;
        let y = BandScale::new(
            visible.iter().map(|record| record.code.clone()),
            (0.0, self.plot.height),
            self.config.band_padding,
        )?;

        let bar_timing = JoinTiming::new(self.config.update_ms, self.config.exit_ms);
        let label_timing = JoinTiming::new(self.config.update_ms, 0.0);
        let summary = self.bars.join(
            &visible,
            &BarEncoding {
                x,
                y: &y,
                fill: self.fill,
                highlight: &self.highlight,
                dimmed_opacity: self.config.dimmed_opacity,
            },
            bar_timing,
        )?;
        self.labels
            .join(&visible, &ValueLabelEncoding { x, y: &y }, label_timing)?;

        debug!(year, shown = visible.len(), max, "bar chart year selected");
        self.year = Some(year);
        self.visible = visible;
        self.x = x;
        self.y = y;
        Ok(summary)
    }

    /// Records currently shown, descending by value.
    #[must_use]
    pub fn visible(&self) -> &[InternetUseRecord] {
        &self.visible
    }

    #[must_use]
    pub fn x_scale(&self) -> LinearScale {
        self.x
    }

    #[must_use]
    pub fn y_scale(&self) -> &BandScale {
        &self.y
    }

    #[must_use]
    pub fn plot_area(&self) -> PlotArea {
        self.plot
    }

    #[must_use]
    pub fn bars(&self) -> &Scene {
        &self.bars
    }

    #[must_use]
    pub fn labels(&self) -> &Scene {
        &self.labels
    }

    fn apply_highlight(&mut self) {
        let highlight = &self.highlight;
        let dimmed_opacity = self.config.dimmed_opacity;
        self.bars.restyle(|element| {
            let opacity = highlight_opacity(highlight, element.key(), dimmed_opacity);
            element.attributes_mut().set(Attr::Opacity, opacity);
        });
    }
}

impl SelectionListener for BarChart {
    fn on_selection(&mut self, event: &SelectionChanged) {
        self.highlight = event.selection.clone();
        self.apply_highlight();
    }
}

impl ChartView for BarChart {
    fn view_id(&self) -> &'static str {
        "bar-chart"
    }

    fn tick(&mut self, now_ms: f64) -> bool {
        self.bars.tick(now_ms);
        self.labels.tick(now_ms);
        self.is_animating()
    }

    fn is_animating(&self) -> bool {
        self.bars.is_animating() || self.labels.is_animating()
    }

    fn render_frame(&self) -> RenderFrame {
        let margins = self.config.margins;
        let origin = (self.plot.origin_x, self.plot.origin_y);
        let mut frame = RenderFrame::new(frame_viewport(self.config.viewport, margins, self.plot));

        frame.paint_scene(&self.bars, PaintOptions::at(origin));
        frame.paint_scene(&self.labels, PaintOptions::at(origin));
        frame.paint_axis(
            &linear_axis(AxisOrient::Bottom, self.plot.height, self.x, 5, format_percent),
            origin,
        );
        frame.paint_axis(
            &band_axis(AxisOrient::Left, 0.0, &self.y, (0.0, self.plot.height)),
            origin,
        );
        if let Some(year) = self.year {
            frame.texts.push(TextPrimitive::new(
                format!("Year: {year}"),
                origin.0 + self.plot.width,
                origin.1 + 12.0,
                LABEL_FONT_PX,
                Color::rgb8(0x44, 0x44, 0x44),
                TextHAlign::Right,
            ));
        }
        frame
    }
}
