use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::charts::{ChartView, SelectionListener, frame_viewport};
use crate::core::axis::{band_axis, format_currency, format_grouped, format_percent, linear_axis};
use crate::core::{
    AxisOrient, BandScale, Color, CountryIndicators, Key, LinearScale, Margins, PlotArea, Viewport,
};
use crate::error::ChartResult;
use crate::interaction::{
    EventChannel, SelectionBroadcaster, SelectionChanged, SelectionSnapshot, SubscriptionId,
};
use crate::join::{Attr, Attributes, Encoding, JoinTiming, MarkKind, RenderedElement, Scene};
use crate::render::{PaintOptions, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive};

const BAR_OPACITY: f64 = 0.9;
const VALUE_FONT_PX: f64 = 11.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedBarChartConfig {
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default = "default_margins")]
    pub margins: Margins,
    /// Chip order and the order of selected groups.
    #[serde(default = "default_codes")]
    pub codes: Vec<Key>,
    #[serde(default = "default_outer_padding")]
    pub group_padding: f64,
    #[serde(default = "default_inner_padding")]
    pub bar_padding: f64,
    #[serde(default = "default_gdp_color")]
    pub gdp_color: String,
    #[serde(default = "default_net_color")]
    pub net_color: String,
    #[serde(default = "default_group_ms")]
    pub group_ms: f64,
    #[serde(default = "default_bar_enter_ms")]
    pub bar_enter_ms: f64,
    #[serde(default = "default_bar_update_ms")]
    pub bar_update_ms: f64,
    #[serde(default = "default_bar_exit_ms")]
    pub bar_exit_ms: f64,
    #[serde(default = "default_name_enter_ms")]
    pub name_enter_ms: f64,
    #[serde(default = "default_name_exit_ms")]
    pub name_exit_ms: f64,
    /// Opacity of bars whose country is outside the linked brush.
    #[serde(default = "default_dimmed_opacity")]
    pub dimmed_opacity: f64,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for GroupedBarChartConfig {
    fn default() -> Self {
        Self {
            viewport: default_viewport(),
            margins: default_margins(),
            codes: default_codes(),
            group_padding: default_outer_padding(),
            bar_padding: default_inner_padding(),
            gdp_color: default_gdp_color(),
            net_color: default_net_color(),
            group_ms: default_group_ms(),
            bar_enter_ms: default_bar_enter_ms(),
            bar_update_ms: default_bar_update_ms(),
            bar_exit_ms: default_bar_exit_ms(),
            name_enter_ms: default_name_enter_ms(),
            name_exit_ms: default_name_exit_ms(),
            dimmed_opacity: default_dimmed_opacity(),
            title: default_title(),
        }
    }
}

impl GroupedBarChartConfig {
    #[must_use]
    pub fn with_codes(mut self, codes: Vec<Key>) -> Self {
        self.codes = codes;
        self
    }

    #[must_use]
    pub fn with_dimmed_opacity(mut self, dimmed_opacity: f64) -> Self {
        self.dimmed_opacity = dimmed_opacity;
        self
    }
}

fn default_viewport() -> Viewport {
    Viewport::new(1100, 520)
}

fn default_margins() -> Margins {
    Margins::new(40.0, 80.0, 100.0, 70.0)
}

fn default_codes() -> Vec<Key> {
    [
        "LIE", "BER", "LUX", "NOR", "JAP", "MAL", "GUI", "LIB", "ERI", "BUR",
    ]
    .into_iter()
    .map(Key::from)
    .collect()
}

fn default_outer_padding() -> f64 {
    0.35
}

fn default_inner_padding() -> f64 {
    0.18
}

fn default_gdp_color() -> String {
    "#4e79a7".to_owned()
}

fn default_net_color() -> String {
    "#f28e2c".to_owned()
}

fn default_group_ms() -> f64 {
    400.0
}

fn default_bar_enter_ms() -> f64 {
    550.0
}

fn default_bar_update_ms() -> f64 {
    450.0
}

fn default_bar_exit_ms() -> f64 {
    250.0
}

fn default_name_enter_ms() -> f64 {
    300.0
}

fn default_name_exit_ms() -> f64 {
    200.0
}

fn default_dimmed_opacity() -> f64 {
    0.25
}

fn default_title() -> String {
    "GDP per Capita vs Internet Usage (Selected Countries)".to_owned()
}

/// Toggle target shown above the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chip {
    pub code: Key,
    pub name: String,
    pub active: bool,
    /// Fun fact while inactive, the full country name while active.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
struct GroupedCountry {
    code: Key,
    name: String,
    net: f64,
    gdp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Measure {
    Gdp,
    Net,
}

impl Measure {
    const ALL: [Measure; 2] = [Measure::Gdp, Measure::Net];

    fn as_str(self) -> &'static str {
        match self {
            Self::Gdp => "gdp",
            Self::Net => "net",
        }
    }
}

#[derive(Debug, Clone)]
struct MeasureBar {
    code: Key,
    measure: Measure,
    value: f64,
}

impl MeasureBar {
    fn key(&self) -> Key {
        Key::new(format!("{}/{}", self.code, self.measure.as_str()))
    }
}

struct Layout {
    height: f64,
    x: BandScale,
    inner: BandScale,
    y_net: LinearScale,
    y_gdp: LinearScale,
}

impl Layout {
    fn value_y(&self, bar: &MeasureBar) -> f64 {
        match bar.measure {
            Measure::Gdp => self.y_gdp.map(bar.value),
            Measure::Net => self.y_net.map(bar.value),
        }
    }

    fn inner_x(&self, measure: Measure) -> f64 {
        self.inner.map(measure.as_str()).unwrap_or(0.0)
    }
}

struct GroupEncoding<'a> {
    layout: &'a Layout,
}

impl Encoding<GroupedCountry> for GroupEncoding<'_> {
    fn key(&self, country: &GroupedCountry) -> Key {
        country.code.clone()
    }

    fn enter(&self, country: &GroupedCountry) -> Attributes {
        self.update(country)
    }

    fn update(&self, country: &GroupedCountry) -> Attributes {
        Attributes::new().with(
            Attr::TranslateX,
            self.layout.x.map(country.code.as_str()).unwrap_or(0.0),
        )
    }

    fn exit(&self, _element: &RenderedElement) -> Attributes {
        Attributes::new()
    }
}

struct BarEncoding<'a> {
    layout: &'a Layout,
    gdp_color: Color,
    net_color: Color,
}

impl Encoding<MeasureBar> for BarEncoding<'_> {
    fn key(&self, bar: &MeasureBar) -> Key {
        bar.key()
    }

    fn parent(&self, bar: &MeasureBar) -> Option<Key> {
        Some(bar.code.clone())
    }

    fn enter(&self, bar: &MeasureBar) -> Attributes {
        let fill = match bar.measure {
            Measure::Gdp => self.gdp_color,
            Measure::Net => self.net_color,
        };
        Attributes::new()
            .with(Attr::X, self.layout.inner_x(bar.measure))
            .with(Attr::Y, self.layout.height)
            .with(Attr::Width, self.layout.inner.bandwidth())
            .with(Attr::Height, 0.0)
            .with(Attr::CornerRadius, 4.0)
            .with(Attr::Fill, fill)
            .with(Attr::Opacity, BAR_OPACITY)
    }

    fn update(&self, bar: &MeasureBar) -> Attributes {
        let top = self.layout.value_y(bar);
        Attributes::new()
            .with(Attr::X, self.layout.inner_x(bar.measure))
            .with(Attr::Y, top)
            .with(Attr::Width, self.layout.inner.bandwidth())
            .with(Attr::Height, self.layout.height - top)
    }

    fn exit(&self, _element: &RenderedElement) -> Attributes {
        Attributes::new()
            .with(Attr::Y, self.layout.height)
            .with(Attr::Height, 0.0)
    }
}

struct ValueLabelEncoding<'a> {
    layout: &'a Layout,
}

impl ValueLabelEncoding<'_> {
    fn center_x(&self, measure: Measure) -> f64 {
        self.layout.inner_x(measure) + self.layout.inner.bandwidth() / 2.0
    }
}

impl Encoding<MeasureBar> for ValueLabelEncoding<'_> {
    fn key(&self, bar: &MeasureBar) -> Key {
        bar.key()
    }

    fn parent(&self, bar: &MeasureBar) -> Option<Key> {
        Some(bar.code.clone())
    }

    fn enter(&self, bar: &MeasureBar) -> Attributes {
        Attributes::new()
            .with(Attr::X, self.center_x(bar.measure))
            .with(Attr::Y, self.layout.height - 4.0)
            .with(Attr::Opacity, 0.0)
            .with(Attr::FontSize, VALUE_FONT_PX)
            .with(Attr::Fill, Color::rgb8(0x22, 0x22, 0x22))
    }

    fn update(&self, bar: &MeasureBar) -> Attributes {
        let text = match bar.measure {
            Measure::Gdp => format!("${}", format_grouped(bar.value)),
            Measure::Net => format!("{:.1}%", bar.value),
        };
        Attributes::new()
            .with(Attr::X, self.center_x(bar.measure))
            .with(Attr::Y, self.layout.value_y(bar) - 6.0)
            .with(Attr::Text, text)
            .with(Attr::Opacity, 1.0)
    }

    fn exit(&self, _element: &RenderedElement) -> Attributes {
        Attributes::new()
    }
}

struct NameEncoding<'a> {
    layout: &'a Layout,
}

impl NameEncoding<'_> {
    fn center_x(&self, code: &Key) -> f64 {
        self.layout.x.map(code.as_str()).unwrap_or(0.0) + self.layout.x.bandwidth() / 2.0
    }
}

impl Encoding<GroupedCountry> for NameEncoding<'_> {
    fn key(&self, country: &GroupedCountry) -> Key {
        country.code.clone()
    }

    fn enter(&self, country: &GroupedCountry) -> Attributes {
        Attributes::new()
            .with(Attr::X, self.center_x(&country.code))
            .with(Attr::Y, self.layout.height + 28.0)
            .with(Attr::Opacity, 0.0)
            .with(Attr::Text, country.name.as_str())
            .with(Attr::FontSize, VALUE_FONT_PX)
            .with(Attr::Fill, Color::rgb8(0x66, 0x66, 0x66))
    }

    fn update(&self, country: &GroupedCountry) -> Attributes {
        Attributes::new()
            .with(Attr::X, self.center_x(&country.code))
            .with(Attr::Y, self.layout.height + 28.0)
            .with(Attr::Text, country.name.as_str())
            .with(Attr::Opacity, 1.0)
    }

    fn exit(&self, _element: &RenderedElement) -> Attributes {
        Attributes::new().with(Attr::Opacity, 0.0)
    }
}

/// GDP per capita next to internet use for countries picked through chips.
///
/// Chip state lives in the chart's own [`SelectionBroadcaster`]; other views
/// subscribe to it to follow the picked countries.
#[derive(Debug)]
pub struct GroupedBarChart {
    config: GroupedBarChartConfig,
    gdp_color: Color,
    net_color: Color,
    plot: PlotArea,
    sample: Vec<GroupedCountry>,
    chips: SelectionBroadcaster,
    y_net: LinearScale,
    y_gdp: LinearScale,
    x: BandScale,
    groups: Scene,
    bars: Scene,
    values: Scene,
    names: Scene,
    highlight: SelectionSnapshot,
}

impl GroupedBarChart {
    pub fn new(records: &[CountryIndicators], config: GroupedBarChartConfig) -> ChartResult<Self> {
        let gdp_color = Color::from_hex(&config.gdp_color)?;
        let net_color = Color::from_hex(&config.net_color)?;
        let plot = PlotArea::new(config.viewport, config.margins);

        let sample: Vec<GroupedCountry> = config
            .codes
            .iter()
            .filter_map(|code| {
                records.iter().find_map(|record| match record.income_per_person {
                    Some(gdp) if &record.code == code => Some(GroupedCountry {
                        code: code.clone(),
                        name: record.name.clone(),
                        net: record.internet_rate,
                        gdp,
                    }),
                    _ => None,
                })
            })
            .collect();
        if sample.len() < config.codes.len() {
            warn!(
                configured = config.codes.len(),
                found = sample.len(),
                "some chip countries are missing from the data"
            );
        }

        let y_net = LinearScale::new((0.0, 100.0), (plot.height, 0.0))?.nice(10);
        let y_gdp = LinearScale::new((0.0, 1.1), (plot.height, 0.0))?.nice(10);
        let x = BandScale::new(std::iter::empty(), (0.0, plot.width), config.group_padding)?;

        Ok(Self {
            config,
            gdp_color,
            net_color,
            plot,
            sample,
            chips: SelectionBroadcaster::new("chips"),
            y_net,
            y_gdp,
            x,
            groups: Scene::new("country-groups", MarkKind::Group),
            bars: Scene::new("grouped-bars", MarkKind::Rect),
            values: Scene::new("grouped-values", MarkKind::Text),
            names: Scene::new("country-names", MarkKind::Text),
            highlight: SelectionSnapshot::default(),
        })
    }

    /// Chips in configured order, with their current text.
    #[must_use]
    pub fn chips(&self) -> Vec<Chip> {
        self.sample
            .iter()
            .map(|country| {
                let active = self.chips.is_selected(country.code.as_str());
                let text = if active {
                    country.name.clone()
                } else {
                    format!("~{:.1}% online", country.net)
                };
                Chip {
                    code: country.code.clone(),
                    name: country.name.clone(),
                    active,
                    text,
                }
            })
            .collect()
    }

    /// Flips the chip for `code` and re-renders; returns whether it is active
    /// afterwards. Codes without a chip are ignored.
    pub fn toggle_chip(&mut self, code: &str) -> ChartResult<bool> {
        if !self.sample.iter().any(|country| country.code.as_str() == code) {
            warn!(code, "no chip for code");
            return Ok(false);
        }
        let active = self.chips.toggle(code);
        self.update()?;
        Ok(active)
    }

    /// Deactivates every chip.
    pub fn clear_chips(&mut self) -> ChartResult<()> {
        self.chips.clear();
        self.update()
    }

    /// Codes of the active chips in configured order.
    #[must_use]
    pub fn selected_codes(&self) -> Vec<Key> {
        self.selected().map(|country| country.code.clone()).collect()
    }

    /// Chip selection as published to subscribers.
    #[must_use]
    pub fn selection(&self) -> &SelectionSnapshot {
        self.chips.selection()
    }

    pub fn subscribe(&self, handler: impl FnMut(&SelectionChanged) + 'static) -> SubscriptionId {
        self.chips.subscribe(handler)
    }

    #[must_use]
    pub fn selection_channel(&self) -> EventChannel<SelectionChanged> {
        self.chips.channel()
    }

    #[must_use]
    pub fn gdp_scale(&self) -> LinearScale {
        self.y_gdp
    }

    #[must_use]
    pub fn internet_scale(&self) -> LinearScale {
        self.y_net
    }

    #[must_use]
    pub fn group_scale(&self) -> &BandScale {
        &self.x
    }

    #[must_use]
    pub fn groups(&self) -> &Scene {
        &self.groups
    }

    #[must_use]
    pub fn bars(&self) -> &Scene {
        &self.bars
    }

    #[must_use]
    pub fn value_labels(&self) -> &Scene {
        &self.values
    }

    #[must_use]
    pub fn names(&self) -> &Scene {
        &self.names
    }

    fn selected(&self) -> impl Iterator<Item = &GroupedCountry> {
        self.sample
            .iter()
            .filter(|country| self.chips.is_selected(country.code.as_str()))
    }

    fn update(&mut self) -> ChartResult<()> {
        let selected: Vec<GroupedCountry> = self.selected().cloned().collect();

        let max_gdp = selected
            .iter()
            .map(|country| country.gdp)
            .fold(f64::NAN, f64::max);
        let max_gdp = if max_gdp.is_finite() && max_gdp != 0.0 { max_gdp } else { 1.0 };
        let height = self.plot.height;
        let y_gdp = LinearScale::new((0.0, max_gdp * 1.1), (height, 0.0))?.nice(10);
        let x = BandScale::new(
            selected.iter().map(|country| country.code.clone()),
            (0.0, self.plot.width),
            self.config.group_padding,
        )?;
        let inner = BandScale::new(
            Measure::ALL.iter().map(|measure| Key::from(measure.as_str())),
            (0.0, x.bandwidth().max(0.0)),
            self.config.bar_padding,
        )?;
        let layout = Layout {
            height,
            x,
            inner,
            y_net: self.y_net,
            y_gdp,
        };

        let measures: Vec<MeasureBar> = selected
            .iter()
            .flat_map(|country| {
                Measure::ALL.into_iter().map(move |measure| MeasureBar {
                    code: country.code.clone(),
                    measure,
                    value: match measure {
                        Measure::Gdp => country.gdp,
                        Measure::Net => country.net,
                    },
                })
            })
            .collect();

        let config = &self.config;
        // Groups outlive their bars' exit so children keep their offset.
        self.groups.join(
            &selected,
            &GroupEncoding { layout: &layout },
            JoinTiming::new(config.group_ms, config.bar_exit_ms),
        )?;
        self.bars.join(
            &measures,
            &BarEncoding {
                layout: &layout,
                gdp_color: self.gdp_color,
                net_color: self.net_color,
            },
            JoinTiming::new(config.bar_update_ms, config.bar_exit_ms)
                .with_enter_ms(config.bar_enter_ms),
        )?;
        self.values.join(
            &measures,
            &ValueLabelEncoding { layout: &layout },
            JoinTiming::new(config.bar_update_ms, 0.0),
        )?;
        self.names.join(
            &selected,
            &NameEncoding { layout: &layout },
            JoinTiming::new(config.name_enter_ms, config.name_exit_ms),
        )?;

        debug!(selected = selected.len(), max_gdp, "grouped bars updated");
        self.x = layout.x;
        self.y_gdp = y_gdp;
        self.apply_highlight();
        Ok(())
    }

    fn apply_highlight(&mut self) {
        let highlight = &self.highlight;
        let sample = &self.sample;
        let dimmed_opacity = self.config.dimmed_opacity;
        self.bars.restyle(|element| {
            let name = element.parent().and_then(|code| {
                sample
                    .iter()
                    .find(|country| &country.code == code)
                    .map(|country| country.name.as_str())
            });
            let admitted = name.is_none_or(|name| highlight.admits(name));
            let opacity = if admitted { BAR_OPACITY } else { dimmed_opacity };
            element.attributes_mut().set(Attr::Opacity, opacity);
        });
    }

    fn paint_legend(&self, frame: &mut RenderFrame) {
        let (ox, oy) = (self.plot.origin_x, self.plot.origin_y - 2.0);
        let entries = [
            (self.gdp_color, "GDP per capita (USD)"),
            (self.net_color, "Internet (%)"),
        ];
        for (index, (color, label)) in entries.into_iter().enumerate() {
            let x = ox + index as f64 * 210.0;
            frame
                .rects
                .push(RectPrimitive::new(x, oy, 14.0, 14.0, color).with_corner_radius(3.0));
            frame.texts.push(TextPrimitive::new(
                label,
                x + 20.0,
                oy + 11.0,
                12.0,
                Color::rgb8(0x22, 0x22, 0x22),
                TextHAlign::Left,
            ));
        }
    }
}

impl SelectionListener for GroupedBarChart {
    /// Dims groups whose country name is outside a foreign selection.
    fn on_selection(&mut self, event: &SelectionChanged) {
        self.highlight = event.selection.clone();
        self.apply_highlight();
    }
}

impl ChartView for GroupedBarChart {
    fn view_id(&self) -> &'static str {
        "grouped-bar-chart"
    }

    fn tick(&mut self, now_ms: f64) -> bool {
        self.groups.tick(now_ms);
        self.bars.tick(now_ms);
        self.values.tick(now_ms);
        self.names.tick(now_ms);
        self.is_animating()
    }

    fn is_animating(&self) -> bool {
        self.groups.is_animating()
            || self.bars.is_animating()
            || self.values.is_animating()
            || self.names.is_animating()
    }

    fn render_frame(&self) -> RenderFrame {
        let origin = (self.plot.origin_x, self.plot.origin_y);
        let mut frame = RenderFrame::new(frame_viewport(
            self.config.viewport,
            self.config.margins,
            self.plot,
        ));

        frame.paint_axis(
            &linear_axis(AxisOrient::Left, 0.0, self.y_net, 6, format_percent),
            origin,
        );
        frame.paint_axis(
            &linear_axis(AxisOrient::Right, self.plot.width, self.y_gdp, 6, format_currency),
            origin,
        );
        frame.paint_axis(
            &band_axis(AxisOrient::Bottom, self.plot.height, &self.x, (0.0, self.plot.width)),
            origin,
        );
        frame.paint_scene(&self.bars, PaintOptions::at(origin).with_groups(&self.groups));
        frame.paint_scene(
            &self.values,
            PaintOptions::at(origin)
                .with_groups(&self.groups)
                .with_text_align(TextHAlign::Center),
        );
        frame.paint_scene(
            &self.names,
            PaintOptions::at(origin).with_text_align(TextHAlign::Center),
        );
        if !self.config.title.is_empty() {
            frame.texts.push(TextPrimitive::new(
                self.config.title.as_str(),
                origin.0 + self.plot.width / 2.0,
                origin.1 - 14.0,
                18.0,
                Color::rgb8(0x22, 0x22, 0x22),
                TextHAlign::Center,
            ));
        }
        self.paint_legend(&mut frame);
        frame
    }
}
