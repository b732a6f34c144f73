use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tracing::{debug, error, info, warn};

use crate::api::DashboardConfig;
use crate::charts::{
    BarChart, ChartView, GroupedBarChart, LineChart, ScatterChart, SelectionListener,
};
use crate::core::dataset::{load_gapminder, load_internet_use};
use crate::core::{CountryIndicators, InternetUseRecord};
use crate::error::ChartResult;
use crate::interaction::{BrushOutcome, EventChannel, SelectionChanged, SubscriptionId};
use crate::join::JoinSummary;
use crate::render::RenderFrame;

/// Bounds `settle` when a transition never finishes.
const MAX_SETTLE_MS: f64 = 60_000.0;

type Shared<T> = Rc<RefCell<T>>;

/// The four linked views.
///
/// Each view is optional: a view whose data failed to load (or whose first
/// render failed) is logged and left out while the others keep working.
///
/// Chip toggles in the grouped bar chart highlight matching countries in the
/// bar and line charts; brushing the scatter plot dims grouped bars of
/// countries outside the brushed region.
pub struct Dashboard {
    config: DashboardConfig,
    bar: Option<Shared<BarChart>>,
    line: Option<Shared<LineChart>>,
    grouped: Option<Shared<GroupedBarChart>>,
    scatter: Option<Shared<ScatterChart>>,
    subscriptions: Vec<(EventChannel<SelectionChanged>, SubscriptionId)>,
    now_ms: f64,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("bar", &self.bar.is_some())
            .field("line", &self.line.is_some())
            .field("grouped", &self.grouped.is_some())
            .field("scatter", &self.scatter.is_some())
            .field("now_ms", &self.now_ms)
            .finish()
    }
}

fn build<T>(view: &'static str, built: ChartResult<T>) -> Option<Shared<T>> {
    match built {
        Ok(chart) => Some(Rc::new(RefCell::new(chart))),
        Err(err) => {
            error!(view, error = %err, "view disabled");
            None
        }
    }
}

/// Handler forwarding selection events to `target` without keeping it alive.
fn forward_to<V>(view: &'static str, target: &Shared<V>) -> impl FnMut(&SelectionChanged) + 'static
where
    V: SelectionListener + 'static,
{
    let target = Rc::downgrade(target);
    move |event| {
        let Some(target) = target.upgrade() else {
            return;
        };
        match target.try_borrow_mut() {
            Ok(mut listener) => listener.on_selection(event),
            Err(_) => warn!(view, source = %event.source, "view busy, selection event dropped"),
        }
    }
}

impl Dashboard {
    /// Loads both CSV files named in `config` and builds every view it can.
    #[must_use]
    pub fn load(config: DashboardConfig) -> Self {
        let internet_use = load_internet_use(&config.internet_use_path);
        let gapminder = load_gapminder(&config.gapminder_path);
        Self::from_records(config, internet_use, gapminder)
    }

    /// Builds the views from already loaded (or failed) sources.
    #[must_use]
    pub fn from_records(
        config: DashboardConfig,
        internet_use: ChartResult<Vec<InternetUseRecord>>,
        gapminder: ChartResult<Vec<CountryIndicators>>,
    ) -> Self {
        let internet_use = internet_use
            .inspect_err(|err| error!(error = %err, "internet use data unavailable"))
            .ok();
        let gapminder = gapminder
            .inspect_err(|err| error!(error = %err, "gapminder data unavailable"))
            .ok();

        let (bar, line) = match internet_use {
            Some(records) => (
                build(
                    "bar-chart",
                    BarChart::new(records.clone(), config.bar_chart.clone()),
                ),
                build(
                    "line-chart",
                    LineChart::new(&records, config.line_chart.clone()),
                ),
            ),
            None => (None, None),
        };
        let (grouped, scatter) = match gapminder {
            Some(records) => (
                build(
                    "grouped-bar-chart",
                    GroupedBarChart::new(&records, config.grouped_bar_chart.clone()),
                ),
                build(
                    "scatter-chart",
                    ScatterChart::new(records, config.scatter_chart.clone()),
                ),
            ),
            None => (None, None),
        };

        let mut dashboard = Self {
            config,
            bar,
            line,
            grouped,
            scatter,
            subscriptions: Vec::new(),
            now_ms: 0.0,
        };
        dashboard.wire();
        info!(
            views = dashboard.views().len(),
            subscriptions = dashboard.subscriptions.len(),
            "dashboard ready"
        );
        dashboard
    }

    fn wire(&mut self) {
        if let Some(grouped) = &self.grouped {
            let channel = grouped.borrow().selection_channel();
            if let Some(bar) = &self.bar {
                let id = channel.subscribe(forward_to("bar-chart", bar));
                self.subscriptions.push((channel.clone(), id));
            }
            if let Some(line) = &self.line {
                let id = channel.subscribe(forward_to("line-chart", line));
                self.subscriptions.push((channel.clone(), id));
            }
        }
        if let (Some(scatter), Some(grouped)) = (&self.scatter, &self.grouped) {
            let channel = scatter.borrow().selection_channel();
            let id = channel.subscribe(forward_to("grouped-bar-chart", grouped));
            self.subscriptions.push((channel, id));
        }
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn views(&self) -> Vec<Shared<dyn ChartView>> {
        let mut views: Vec<Shared<dyn ChartView>> = Vec::with_capacity(4);
        if let Some(view) = &self.bar {
            views.push(view.clone());
        }
        if let Some(view) = &self.line {
            views.push(view.clone());
        }
        if let Some(view) = &self.grouped {
            views.push(view.clone());
        }
        if let Some(view) = &self.scatter {
            views.push(view.clone());
        }
        views
    }

    #[must_use]
    pub fn bar_chart(&self) -> Option<Ref<'_, BarChart>> {
        self.bar.as_ref().map(|chart| chart.borrow())
    }

    #[must_use]
    pub fn line_chart(&self) -> Option<Ref<'_, LineChart>> {
        self.line.as_ref().map(|chart| chart.borrow())
    }

    #[must_use]
    pub fn grouped_bar_chart(&self) -> Option<Ref<'_, GroupedBarChart>> {
        self.grouped.as_ref().map(|chart| chart.borrow())
    }

    #[must_use]
    pub fn scatter_chart(&self) -> Option<Ref<'_, ScatterChart>> {
        self.scatter.as_ref().map(|chart| chart.borrow())
    }

    /// Year select of the bar chart. `Ok(None)` when the view is absent.
    pub fn select_year(&mut self, year: i32) -> ChartResult<Option<JoinSummary>> {
        self.bar
            .as_ref()
            .map(|chart| chart.borrow_mut().select_year(year))
            .transpose()
    }

    pub fn toggle_series(&mut self, code: &str) -> ChartResult<Option<bool>> {
        self.line
            .as_ref()
            .map(|chart| chart.borrow_mut().toggle_series(code))
            .transpose()
    }

    pub fn toggle_chip(&mut self, code: &str) -> ChartResult<Option<bool>> {
        self.grouped
            .as_ref()
            .map(|chart| chart.borrow_mut().toggle_chip(code))
            .transpose()
    }

    /// Cap input of the scatter plot; returns the cap actually applied.
    pub fn set_scatter_cap(&mut self, input: &str) -> ChartResult<Option<usize>> {
        self.scatter
            .as_ref()
            .map(|chart| chart.borrow_mut().set_cap_input(input))
            .transpose()
    }

    pub fn brush_start(&mut self, x: f64, y: f64) -> Option<BrushOutcome> {
        self.scatter
            .as_ref()
            .map(|chart| chart.borrow_mut().brush_start(x, y))
    }

    pub fn brush_move(&mut self, x: f64, y: f64) -> Option<BrushOutcome> {
        self.scatter
            .as_ref()
            .and_then(|chart| chart.borrow_mut().brush_move(x, y))
    }

    pub fn brush_end(&mut self, x: f64, y: f64) -> Option<BrushOutcome> {
        self.scatter
            .as_ref()
            .and_then(|chart| chart.borrow_mut().brush_end(x, y))
    }

    pub fn brush_clear(&mut self) -> Option<BrushOutcome> {
        self.scatter
            .as_ref()
            .map(|chart| chart.borrow_mut().brush_clear())
    }

    /// Drives every view to `now_ms`; returns `true` while anything animates.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.now_ms = self.now_ms.max(now_ms);
        let now_ms = self.now_ms;
        self.views()
            .iter()
            .fold(false, |animating, view| view.borrow_mut().tick(now_ms) || animating)
    }

    pub fn advance(&mut self, delta_ms: f64) -> bool {
        self.tick(self.now_ms + delta_ms.max(0.0))
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.views().iter().any(|view| view.borrow().is_animating())
    }

    /// Steps the clock by the configured frame interval until every view is
    /// idle; returns the simulated time spent.
    pub fn settle(&mut self) -> f64 {
        let start = self.now_ms;
        let frame_ms = self.config.frame_ms.max(1.0);
        while self.is_animating() {
            if self.now_ms - start >= MAX_SETTLE_MS {
                warn!(elapsed_ms = self.now_ms - start, "animations did not settle");
                break;
            }
            self.advance(frame_ms);
        }
        let elapsed = self.now_ms - start;
        debug!(elapsed_ms = elapsed, "dashboard settled");
        elapsed
    }

    /// Current frame of every available view, keyed by view id.
    #[must_use]
    pub fn frames(&self) -> Vec<(&'static str, RenderFrame)> {
        self.views()
            .iter()
            .map(|view| {
                let view = view.borrow();
                (view.view_id(), view.render_frame())
            })
            .collect()
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        for (channel, id) in self.subscriptions.drain(..) {
            channel.unsubscribe(id);
        }
    }
}
